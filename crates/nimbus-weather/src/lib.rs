//! Weather widget core for Nimbus
//!
//! Resolves a display location (cached record, IP lookup, or precise device
//! position), fetches the Open-Meteo forecast and derives the values the
//! view shows.

pub mod cache;
pub mod clock;
pub mod controller;
pub mod derive;
pub mod device;
pub mod geocode;
pub mod lexicon;
pub mod location;
pub mod provider;
pub mod state;
pub mod types;

pub use cache::{JsonStore, LocationCache};
pub use clock::{Clock, FixedClock, SystemClock};
pub use controller::{WeatherController, WeatherServices};
pub use derive::{max_temperature, min_temperature, weekday_name};
pub use device::{platform_locator, DeviceLocator, UnsupportedLocator};
pub use geocode::ReverseGeocoder;
pub use lexicon::describe_weather_code;
pub use location::IpLocator;
pub use provider::WeatherProvider;
pub use state::{Transition, ViewState, WeatherView};
pub use types::*;
