//! View state and the transitions that are allowed to change it.

use crate::clock::Clock;
use crate::derive::{max_temperature, min_temperature, weekday_name};
use crate::lexicon::describe_weather_code;
use crate::types::{GeolocationError, WeatherSnapshot};

pub const LOADING_PLACEHOLDER: &str = "Loading weather…";

#[derive(Debug, Clone, PartialEq)]
pub struct ViewState {
    pub snapshot: Option<WeatherSnapshot>,
    pub location_label: String,
    /// Inline error from the last precise-location attempt
    pub error: Option<String>,
    /// Blocking notice, set when the platform has no geolocation at all
    pub notice: Option<String>,
    pub precise_acquired: bool,
    pub precise_available: bool,
    pub precise_in_flight: bool,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            snapshot: None,
            location_label: String::new(),
            error: None,
            notice: None,
            precise_acquired: false,
            precise_available: true,
            precise_in_flight: false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Transition {
    /// Location known from the cache or an IP lookup
    LocationResolved { label: String },
    WeatherLoaded(WeatherSnapshot),
    /// User asked for precise location; drops whatever is displayed
    PreciseStarted,
    PreciseFailed(GeolocationError),
    PreciseResolved { label: String },
    /// Precise chain ended, successfully or not
    PreciseFinished,
}

impl ViewState {
    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::LocationResolved { label } => {
                self.location_label = label;
            }
            Transition::WeatherLoaded(snapshot) => {
                self.snapshot = Some(snapshot);
            }
            Transition::PreciseStarted => {
                self.snapshot = None;
                self.error = None;
                self.precise_in_flight = true;
            }
            Transition::PreciseFailed(err) => {
                if err.is_blocking() {
                    self.notice = Some(err.user_message().to_string());
                    self.precise_available = false;
                } else {
                    self.error = Some(err.user_message().to_string());
                }
                self.precise_in_flight = false;
            }
            Transition::PreciseResolved { label } => {
                self.location_label = label;
                self.error = None;
                self.precise_acquired = true;
            }
            Transition::PreciseFinished => {
                self.precise_in_flight = false;
            }
        }
    }
}

/// Read-only values for the presentation layer
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherView {
    pub loading: bool,
    pub temperature: Option<f64>,
    pub description: Option<&'static str>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub day_name: &'static str,
    pub location_label: String,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub show_precise_button: bool,
}

impl WeatherView {
    pub fn from_state(state: &ViewState, clock: &dyn Clock) -> Self {
        let snapshot = state.snapshot.as_ref();
        Self {
            loading: snapshot.is_none(),
            temperature: snapshot.map(|s| s.current_temperature),
            description: snapshot.map(|s| describe_weather_code(s.current_weather_code)),
            high: snapshot.and_then(max_temperature),
            low: snapshot.and_then(min_temperature),
            day_name: weekday_name(clock),
            location_label: state.location_label.clone(),
            error: state.error.clone(),
            notice: state.notice.clone(),
            show_precise_button: state.precise_available
                && !state.precise_acquired
                && !state.precise_in_flight,
        }
    }

    /// One-line text rendering, or the placeholder while loading
    pub fn render_summary(&self) -> String {
        let (Some(temperature), Some(description), Some(high), Some(low)) =
            (self.temperature, self.description, self.high, self.low)
        else {
            return LOADING_PLACEHOLDER.to_string();
        };
        format!(
            "{}°C {} | High: {}° Low: {}° | {} · {}",
            temperature, description, high, low, self.day_name, self.location_label
        )
    }
}
