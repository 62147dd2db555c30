//! View controller: runs the location and weather chains and owns the view state.
//!
//! Two chains can change the state:
//! - the mount chain (cache or IP lookup, then forecast), spawned by `mount()`
//!   with its own cancellation token;
//! - the precise chain (device position, reverse geocode, cache write,
//!   forecast), started by `request_precise_location()`.
//!
//! Every mutation goes through `apply`, which checks the chain's token while
//! holding the state lock. `teardown()` cancels under the same lock, so no
//! response arriving afterwards can touch the state.

use nimbus_core::{AppError, Config, ConfigError};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::cache::{JsonStore, LocationCache};
use crate::clock::{Clock, SystemClock};
use crate::device::{platform_locator, DeviceLocator};
use crate::geocode::ReverseGeocoder;
use crate::location::IpLocator;
use crate::provider::{build_http_client, WeatherProvider};
use crate::state::{Transition, ViewState, WeatherView};
use crate::types::{LocationError, LocationRecord};

/// Everything the controller talks to
pub struct WeatherServices {
    pub cache: LocationCache,
    pub ip_locator: IpLocator,
    pub geocoder: ReverseGeocoder,
    pub provider: WeatherProvider,
    pub device: Arc<dyn DeviceLocator>,
    pub clock: Arc<dyn Clock>,
}

impl WeatherServices {
    /// Wire up the real endpoints, platform locator and wall clock
    pub fn from_config(config: &Config) -> Result<Self, AppError> {
        let client = Arc::new(build_http_client(&config.weather)?);

        Ok(Self {
            cache: LocationCache::new(JsonStore::from_config(&config.storage)),
            ip_locator: IpLocator::new(
                client.clone(),
                parse_endpoint("weather.ip_lookup_url", &config.weather.ip_lookup_url)?,
            ),
            geocoder: ReverseGeocoder::new(
                client.clone(),
                parse_endpoint(
                    "weather.reverse_geocode_url",
                    &config.weather.reverse_geocode_url,
                )?,
            ),
            provider: WeatherProvider::new(
                client,
                parse_endpoint("weather.forecast_url", &config.weather.forecast_url)?,
            ),
            device: platform_locator(),
            clock: Arc::new(SystemClock),
        })
    }

    pub fn with_device_locator(mut self, device: Arc<dyn DeviceLocator>) -> Self {
        self.device = device;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }
}

fn parse_endpoint(field: &str, value: &str) -> Result<Url, AppError> {
    Url::parse(value)
        .map_err(|e| AppError::Config(ConfigError::Invalid(format!("{}: {}", field, e))))
}

struct Inner {
    services: WeatherServices,
    state: RwLock<ViewState>,
    /// Cancelled on teardown; parent of every chain token
    root: CancellationToken,
    mount_token: Mutex<Option<CancellationToken>>,
}

#[derive(Clone)]
pub struct WeatherController {
    inner: Arc<Inner>,
}

impl WeatherController {
    pub fn new(services: WeatherServices) -> Self {
        Self {
            inner: Arc::new(Inner {
                services,
                state: RwLock::new(ViewState::default()),
                root: CancellationToken::new(),
                mount_token: Mutex::new(None),
            }),
        }
    }

    /// Start the mount chain in the background
    pub fn mount(&self) -> JoinHandle<()> {
        let token = self.inner.root.child_token();
        *self.inner.mount_token.lock() = Some(token.clone());

        let this = self.clone();
        tokio::spawn(async move { this.run_mount_chain(token).await })
    }

    /// Abort any pending chain and freeze the state
    pub fn teardown(&self) {
        let _state = self.inner.state.write();
        self.inner.root.cancel();
        tracing::debug!("Weather view torn down");
    }

    pub fn is_torn_down(&self) -> bool {
        self.inner.root.is_cancelled()
    }

    /// Copy of the raw view state
    pub fn state(&self) -> ViewState {
        self.inner.state.read().clone()
    }

    /// Derived values for display
    pub fn view(&self) -> WeatherView {
        WeatherView::from_state(&self.inner.state.read(), self.inner.services.clock.as_ref())
    }

    async fn run_mount_chain(&self, token: CancellationToken) {
        let services = &self.inner.services;

        let record = match services.cache.read() {
            Some(record) => {
                tracing::info!("Using cached location: {}", record.city);
                record
            }
            None => {
                let lookup = tokio::select! {
                    _ = token.cancelled() => {
                        tracing::debug!("IP location lookup aborted");
                        return;
                    }
                    result = services.ip_locator.locate() => result,
                };
                match lookup {
                    Ok(record) => record,
                    Err(e) => {
                        tracing::error!("Error fetching location: {}", e);
                        return;
                    }
                }
            }
        };

        if !self.apply(
            &token,
            Transition::LocationResolved {
                label: record.city.clone(),
            },
        ) {
            return;
        }

        let weather = tokio::select! {
            _ = token.cancelled() => {
                tracing::debug!("Forecast request aborted");
                return;
            }
            result = services.provider.fetch(record.coordinates()) => result,
        };
        match weather {
            Ok(snapshot) => {
                self.apply(&token, Transition::WeatherLoaded(snapshot));
            }
            Err(e) => tracing::error!("Error fetching weather data: {}", e),
        }
    }

    /// Resolve the device's precise location, cache it and reload the forecast.
    ///
    /// Ignored while another precise request is pending, after teardown, or
    /// once the platform has reported that geolocation is unsupported.
    pub async fn request_precise_location(&self) {
        let root = &self.inner.root;
        let services = &self.inner.services;

        {
            let mut state = self.inner.state.write();
            if root.is_cancelled() {
                return;
            }
            if state.precise_in_flight {
                tracing::debug!("Precise location already pending");
                return;
            }
            if !state.precise_available {
                tracing::debug!("Precise location unsupported on this platform");
                return;
            }
            // Supersede a mount chain that is still running
            if let Some(mount) = self.inner.mount_token.lock().take() {
                mount.cancel();
            }
            state.apply(Transition::PreciseStarted);
        }

        let coordinates = match services.device.current_position().await {
            Ok(coordinates) => coordinates,
            Err(e) => {
                tracing::warn!("Device geolocation failed: {}", e);
                self.apply(root, Transition::PreciseFailed(e));
                return;
            }
        };

        let city = match services.geocoder.place_name(coordinates).await {
            Ok(name) => name,
            Err(LocationError::NoPlaceName) => {
                tracing::warn!(
                    "No place name for {}, {}; labelling with coordinates",
                    coordinates.latitude,
                    coordinates.longitude
                );
                coordinates.label()
            }
            Err(e) => {
                tracing::error!("Error reverse geocoding precise location: {}", e);
                self.apply(root, Transition::PreciseFinished);
                return;
            }
        };

        let record = LocationRecord::new(city, coordinates);
        services.cache.write(&record);

        if !self.apply(
            root,
            Transition::PreciseResolved {
                label: record.city.clone(),
            },
        ) {
            return;
        }

        match services.provider.fetch(coordinates).await {
            Ok(snapshot) => {
                self.apply(root, Transition::WeatherLoaded(snapshot));
            }
            Err(e) => tracing::error!("Error fetching weather data: {}", e),
        }
        self.apply(root, Transition::PreciseFinished);
    }

    /// Apply a transition unless `token` has been cancelled. Returns whether it was applied.
    fn apply(&self, token: &CancellationToken, transition: Transition) -> bool {
        let mut state = self.inner.state.write();
        if token.is_cancelled() {
            tracing::debug!("Discarding {:?} after cancellation", transition);
            return false;
        }
        state.apply(transition);
        true
    }
}
