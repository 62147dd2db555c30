use nimbus_core::{NetworkError, ReqwestErrorExt};
use serde::{Deserialize, Serialize};

/// Raw geographic coordinates in decimal degrees (WGS84)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Fallback label when no place name is known, e.g. "48.86, 2.35"
    pub fn label(&self) -> String {
        format!("{:.2}, {:.2}", self.latitude, self.longitude)
    }

    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// A resolved display location. The only value ever persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub city: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationRecord {
    pub fn new(city: impl Into<String>, coordinates: Coordinates) -> Self {
        Self {
            city: city.into(),
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
        }
    }

    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }

    /// All three fields present and usable
    pub fn is_well_formed(&self) -> bool {
        !self.city.trim().is_empty() && self.coordinates().is_valid()
    }
}

/// The subset of a forecast payload the widget displays
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherSnapshot {
    pub current_temperature: f64,
    pub current_weather_code: i32,
    /// Never empty
    pub daily_highs: Vec<f64>,
    /// Never empty
    pub daily_lows: Vec<f64>,
}

pub const MSG_PERMISSION_DENIED: &str =
    "Location access was denied. Please enable location permissions and try again.";
pub const MSG_POSITION_UNAVAILABLE: &str = "Location information is unavailable.";
pub const MSG_TIMEOUT: &str = "The request to get your location timed out.";
pub const MSG_UNKNOWN: &str = "An unknown error occurred while retrieving your location.";
pub const MSG_UNSUPPORTED: &str = "Geolocation is not supported on this device.";

/// Device geolocation failures, one per platform failure code
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeolocationError {
    #[error("Location permission denied")]
    PermissionDenied,
    #[error("Position unavailable")]
    PositionUnavailable,
    #[error("Location request timed out")]
    Timeout,
    #[error("Location error: {0}")]
    Unknown(String),
    /// The platform has no geolocation capability at all
    #[error("Geolocation not supported")]
    Unsupported,
}

impl GeolocationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::PermissionDenied => MSG_PERMISSION_DENIED,
            Self::PositionUnavailable => MSG_POSITION_UNAVAILABLE,
            Self::Timeout => MSG_TIMEOUT,
            Self::Unknown(_) => MSG_UNKNOWN,
            Self::Unsupported => MSG_UNSUPPORTED,
        }
    }

    /// Capability-absent is reported as a blocking notice, not an inline error
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Unsupported)
    }
}

/// Location resolution errors (IP lookup and reverse geocoding)
#[derive(Debug, thiserror::Error)]
pub enum LocationError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
    #[error("Reverse geocoding returned no place name")]
    NoPlaceName,
}

impl From<reqwest::Error> for LocationError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.into_network_error())
    }
}

/// Weather provider errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Network error: {0}")]
    Network(#[from] NetworkError),
    #[error("Parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for WeatherError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Self::Parse(e.to_string())
        } else {
            Self::Network(e.into_network_error())
        }
    }
}
