//! Precise device geolocation.
//!
//! Each platform backend maps its native failures onto `GeolocationError`.
//! Platforms without a backend report `GeolocationError::Unsupported`.

use async_trait::async_trait;
use std::sync::Arc;

use crate::types::{Coordinates, GeolocationError};

#[cfg(target_os = "linux")]
mod geoclue;
#[cfg(windows)]
mod winrt;

#[async_trait]
pub trait DeviceLocator: Send + Sync {
    /// Ask the platform for the device's current position
    async fn current_position(&self) -> Result<Coordinates, GeolocationError>;
}

/// A platform with no geolocation capability
#[derive(Debug, Clone, Copy, Default)]
pub struct UnsupportedLocator;

#[async_trait]
impl DeviceLocator for UnsupportedLocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        Err(GeolocationError::Unsupported)
    }
}

/// The device locator for the platform this binary was built for
pub fn platform_locator() -> Arc<dyn DeviceLocator> {
    #[cfg(target_os = "linux")]
    {
        Arc::new(geoclue::GeoClueLocator::default())
    }
    #[cfg(windows)]
    {
        Arc::new(winrt::WindowsLocator)
    }
    #[cfg(not(any(target_os = "linux", windows)))]
    {
        Arc::new(UnsupportedLocator)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unsupported_locator() {
        let err = UnsupportedLocator.current_position().await.unwrap_err();
        assert_eq!(err, GeolocationError::Unsupported);
    }
}
