//! Windows.Devices.Geolocation.

use async_trait::async_trait;
use windows::Devices::Geolocation::{GeolocationAccessStatus, Geolocator};

use super::DeviceLocator;
use crate::types::{Coordinates, GeolocationError};

/// HRESULT for ERROR_TIMEOUT
const HRESULT_TIMEOUT: i32 = 0x8007_05B4_u32 as i32;

#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsLocator;

#[async_trait]
impl DeviceLocator for WindowsLocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        // WinRT `get()` blocks, keep it off the runtime threads
        tokio::task::spawn_blocking(locate_blocking)
            .await
            .map_err(|e| GeolocationError::Unknown(e.to_string()))?
    }
}

fn locate_blocking() -> Result<Coordinates, GeolocationError> {
    let access = Geolocator::RequestAccessAsync()
        .and_then(|op| op.get())
        .map_err(|_| GeolocationError::Unsupported)?;
    if access == GeolocationAccessStatus::Denied {
        return Err(GeolocationError::PermissionDenied);
    }
    if access != GeolocationAccessStatus::Allowed {
        return Err(GeolocationError::PositionUnavailable);
    }

    let locator = Geolocator::new().map_err(map_winrt_error)?;
    let position = locator
        .GetGeopositionAsync()
        .and_then(|op| op.get())
        .map_err(map_winrt_error)?;
    let point = position
        .Coordinate()
        .and_then(|c| c.Point())
        .and_then(|p| p.Position())
        .map_err(|_| GeolocationError::PositionUnavailable)?;

    Ok(Coordinates::new(point.Latitude, point.Longitude))
}

fn map_winrt_error(e: windows::core::Error) -> GeolocationError {
    if e.code().0 == HRESULT_TIMEOUT {
        GeolocationError::Timeout
    } else {
        GeolocationError::Unknown(e.message().to_string())
    }
}
