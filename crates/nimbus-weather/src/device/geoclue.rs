//! GeoClue2 over the system D-Bus.

use async_trait::async_trait;
use std::time::Duration;
use zbus::proxy::CacheProperties;
use zbus::zvariant::OwnedObjectPath;
use zbus::Connection;

use super::DeviceLocator;
use crate::types::{Coordinates, GeolocationError};

const DESKTOP_ID: &str = "nimbus";
/// GCLUE_ACCURACY_LEVEL_EXACT
const ACCURACY_LEVEL_EXACT: u32 = 8;
const POLL_INTERVAL: Duration = Duration::from_millis(250);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Manager",
    default_service = "org.freedesktop.GeoClue2",
    default_path = "/org/freedesktop/GeoClue2/Manager"
)]
trait Manager {
    fn get_client(&self) -> zbus::Result<OwnedObjectPath>;
}

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Client",
    default_service = "org.freedesktop.GeoClue2"
)]
trait Client {
    fn start(&self) -> zbus::Result<()>;

    fn stop(&self) -> zbus::Result<()>;

    #[zbus(property)]
    fn set_desktop_id(&self, id: &str) -> zbus::Result<()>;

    #[zbus(property)]
    fn set_requested_accuracy_level(&self, level: u32) -> zbus::Result<()>;

    #[zbus(property)]
    fn location(&self) -> zbus::Result<OwnedObjectPath>;
}

#[zbus::proxy(
    interface = "org.freedesktop.GeoClue2.Location",
    default_service = "org.freedesktop.GeoClue2"
)]
trait Location {
    #[zbus(property)]
    fn latitude(&self) -> zbus::Result<f64>;

    #[zbus(property)]
    fn longitude(&self) -> zbus::Result<f64>;
}

#[derive(Debug, Clone)]
pub struct GeoClueLocator {
    timeout: Duration,
}

impl Default for GeoClueLocator {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

#[async_trait]
impl DeviceLocator for GeoClueLocator {
    async fn current_position(&self) -> Result<Coordinates, GeolocationError> {
        // No system bus means no location service at all
        let conn = Connection::system().await.map_err(|e| {
            tracing::warn!("System D-Bus unavailable: {}", e);
            GeolocationError::Unsupported
        })?;

        let manager = ManagerProxy::new(&conn).await.map_err(map_dbus_error)?;
        let client_path = manager.get_client().await.map_err(map_dbus_error)?;
        let client = ClientProxy::builder(&conn)
            .path(client_path)
            .map_err(map_dbus_error)?
            .cache_properties(CacheProperties::No)
            .build()
            .await
            .map_err(map_dbus_error)?;

        client
            .set_desktop_id(DESKTOP_ID)
            .await
            .map_err(map_dbus_error)?;
        client
            .set_requested_accuracy_level(ACCURACY_LEVEL_EXACT)
            .await
            .map_err(map_dbus_error)?;
        client.start().await.map_err(map_dbus_error)?;

        let result = tokio::time::timeout(self.timeout, wait_for_fix(&conn, &client))
            .await
            .unwrap_or(Err(GeolocationError::Timeout));

        if let Err(e) = client.stop().await {
            tracing::debug!("GeoClue client stop failed: {}", e);
        }
        result
    }
}

async fn wait_for_fix(
    conn: &Connection,
    client: &ClientProxy<'_>,
) -> Result<Coordinates, GeolocationError> {
    loop {
        let path = client.location().await.map_err(map_dbus_error)?;
        if path.as_str() != "/" {
            let location = LocationProxy::builder(conn)
                .path(path)
                .map_err(map_dbus_error)?
                .build()
                .await
                .map_err(map_dbus_error)?;
            let latitude = location
                .latitude()
                .await
                .map_err(|_| GeolocationError::PositionUnavailable)?;
            let longitude = location
                .longitude()
                .await
                .map_err(|_| GeolocationError::PositionUnavailable)?;

            let coordinates = Coordinates::new(latitude, longitude);
            if !coordinates.is_valid() {
                return Err(GeolocationError::PositionUnavailable);
            }
            tracing::info!("GeoClue fix: {}, {}", latitude, longitude);
            return Ok(coordinates);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

fn map_dbus_error(e: zbus::Error) -> GeolocationError {
    tracing::debug!("GeoClue D-Bus error: {}", e);
    match &e {
        zbus::Error::MethodError(name, _, _) => classify_error_name(name.as_str(), &e),
        zbus::Error::FDO(fdo) => match fdo.as_ref() {
            zbus::fdo::Error::AccessDenied(_) => GeolocationError::PermissionDenied,
            zbus::fdo::Error::ServiceUnknown(_) => GeolocationError::Unsupported,
            zbus::fdo::Error::NoReply(_) | zbus::fdo::Error::Timeout(_) => {
                GeolocationError::Timeout
            }
            _ => GeolocationError::Unknown(e.to_string()),
        },
        _ => GeolocationError::Unknown(e.to_string()),
    }
}

fn classify_error_name(name: &str, e: &zbus::Error) -> GeolocationError {
    match name {
        "org.freedesktop.DBus.Error.AccessDenied" => GeolocationError::PermissionDenied,
        "org.freedesktop.DBus.Error.ServiceUnknown" => GeolocationError::Unsupported,
        "org.freedesktop.DBus.Error.NoReply" | "org.freedesktop.DBus.Error.Timeout" => {
            GeolocationError::Timeout
        }
        "org.freedesktop.DBus.Error.NotSupported" => GeolocationError::PositionUnavailable,
        _ => GeolocationError::Unknown(e.to_string()),
    }
}
