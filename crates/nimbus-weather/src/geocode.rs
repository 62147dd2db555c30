//! Reverse geocoding: convert coordinates to a human-readable place name.
//! Uses Nominatim (OpenStreetMap) - free, no API key required.

use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::types::{Coordinates, LocationError};

#[derive(Debug, Deserialize)]
struct NominatimResponse {
    address: Option<NominatimAddress>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NominatimAddress {
    pub city: Option<String>,
    pub town: Option<String>,
    pub village: Option<String>,
    pub county: Option<String>,
    pub state: Option<String>,
    pub state_district: Option<String>,
    pub country: Option<String>,
}

/// First non-empty field in order city > town > village > county > state >
/// state district > country.
pub fn pick_place_name(addr: NominatimAddress) -> Option<String> {
    [
        addr.city,
        addr.town,
        addr.village,
        addr.county,
        addr.state,
        addr.state_district,
        addr.country,
    ]
    .into_iter()
    .flatten()
    .find(|name| !name.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct ReverseGeocoder {
    client: Arc<Client>,
    endpoint: Url,
}

impl ReverseGeocoder {
    pub fn new(client: Arc<Client>, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Reverse geocode coordinates to a place name (e.g. "Seattle").
    ///
    /// A response without any usable address field is `LocationError::NoPlaceName`.
    pub async fn place_name(&self, coordinates: Coordinates) -> Result<String, LocationError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("format", "json")
            .append_pair("lat", &coordinates.latitude.to_string())
            .append_pair("lon", &coordinates.longitude.to_string());

        let body: NominatimResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let place = body
            .address
            .and_then(pick_place_name)
            .ok_or(LocationError::NoPlaceName)?;

        tracing::info!("Reverse geocoded to: {}", place);
        Ok(place)
    }
}
