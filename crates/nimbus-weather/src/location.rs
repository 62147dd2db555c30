//! Approximate location from the caller's public IP address.

use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use url::Url;

use crate::types::{Coordinates, LocationError, LocationRecord};

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    city: Option<String>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

/// Best-effort IP geolocation (ipapi.co compatible)
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Arc<Client>,
    endpoint: Url,
}

impl IpLocator {
    pub fn new(client: Arc<Client>, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Look up the caller's approximate location
    pub async fn locate(&self) -> Result<LocationRecord, LocationError> {
        tracing::debug!("IP location lookup via {}", self.endpoint);

        let body: IpLookupResponse = self
            .client
            .get(self.endpoint.clone())
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        if body.error {
            return Err(LocationError::InvalidResponse(
                body.reason.unwrap_or_else(|| "lookup refused".to_string()),
            ));
        }

        let (Some(latitude), Some(longitude)) = (body.latitude, body.longitude) else {
            return Err(LocationError::InvalidResponse(
                "missing latitude/longitude".to_string(),
            ));
        };
        let coordinates = Coordinates::new(latitude, longitude);

        let city = body
            .city
            .filter(|c| !c.trim().is_empty())
            .unwrap_or_else(|| coordinates.label());

        let record = LocationRecord::new(city, coordinates);
        if !record.is_well_formed() {
            return Err(LocationError::InvalidResponse(format!(
                "coordinates out of range: {}, {}",
                latitude, longitude
            )));
        }

        tracing::info!(
            "IP location resolved: {} ({}, {})",
            record.city,
            record.latitude,
            record.longitude
        );
        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn locator_for(server: &MockServer) -> IpLocator {
        let endpoint = Url::parse(&format!("{}/json/", server.uri())).unwrap();
        IpLocator::new(Arc::new(Client::new()), endpoint)
    }

    #[tokio::test]
    async fn test_locate_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "ip": "203.0.113.7",
                "city": "Lyon",
                "region": "Auvergne-Rhone-Alpes",
                "latitude": 45.764,
                "longitude": 4.8357
            })))
            .mount(&server)
            .await;

        let record = locator_for(&server).locate().await.unwrap();

        assert_eq!(record.city, "Lyon");
        assert_eq!(record.latitude, 45.764);
        assert_eq!(record.longitude, 4.8357);
    }

    #[tokio::test]
    async fn test_locate_without_city_uses_coordinates() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "latitude": 45.764,
                "longitude": 4.8357
            })))
            .mount(&server)
            .await;

        let record = locator_for(&server).locate().await.unwrap();
        assert_eq!(record.city, "45.76, 4.84");
    }

    #[tokio::test]
    async fn test_locate_error_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "error": true,
                "reason": "RateLimited"
            })))
            .mount(&server)
            .await;

        let err = locator_for(&server).locate().await.unwrap_err();
        assert!(matches!(err, LocationError::InvalidResponse(ref r) if r == "RateLimited"));
    }

    #[tokio::test]
    async fn test_locate_server_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/json/"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let err = locator_for(&server).locate().await.unwrap_err();
        assert!(matches!(
            err,
            LocationError::Network(nimbus_core::NetworkError::ServerError { status: 503, .. })
        ));
    }
}
