//! Open-Meteo forecast client.

use reqwest::Client;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

use crate::types::{Coordinates, WeatherError, WeatherSnapshot};
use nimbus_core::{NetworkError, ReqwestErrorExt, WeatherConfig};

const DAILY_FIELDS: &str = "weathercode,temperature_2m_max,temperature_2m_min,precipitation_sum";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    current_weather: Option<CurrentWeatherBlock>,
    daily: Option<DailyBlock>,
}

#[derive(Debug, Deserialize)]
struct CurrentWeatherBlock {
    temperature: f64,
    weathercode: i32,
}

#[derive(Debug, Deserialize)]
struct DailyBlock {
    #[serde(default)]
    temperature_2m_max: Vec<f64>,
    #[serde(default)]
    temperature_2m_min: Vec<f64>,
}

impl TryFrom<ForecastResponse> for WeatherSnapshot {
    type Error = WeatherError;

    fn try_from(body: ForecastResponse) -> Result<Self, Self::Error> {
        let current = body
            .current_weather
            .ok_or_else(|| WeatherError::Parse("missing current_weather".to_string()))?;
        let daily = body
            .daily
            .ok_or_else(|| WeatherError::Parse("missing daily".to_string()))?;

        if daily.temperature_2m_max.is_empty() || daily.temperature_2m_min.is_empty() {
            return Err(WeatherError::Parse("empty daily forecast".to_string()));
        }

        Ok(WeatherSnapshot {
            current_temperature: current.temperature,
            current_weather_code: current.weathercode,
            daily_highs: daily.temperature_2m_max,
            daily_lows: daily.temperature_2m_min,
        })
    }
}

/// Build the HTTP client shared by every lookup
pub fn build_http_client(config: &WeatherConfig) -> Result<Client, NetworkError> {
    Client::builder()
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .user_agent(config.user_agent.clone())
        .build()
        .map_err(ReqwestErrorExt::into_network_error)
}

#[derive(Debug, Clone)]
pub struct WeatherProvider {
    client: Arc<Client>,
    endpoint: Url,
}

impl WeatherProvider {
    pub fn new(client: Arc<Client>, endpoint: Url) -> Self {
        Self { client, endpoint }
    }

    /// Fetch current conditions and the daily forecast for a point
    pub async fn fetch(&self, coordinates: Coordinates) -> Result<WeatherSnapshot, WeatherError> {
        let mut url = self.endpoint.clone();
        url.query_pairs_mut()
            .append_pair("latitude", &coordinates.latitude.to_string())
            .append_pair("longitude", &coordinates.longitude.to_string())
            .append_pair("daily", DAILY_FIELDS)
            .append_pair("current_weather", "true")
            .append_pair("timezone", "auto");

        tracing::debug!(
            "Fetching forecast for {}, {}",
            coordinates.latitude,
            coordinates.longitude
        );

        let body: ForecastResponse = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let snapshot = WeatherSnapshot::try_from(body)?;
        tracing::info!(
            "Forecast loaded: {}°, code {}, {} day(s)",
            snapshot.current_temperature,
            snapshot.current_weather_code,
            snapshot.daily_highs.len()
        );
        Ok(snapshot)
    }
}
