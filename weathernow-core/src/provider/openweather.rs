use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::{
    CityName, WeatherError, WeatherRecord,
    error::FetchFailure,
    model::{DEFAULT_ICON_CODE, MISSING_DESCRIPTION},
};

use super::{WeatherProvider, http_client};

const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    api_key: String,
    base_url: String,
    http: Client,
}

impl OpenWeatherProvider {
    /// `base_url` is the API root, e.g. `https://api.openweathermap.org/data/2.5`.
    pub fn with_base_url(
        api_key: String,
        base_url: String,
        timeout_secs: Option<u64>,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            http: http_client(timeout_secs)?,
        })
    }

    async fn fetch_current(&self, city: &CityName) -> Result<WeatherRecord, WeatherError> {
        let url = format!("{}/weather", self.base_url);

        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city.as_str()),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .await
            .map_err(FetchFailure::from)?;

        let status = res.status();
        if status == StatusCode::NOT_FOUND {
            debug!(%status, "OpenWeather does not know this city");
            return Err(WeatherError::NotFound);
        }

        let body = res.text().await.map_err(FetchFailure::from)?;

        if !status.is_success() {
            return Err(FetchFailure::Status { status, body: truncate_body(&body) }.into());
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body).map_err(FetchFailure::from)?;

        Ok(parsed.into_record())
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    icon: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    #[serde(default)]
    speed: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    main: OwMain,
    #[serde(default)]
    weather: Vec<OwWeather>,
    #[serde(default)]
    wind: Option<OwWind>,
}

impl OwCurrentResponse {
    fn into_record(self) -> WeatherRecord {
        let condition = self.weather.into_iter().next();
        let (description, icon) = match condition {
            Some(w) => (w.description, w.icon),
            None => (None, None),
        };

        let wind_mps = self.wind.and_then(|w| w.speed).unwrap_or(0.0);

        WeatherRecord {
            city: self.name,
            temperature_c: self.main.temp.round() as i32,
            description: description.unwrap_or_else(|| MISSING_DESCRIPTION.to_string()),
            humidity_pct: self.main.humidity,
            wind_speed_kmh: (wind_mps * MPS_TO_KMH).round() as i32,
            icon_code: icon.unwrap_or_else(|| DEFAULT_ICON_CODE.to_string()),
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    #[instrument(skip_all, fields(city = %city))]
    async fn fetch_weather(&self, city: &CityName) -> Result<WeatherRecord, WeatherError> {
        let result = self.fetch_current(city).await;

        match &result {
            Ok(record) => debug!(
                temperature_c = record.temperature_c,
                description = %record.description,
                "weather fetched"
            ),
            Err(WeatherError::Transient(cause)) => warn!(%cause, "weather lookup failed"),
            Err(WeatherError::NotFound) => {}
        }

        result
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: serde_json::Value) -> WeatherRecord {
        serde_json::from_value::<OwCurrentResponse>(json)
            .expect("valid OpenWeather payload")
            .into_record()
    }

    #[test]
    fn maps_complete_payload() {
        let record = parse(serde_json::json!({
            "name": "Paris",
            "main": { "temp": 4.6, "feels_like": 1.2, "humidity": 40 },
            "weather": [{ "description": "clear sky", "icon": "01n" }],
            "wind": { "speed": 10.0 }
        }));

        assert_eq!(
            record,
            WeatherRecord {
                city: "Paris".into(),
                temperature_c: 5,
                description: "clear sky".into(),
                humidity_pct: 40,
                wind_speed_kmh: 36,
                icon_code: "01n".into(),
            }
        );
    }

    #[test]
    fn missing_optional_fields_use_defaults() {
        let record = parse(serde_json::json!({
            "name": "Nowhere",
            "main": { "temp": 12.0, "humidity": 80 }
        }));

        assert_eq!(record.description, "—");
        assert_eq!(record.wind_speed_kmh, 0);
        assert_eq!(record.icon_code, "01d");
    }

    #[test]
    fn empty_weather_list_and_speedless_wind() {
        let record = parse(serde_json::json!({
            "name": "Calm",
            "main": { "temp": 0.0, "humidity": 0 },
            "weather": [],
            "wind": { "deg": 90 }
        }));

        assert_eq!(record.description, "—");
        assert_eq!(record.icon_code, "01d");
        assert_eq!(record.wind_speed_kmh, 0);
    }

    #[test]
    fn rounds_half_away_from_zero() {
        let warm = parse(serde_json::json!({
            "name": "A", "main": { "temp": 2.5, "humidity": 1 }, "wind": { "speed": 3.3 }
        }));
        assert_eq!(warm.temperature_c, 3);
        // 11.88 km/h
        assert_eq!(warm.wind_speed_kmh, 12);

        let cold = parse(serde_json::json!({
            "name": "B", "main": { "temp": -2.5, "humidity": 1 }
        }));
        assert_eq!(cold.temperature_c, -3);
    }

    #[test]
    fn truncate_body_respects_char_boundaries() {
        let long = "é".repeat(250);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert_eq!(truncated.chars().count(), 203);

        assert_eq!(truncate_body("short"), "short");
    }
}
