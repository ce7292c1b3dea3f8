use crate::{CityName, Config, WeatherError, WeatherRecord, provider::openweather::OpenWeatherProvider};
use async_trait::async_trait;
use reqwest::Client;
use std::{fmt::Debug, time::Duration};

pub mod openweather;

#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions for `city`. Exactly one of record or error.
    async fn fetch_weather(&self, city: &CityName) -> Result<WeatherRecord, WeatherError>;
}

/// Construct the weather provider described by `config`.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = config.api_key()?;

    let provider = OpenWeatherProvider::with_base_url(
        api_key.to_owned(),
        config.weather.base_url.clone(),
        config.weather.timeout_secs,
    )?;

    Ok(Box::new(provider))
}

/// HTTP client with an optional whole-request timeout.
pub(crate) fn http_client(timeout_secs: Option<u64>) -> reqwest::Result<Client> {
    let builder = Client::builder();
    let builder = match timeout_secs {
        Some(secs) => builder.timeout(Duration::from_secs(secs)),
        None => builder,
    };
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("No API key configured"));
    }

    #[test]
    fn provider_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());
        cfg.weather.timeout_secs = Some(5);

        let provider = provider_from_config(&cfg);
        assert!(provider.is_ok());
    }
}
