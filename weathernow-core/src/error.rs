use reqwest::StatusCode;
use thiserror::Error;

/// Failure to look up weather for a city.
///
/// The `Display` text is the user-facing message; the cause of a
/// [`WeatherError::Transient`] failure is available through `source()`.
#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("City not found")]
    NotFound,

    #[error("Unable to load weather. Please try again.")]
    Transient(#[from] FetchFailure),
}

impl WeatherError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, WeatherError::NotFound)
    }
}

/// Why a weather lookup failed for a reason other than an unknown city.
#[derive(Debug, Error)]
pub enum FetchFailure {
    #[error("request to weather provider failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("weather provider returned status {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("failed to parse weather provider JSON: {0}")]
    Parse(#[from] serde_json::Error),
}
