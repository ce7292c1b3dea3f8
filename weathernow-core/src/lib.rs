//! Core library for the `weathernow` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The OpenWeather lookup behind the [`WeatherProvider`] abstraction
//! - Natural-language summaries with a deterministic fallback
//! - The search session that the presentation layer renders
//!
//! It is used by `weathernow-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod provider;
pub mod session;
pub mod summary;

pub use config::{Config, SamplingParams, SummaryConfig, WeatherConfig};
pub use error::{FetchFailure, WeatherError};
pub use model::{CityName, WeatherRecord};
pub use provider::{WeatherProvider, provider_from_config};
pub use session::{SearchOutcome, SearchSession, SessionState};
pub use summary::{Summarizer, TextGenerator, summarizer_from_config};
