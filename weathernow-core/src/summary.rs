//! Natural-language weather summaries.
//!
//! A [`Summarizer`] asks a general text-generation backend first, then a
//! dialogue backend, and falls back to a fixed sentence when neither gives
//! usable text. It never fails.

use async_trait::async_trait;
use std::fmt::{self, Debug};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::{
    SummaryConfig, WeatherRecord,
    provider::http_client,
    summary::huggingface::{DialogueBackend, TextGenerationBackend},
};

pub mod huggingface;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeOfDay {
    Morning,
    Afternoon,
    Evening,
}

impl TimeOfDay {
    /// 0–11 is morning, 12–17 afternoon, everything later evening.
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            0..=11 => TimeOfDay::Morning,
            12..=17 => TimeOfDay::Afternoon,
            _ => TimeOfDay::Evening,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TimeOfDay::Morning => "morning",
            TimeOfDay::Afternoon => "afternoon",
            TimeOfDay::Evening => "evening",
        }
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureFeel {
    Cool,
    Mild,
    Warm,
}

impl TemperatureFeel {
    pub fn from_celsius(temperature_c: i32) -> Self {
        match temperature_c {
            t if t < 10 => TemperatureFeel::Cool,
            t if t < 20 => TemperatureFeel::Mild,
            _ => TemperatureFeel::Warm,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TemperatureFeel::Cool => "cool",
            TemperatureFeel::Mild => "mild",
            TemperatureFeel::Warm => "warm",
        }
    }
}

impl fmt::Display for TemperatureFeel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub fn build_prompt(record: &WeatherRecord, time_of_day: TimeOfDay) -> String {
    format!(
        "It's {}°C and {} in {} this {}.",
        record.temperature_c, record.description, record.city, time_of_day
    )
}

/// The sentence used when no backend produced usable text.
pub fn fallback_summary(record: &WeatherRecord, time_of_day: TimeOfDay) -> String {
    format!(
        "It's a {} and {} {} in {}, perfect for a walk.",
        TemperatureFeel::from_celsius(record.temperature_c),
        record.description,
        time_of_day,
        record.city
    )
}

#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("text generation request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to parse text generation JSON: {0}")]
    Parse(#[from] serde_json::Error),
}

/// A text-generation service.
#[async_trait]
pub trait TextGenerator: Send + Sync + Debug {
    /// Generated text for `prompt`, or `Ok(None)` if the service answered
    /// with a non-success status.
    async fn generate(&self, prompt: &str) -> Result<Option<String>, GenerationError>;
}

#[derive(Debug)]
pub struct Summarizer {
    primary: Box<dyn TextGenerator>,
    secondary: Box<dyn TextGenerator>,
    min_usable_chars: usize,
}

impl Summarizer {
    pub fn new(
        primary: Box<dyn TextGenerator>,
        secondary: Box<dyn TextGenerator>,
        min_usable_chars: usize,
    ) -> Self {
        Self { primary, secondary, min_usable_chars }
    }

    /// Summary of `record` as seen at local hour `now_hour`.
    #[instrument(skip_all, fields(city = %record.city, hour = now_hour))]
    pub async fn generate_summary(&self, record: &WeatherRecord, now_hour: u32) -> String {
        let time_of_day = TimeOfDay::from_hour(now_hour);
        let prompt = build_prompt(record, time_of_day);

        match self.generated_text(&prompt).await {
            Ok(Some(text)) => polish(&text),
            Ok(None) => {
                debug!("no usable generated text, using fallback summary");
                fallback_summary(record, time_of_day)
            }
            Err(err) => {
                warn!(%err, "text generation failed, using fallback summary");
                fallback_summary(record, time_of_day)
            }
        }
    }

    // An error from either backend ends the chain; it never falls through to
    // the secondary backend.
    async fn generated_text(&self, prompt: &str) -> Result<Option<String>, GenerationError> {
        let primary = self.primary.generate(prompt).await?.unwrap_or_default();
        let primary = strip_prompt(prompt, primary);
        if self.is_usable(&primary) {
            return Ok(Some(primary));
        }

        debug!(len = primary.trim().chars().count(), "primary text unusable, trying secondary");

        let secondary = self.secondary.generate(prompt).await?.unwrap_or_default();
        Ok(self.is_usable(&secondary).then_some(secondary))
    }

    fn is_usable(&self, text: &str) -> bool {
        let trimmed = text.trim();
        !trimmed.is_empty() && trimmed.chars().count() >= self.min_usable_chars
    }
}

/// Build the summarizer described by `config`.
pub fn summarizer_from_config(config: &SummaryConfig) -> anyhow::Result<Summarizer> {
    let http = http_client(config.timeout_secs)?;

    let primary = TextGenerationBackend::new(
        http.clone(),
        config.primary_url.clone(),
        config.sampling.clone(),
    );
    let secondary = DialogueBackend::new(http, config.secondary_url.clone());

    Ok(Summarizer::new(Box::new(primary), Box::new(secondary), config.min_usable_chars))
}

fn strip_prompt(prompt: &str, text: String) -> String {
    match text.strip_prefix(prompt) {
        Some(rest) => rest.trim().to_string(),
        None => text,
    }
}

fn polish(text: &str) -> String {
    let trimmed = text.trim();
    let mut chars = trimmed.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
