use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Weather provider settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeather API key. Usually supplied via `weathernow configure`
    /// or the `WEATHERNOW_API_KEY` environment variable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    #[serde(default = "default_icon_base_url")]
    pub icon_base_url: String,

    /// Request timeout; no timeout when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_weather_base_url(),
            icon_base_url: default_icon_base_url(),
            timeout_secs: None,
        }
    }
}

/// Sampling parameters sent to the primary text-generation backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SamplingParams {
    #[serde(default = "default_max_length")]
    pub max_length: u32,
    #[serde(default = "default_min_length")]
    pub min_length: u32,
    #[serde(default = "default_do_sample")]
    pub do_sample: bool,
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    #[serde(default = "default_top_p")]
    pub top_p: f64,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            max_length: default_max_length(),
            min_length: default_min_length(),
            do_sample: default_do_sample(),
            temperature: default_temperature(),
            top_p: default_top_p(),
        }
    }
}

/// Text-generation backends used for the weather summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryConfig {
    /// General text-generation model, tried first.
    #[serde(default = "default_primary_url")]
    pub primary_url: String,

    /// Dialogue model, tried when the primary gives no usable text.
    #[serde(default = "default_secondary_url")]
    pub secondary_url: String,

    /// Generated text shorter than this (after trimming) is discarded.
    #[serde(default = "default_min_usable_chars")]
    pub min_usable_chars: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default)]
    pub sampling: SamplingParams,
}

impl Default for SummaryConfig {
    fn default() -> Self {
        Self {
            primary_url: default_primary_url(),
            secondary_url: default_secondary_url(),
            min_usable_chars: default_min_usable_chars(),
            timeout_secs: None,
            sampling: SamplingParams::default(),
        }
    }
}

fn default_weather_base_url() -> String {
    "https://api.openweathermap.org/data/2.5".to_string()
}

fn default_icon_base_url() -> String {
    "https://openweathermap.org/img/wn".to_string()
}

fn default_primary_url() -> String {
    "https://api-inference.huggingface.co/models/gpt2".to_string()
}

fn default_secondary_url() -> String {
    "https://api-inference.huggingface.co/models/facebook/blenderbot_small-90M".to_string()
}

const fn default_min_usable_chars() -> usize {
    10
}

const fn default_max_length() -> u32 {
    80
}

const fn default_min_length() -> u32 {
    30
}

const fn default_do_sample() -> bool {
    true
}

const fn default_temperature() -> f64 {
    0.7
}

const fn default_top_p() -> f64 {
    0.9
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [weather]
/// api_key = "..."
///
/// [summary.sampling]
/// temperature = 0.5
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub summary: SummaryConfig,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weathernow", "weathernow")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.weather.api_key = Some(api_key);
    }

    /// Returns the weather API key, or an error telling the user how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.weather
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                anyhow!(
                    "No API key configured for the weather provider.\n\
                     Hint: run `weathernow configure` or set WEATHERNOW_API_KEY."
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("Hint: run `weathernow configure`"));
    }

    #[test]
    fn blank_api_key_counts_as_missing() {
        let mut cfg = Config::default();
        cfg.set_api_key("   ".into());

        assert!(cfg.api_key().is_err());
    }

    #[test]
    fn set_api_key_replaces_previous() {
        let mut cfg = Config::default();

        cfg.set_api_key("OLD".into());
        cfg.set_api_key("NEW".into());

        assert_eq!(cfg.api_key().expect("key must exist"), "NEW");
    }

    #[test]
    fn empty_file_yields_defaults() {
        let cfg = Config::from_toml("").expect("empty config parses");

        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.summary.min_usable_chars, 10);
        assert_eq!(cfg.summary.sampling.max_length, 80);
        assert_eq!(cfg.summary.sampling.min_length, 30);
        assert!(cfg.summary.sampling.do_sample);
        assert!((cfg.summary.sampling.temperature - 0.7).abs() < f64::EPSILON);
        assert!((cfg.summary.sampling.top_p - 0.9).abs() < f64::EPSILON);
        assert!(cfg.weather.timeout_secs.is_none());
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let cfg = Config::from_toml(
            r#"
            [weather]
            api_key = "KEY"

            [summary.sampling]
            temperature = 0.3
            "#,
        )
        .expect("partial config parses");

        assert_eq!(cfg.api_key().expect("key must exist"), "KEY");
        assert_eq!(cfg.weather.base_url, "https://api.openweathermap.org/data/2.5");
        assert!((cfg.summary.sampling.temperature - 0.3).abs() < f64::EPSILON);
        assert_eq!(cfg.summary.sampling.max_length, 80);
    }

    #[test]
    fn toml_roundtrip_preserves_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());

        let text = toml::to_string_pretty(&cfg).expect("serializes");
        let parsed = Config::from_toml(&text).expect("parses back");

        assert_eq!(parsed, cfg);
    }
}
