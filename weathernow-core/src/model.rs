use std::fmt;

use serde::{Deserialize, Serialize};

/// Description used when the provider does not report a condition.
pub const MISSING_DESCRIPTION: &str = "—";

/// Icon used when the provider does not report one.
pub const DEFAULT_ICON_CODE: &str = "01d";

/// A city name as typed by the user, trimmed and guaranteed non-blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CityName(String);

impl CityName {
    /// Returns `None` for empty or whitespace-only input.
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.is_empty() { None } else { Some(Self(trimmed.to_string())) }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CityName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Normalized current conditions for one city.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeatherRecord {
    pub city: String,
    pub temperature_c: i32,
    pub description: String,
    pub humidity_pct: u8,
    pub wind_speed_kmh: i32,
    pub icon_code: String,
}

impl WeatherRecord {
    /// Image URL for the record's icon, e.g. `{base}/10d@2x.png`.
    pub fn icon_url(&self, icon_base_url: &str) -> String {
        format!("{}/{}@2x.png", icon_base_url.trim_end_matches('/'), self.icon_code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paris() -> WeatherRecord {
        WeatherRecord {
            city: "Paris".into(),
            temperature_c: 5,
            description: "clear sky".into(),
            humidity_pct: 40,
            wind_speed_kmh: 10,
            icon_code: "01d".into(),
        }
    }

    #[test]
    fn city_name_rejects_blank_input() {
        assert_eq!(CityName::parse(""), None);
        assert_eq!(CityName::parse("   "), None);
        assert_eq!(CityName::parse("\t\n"), None);
    }

    #[test]
    fn city_name_is_trimmed() {
        let city = CityName::parse("  New York ").expect("non-blank input");
        assert_eq!(city.as_str(), "New York");
        assert_eq!(city.to_string(), "New York");
    }

    #[test]
    fn icon_url_uses_double_density_png() {
        let record = paris();
        assert_eq!(
            record.icon_url("https://openweathermap.org/img/wn"),
            "https://openweathermap.org/img/wn/01d@2x.png"
        );
        assert_eq!(record.icon_url("http://icons.local/"), "http://icons.local/01d@2x.png");
    }
}
