#![allow(dead_code)]

use weathernow_core::Config;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

pub const API_KEY: &str = "test-key";
pub const PRIMARY_PATH: &str = "/models/gpt2";
pub const SECONDARY_PATH: &str = "/models/facebook/blenderbot_small-90M";

/// Nothing listens here; connections are refused.
pub const UNREACHABLE_URL: &str = "http://127.0.0.1:9/models/unreachable";

/// Config pointing every endpoint at `server`.
pub fn config_for(server: &MockServer) -> Config {
    let mut config = Config::default();
    config.set_api_key(API_KEY.to_string());
    config.weather.base_url = server.uri();
    config.summary.primary_url = format!("{}{PRIMARY_PATH}", server.uri());
    config.summary.secondary_url = format!("{}{SECONDARY_PATH}", server.uri());
    config.weather.timeout_secs = Some(5);
    config.summary.timeout_secs = Some(5);
    config
}

pub fn openweather_body(city: &str, temp: f64, description: &str) -> serde_json::Value {
    serde_json::json!({
        "coord": { "lon": 2.35, "lat": 48.85 },
        "weather": [{ "id": 800, "main": "Clear", "description": description, "icon": "01d" }],
        "main": { "temp": temp, "feels_like": temp - 2.0, "humidity": 40, "pressure": 1012 },
        "wind": { "speed": 2.78, "deg": 200 },
        "dt": 1_700_000_000,
        "name": city,
        "cod": 200
    })
}

/// Both generation backends answer 503, so summaries use the fallback sentence.
pub async fn mount_generation_unavailable(server: &MockServer) {
    for p in [PRIMARY_PATH, SECONDARY_PATH] {
        Mock::given(method("POST"))
            .and(path(p))
            .respond_with(ResponseTemplate::new(503))
            .mount(server)
            .await;
    }
}
