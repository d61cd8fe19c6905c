use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::ProviderError,
    model::{Coordinates, WeatherReport},
    phrases::wmo_description,
    provider::{ProviderId, ProviderQuery, WeatherProvider, fetch_text, log_miss},
};

const BASE_URL: &str = "https://api.open-meteo.com/v1";

#[derive(Debug, Clone)]
pub struct OpenMeteoProvider {
    http: Client,
    base_url: String,
}

impl OpenMeteoProvider {
    pub fn new(http: Client) -> Self {
        Self { http, base_url: BASE_URL.to_string() }
    }

    pub fn with_base_url_opt(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    async fn fetch(&self, coordinates: Coordinates, label: &str) -> Result<WeatherReport, ProviderError> {
        let url = format!("{}/forecast", self.base_url);
        let request = self.http.get(url).query(&[
            ("latitude", coordinates.latitude.to_string()),
            ("longitude", coordinates.longitude.to_string()),
            ("current_weather", "true".to_string()),
            ("temperature_unit", "celsius".to_string()),
            ("windspeed_unit", "kmh".to_string()),
            ("timezone", "auto".to_string()),
        ]);

        let body = fetch_text(request).await?;
        parse_current(&body, label)
    }
}

#[derive(Debug, Deserialize)]
struct OmResponse {
    current_weather: Option<OmCurrent>,
}

#[derive(Debug, Deserialize)]
struct OmCurrent {
    temperature: f64,
    #[serde(default)]
    weathercode: u16,
    windspeed: Option<f64>,
    winddirection: Option<f64>,
    time: Option<String>,
}

#[async_trait]
impl WeatherProvider for OpenMeteoProvider {
    fn id(&self) -> ProviderId {
        ProviderId::OpenMeteo
    }

    async fn query(&self, query: &ProviderQuery) -> Option<WeatherReport> {
        let ProviderQuery::Coordinates { coordinates, label } = query else {
            return None;
        };

        log_miss(self.id(), label, self.fetch(*coordinates, label).await)
    }
}

pub fn parse_current(body: &str, label: &str) -> Result<WeatherReport, ProviderError> {
    let parsed: OmResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("Open-Meteo JSON: {e}")))?;
    let current = parsed
        .current_weather
        .ok_or_else(|| ProviderError::Malformed("missing current_weather".to_string()))?;

    let mut report = WeatherReport::new(
        ProviderId::OpenMeteo,
        label,
        wmo_description(current.weathercode),
        current.temperature,
    );
    if let Some(speed) = current.windspeed {
        report = report.with_extra("风速", format!("{speed}km/h"));
    }
    if let Some(direction) = current.winddirection {
        report = report.with_extra("风向", format!("{direction}°"));
    }
    report.observed_at = current
        .time
        .as_deref()
        .and_then(|t| NaiveDateTime::parse_from_str(t, "%Y-%m-%dT%H:%M").ok());

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_current_weather() {
        let body = r#"{"latitude":51.5,"longitude":-0.12,"current_weather":{"time":"2024-03-01T14:00","temperature":9.3,"windspeed":14.2,"winddirection":250,"weathercode":61}}"#;
        let report = parse_current(body, "London").unwrap();

        assert_eq!(report.description, "小雨");
        assert_eq!(report.temperature_celsius, 9.3);
        assert_eq!(report.extra.get("风速").map(String::as_str), Some("14.2km/h"));
        assert_eq!(
            report.observed_at.map(|t| t.to_string()).as_deref(),
            Some("2024-03-01 14:00:00")
        );
    }

    #[test]
    fn missing_block_is_malformed() {
        assert!(matches!(parse_current(r#"{"latitude":1.0}"#, "x"), Err(ProviderError::Malformed(_))));
        assert!(parse_current("not json", "x").is_err());
    }
}
