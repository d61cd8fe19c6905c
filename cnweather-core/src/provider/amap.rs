use async_trait::async_trait;
use chrono::NaiveDateTime;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::ProviderError,
    model::WeatherReport,
    provider::{ProviderId, ProviderQuery, WeatherProvider, fetch_text, log_miss},
};

pub(crate) const AMAP_BASE_URL: &str = "https://restapi.amap.com/v3";

/// AMap live weather. Needs a key; place text is first turned into an adcode.
#[derive(Debug, Clone)]
pub struct AMapWeatherProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl AMapWeatherProvider {
    pub fn new(http: Client, api_key: String) -> Self {
        Self { api_key, http, base_url: AMAP_BASE_URL.to_string() }
    }

    pub fn with_base_url_opt(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    async fn adcode(&self, location: &str) -> Result<String, ProviderError> {
        let url = format!("{}/config/district", self.base_url);
        let request = self.http.get(url).query(&[
            ("keywords", location),
            ("subdistrict", "0"),
            ("key", self.api_key.as_str()),
        ]);

        let body = fetch_text(request).await?;
        parse_district(&body, location)
    }

    async fn fetch(&self, location: &str) -> Result<WeatherReport, ProviderError> {
        let adcode = self.adcode(location).await?;
        tracing::debug!(location, adcode = %adcode, "AMap district resolved");

        let url = format!("{}/weather/weatherInfo", self.base_url);
        let request = self.http.get(url).query(&[
            ("city", adcode.as_str()),
            ("extensions", "base"),
            ("key", self.api_key.as_str()),
        ]);

        let body = fetch_text(request).await?;
        parse_live(&body, location)
    }
}

#[derive(Debug, Deserialize)]
struct DistrictResponse {
    status: String,
    #[serde(default)]
    districts: Vec<District>,
}

#[derive(Debug, Deserialize)]
struct District {
    #[serde(default)]
    adcode: String,
}

#[derive(Debug, Deserialize)]
struct LiveResponse {
    status: String,
    #[serde(default)]
    lives: Vec<Live>,
}

#[derive(Debug, Deserialize)]
struct Live {
    #[serde(default)]
    city: String,
    weather: String,
    temperature: String,
    #[serde(default)]
    winddirection: String,
    #[serde(default)]
    windpower: String,
    #[serde(default)]
    humidity: String,
    #[serde(default)]
    reporttime: String,
}

#[async_trait]
impl WeatherProvider for AMapWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::AMap
    }

    async fn query(&self, query: &ProviderQuery) -> Option<WeatherReport> {
        let ProviderQuery::Text(location) = query else {
            return None;
        };

        log_miss(self.id(), location, self.fetch(location).await)
    }
}

fn parse_district(body: &str, location: &str) -> Result<String, ProviderError> {
    let parsed: DistrictResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("AMap district JSON: {e}")))?;

    if parsed.status != "1" {
        return Err(ProviderError::Malformed(format!("AMap district status {}", parsed.status)));
    }

    parsed
        .districts
        .into_iter()
        .map(|d| d.adcode)
        .find(|code| !code.trim().is_empty())
        .ok_or_else(|| ProviderError::NotFound(location.to_string()))
}

fn parse_live(body: &str, location: &str) -> Result<WeatherReport, ProviderError> {
    let parsed: LiveResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("AMap weather JSON: {e}")))?;

    if parsed.status != "1" {
        return Err(ProviderError::Malformed(format!("AMap weather status {}", parsed.status)));
    }
    let live =
        parsed.lives.into_iter().next().ok_or_else(|| ProviderError::NotFound(location.to_string()))?;

    let temperature = live
        .temperature
        .trim()
        .parse::<f64>()
        .map_err(|_| ProviderError::Malformed(format!("unusable temperature '{}'", live.temperature)))?;

    let place = if live.city.trim().is_empty() { location } else { live.city.as_str() };
    let wind_power = match live.windpower.trim() {
        "" => String::new(),
        power => format!("{power}级"),
    };
    let humidity = match live.humidity.trim() {
        "" => String::new(),
        h => format!("{h}%"),
    };

    let mut report = WeatherReport::new(ProviderId::AMap, place, live.weather.as_str(), temperature)
        .with_extra("风向", live.winddirection.as_str())
        .with_extra("风力", wind_power)
        .with_extra("湿度", humidity);
    report.observed_at = NaiveDateTime::parse_from_str(live.reporttime.trim(), "%Y-%m-%d %H:%M:%S").ok();

    Ok(report)
}
