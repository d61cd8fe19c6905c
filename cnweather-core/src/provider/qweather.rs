use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::{
    error::ProviderError,
    model::{Coordinates, WeatherReport},
    provider::{ProviderId, ProviderQuery, WeatherProvider, fetch_text, log_miss},
};

const BASE_URL: &str = "https://devapi.qweather.com/v7";

#[derive(Debug, Clone)]
pub struct QWeatherProvider {
    api_key: String,
    http: Client,
    base_url: String,
}

impl QWeatherProvider {
    pub fn new(http: Client, api_key: String) -> Self {
        Self { api_key, http, base_url: BASE_URL.to_string() }
    }

    pub fn with_base_url_opt(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    async fn fetch(&self, coordinates: Coordinates, label: &str) -> Result<WeatherReport, ProviderError> {
        let url = format!("{}/weather/now", self.base_url);
        // QWeather wants longitude first.
        let location = format!("{:.2},{:.2}", coordinates.longitude, coordinates.latitude);
        let request =
            self.http.get(url).query(&[("location", location.as_str()), ("key", self.api_key.as_str())]);

        let body = fetch_text(request).await?;
        parse_now(&body, label)
    }
}

#[derive(Debug, Deserialize)]
struct QwResponse {
    code: String,
    now: Option<QwNow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QwNow {
    temp: String,
    text: String,
    #[serde(default)]
    wind_dir: String,
    #[serde(default)]
    wind_scale: String,
    #[serde(default)]
    humidity: String,
}

#[async_trait]
impl WeatherProvider for QWeatherProvider {
    fn id(&self) -> ProviderId {
        ProviderId::QWeather
    }

    async fn query(&self, query: &ProviderQuery) -> Option<WeatherReport> {
        let ProviderQuery::Coordinates { coordinates, label } = query else {
            return None;
        };

        log_miss(self.id(), label, self.fetch(*coordinates, label).await)
    }
}

pub fn parse_now(body: &str, label: &str) -> Result<WeatherReport, ProviderError> {
    let parsed: QwResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("QWeather JSON: {e}")))?;

    if parsed.code != "200" {
        return Err(ProviderError::Malformed(format!("QWeather code {}", parsed.code)));
    }
    let now = parsed.now.ok_or_else(|| ProviderError::NotFound(label.to_string()))?;
    let temperature = now
        .temp
        .trim()
        .parse::<f64>()
        .map_err(|_| ProviderError::Malformed(format!("unusable temp '{}'", now.temp)))?;

    let wind_scale = match now.wind_scale.trim() {
        "" => String::new(),
        scale => format!("{scale}级"),
    };
    let humidity = match now.humidity.trim() {
        "" => String::new(),
        h => format!("{h}%"),
    };

    Ok(WeatherReport::new(ProviderId::QWeather, label, now.text, temperature)
        .with_extra("风向", now.wind_dir)
        .with_extra("风力", wind_scale)
        .with_extra("湿度", humidity))
}
