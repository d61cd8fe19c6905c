use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::Client;
use serde_json::Value;

use crate::{
    error::ProviderError,
    model::WeatherReport,
    provider::{ProviderId, ProviderQuery, WeatherProvider, fetch_text, log_miss},
};

const PRIMARY_BASE_URL: &str = "http://d1.weather.com.cn";
const LEGACY_BASE_URL: &str = "http://www.weather.com.cn";
const REFERER: &str = "http://www.weather.com.cn/";
const BROWSER_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0 Safari/537.36";

/// Current conditions from weather.com.cn, keyed by 9-digit city code.
#[derive(Debug, Clone)]
pub struct WeatherComCnProvider {
    http: Client,
    primary_base: String,
    legacy_base: String,
}

impl WeatherComCnProvider {
    pub fn new(http: Client) -> Self {
        Self {
            http,
            primary_base: PRIMARY_BASE_URL.to_string(),
            legacy_base: LEGACY_BASE_URL.to_string(),
        }
    }

    pub fn with_base_urls(mut self, primary: impl Into<String>, legacy: impl Into<String>) -> Self {
        self.primary_base = primary.into().trim_end_matches('/').to_string();
        self.legacy_base = legacy.into().trim_end_matches('/').to_string();
        self
    }

    async fn fetch(&self, url: String, label: &str) -> Result<WeatherReport, ProviderError> {
        let request = self
            .http
            .get(url)
            .header(reqwest::header::REFERER, REFERER)
            .header(reqwest::header::USER_AGENT, BROWSER_UA);

        let body = fetch_text(request).await?;
        parse_payload(&body, label)
    }
}

#[async_trait]
impl WeatherProvider for WeatherComCnProvider {
    fn id(&self) -> ProviderId {
        ProviderId::WeatherComCn
    }

    async fn query(&self, query: &ProviderQuery) -> Option<WeatherReport> {
        let ProviderQuery::CityCode { code, label } = query else {
            return None;
        };

        let primary = format!("{}/sk_2d/{code}.html", self.primary_base);
        match self.fetch(primary, label).await {
            Ok(report) => return Some(report),
            Err(err) => {
                tracing::debug!(code = %code, error = %err, "Primary endpoint failed, trying legacy endpoint");
            }
        }

        let legacy = format!("{}/data/sk/{code}.html", self.legacy_base);
        log_miss(self.id(), code, self.fetch(legacy, label).await)
    }
}

/// Parse the payload shapes the service has used: `var dataSK = {...}`,
/// `{"weatherinfo": {...}}` and `{"data": {"real": {...}}}`.
///
/// When the embedded object is not valid JSON, or is JSON without the expected
/// fields, the temperature, condition and city are pulled out with patterns instead.
pub fn parse_payload(body: &str, label: &str) -> Result<WeatherReport, ProviderError> {
    let object = match (body.find('{'), body.rfind('}')) {
        (Some(start), Some(end)) if start < end => &body[start..=end],
        _ => return Err(ProviderError::Malformed("no JSON object in payload".to_string())),
    };

    match serde_json::from_str::<Value>(object) {
        Ok(value) => {
            let info = value
                .get("weatherinfo")
                .or_else(|| value.pointer("/data/real"))
                .or_else(|| value.get("real"))
                .unwrap_or(&value);
            report_from_fields(info, label).or_else(|err| {
                tracing::debug!(error = %err, "Unexpected payload shape, trying patterns");
                loose_parse(body, label)
            })
        }
        Err(_) => loose_parse(body, label),
    }
}

fn is_place_name(name: &str) -> bool {
    !name.is_empty() && !name.chars().all(|c| c.is_ascii_digit())
}

fn report_from_fields(info: &Value, label: &str) -> Result<WeatherReport, ProviderError> {
    let field = |key: &str| info.get(key).and_then(Value::as_str).map(str::trim).unwrap_or("");

    let temperature = parse_temperature(field("temp"))
        .ok_or_else(|| ProviderError::Malformed(format!("unusable temp '{}'", field("temp"))))?;

    let place = [field("cityname"), field("city")]
        .into_iter()
        .find(|name| is_place_name(name))
        .unwrap_or(label);

    let description = match field("weather") {
        "" => "天气",
        other => other,
    };

    let humidity = match field("SD") {
        "" => field("sd"),
        sd => sd,
    };

    Ok(WeatherReport::new(ProviderId::WeatherComCn, place, description, temperature)
        .with_extra("风向", field("WD"))
        .with_extra("风力", field("WS"))
        .with_extra("湿度", humidity)
        .with_extra("更新时间", field("time")))
}

fn loose_parse(body: &str, label: &str) -> Result<WeatherReport, ProviderError> {
    static TEMP: OnceLock<Option<Regex>> = OnceLock::new();
    static WEATHER: OnceLock<Option<Regex>> = OnceLock::new();
    static CITY: OnceLock<Option<Regex>> = OnceLock::new();

    let temp_re = TEMP.get_or_init(|| Regex::new(r#""temp"\s*:\s*"([^"]*)""#).ok());
    let weather_re = WEATHER.get_or_init(|| Regex::new(r#""weather"\s*:\s*"([^"]*)""#).ok());
    let city_re = CITY.get_or_init(|| Regex::new(r#""city(?:name)?"\s*:\s*"([^"]*)""#).ok());

    let temperature = temp_re
        .as_ref()
        .and_then(|re| re.captures(body))
        .and_then(|caps| parse_temperature(&caps[1]))
        .ok_or_else(|| ProviderError::Malformed("no temperature in payload".to_string()))?;

    let description = weather_re
        .as_ref()
        .and_then(|re| re.captures(body))
        .map(|caps| caps[1].trim().to_string())
        .filter(|w| !w.is_empty())
        .unwrap_or_else(|| "天气".to_string());

    // "city" holds the numeric code in some payloads.
    let place = city_re
        .as_ref()
        .and_then(|re| {
            re.captures_iter(body)
                .filter_map(|caps| caps.get(1).map(|m| m.as_str().trim()))
                .find(|name| is_place_name(name))
        })
        .unwrap_or(label);

    Ok(WeatherReport::new(ProviderId::WeatherComCn, place, description, temperature))
}

fn parse_temperature(raw: &str) -> Option<f64> {
    raw.trim().trim_end_matches("℃").trim_end_matches("°C").parse::<f64>().ok()
}
