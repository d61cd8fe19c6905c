use std::sync::OnceLock;

use async_trait::async_trait;
use regex::Regex;
use reqwest::{Client, Url};

use crate::{
    error::ProviderError,
    model::WeatherReport,
    phrases::translate_condition,
    provider::{ProviderId, ProviderQuery, WeatherProvider, fetch_text, log_miss},
};

const BASE_URL: &str = "https://wttr.in";
const FORMAT: &str = "%l|%C|%t|%h|%w";

/// Free-text lookups against wttr.in.
#[derive(Debug, Clone)]
pub struct WttrProvider {
    http: Client,
    base_url: String,
}

impl WttrProvider {
    pub fn new(http: Client) -> Self {
        Self { http, base_url: BASE_URL.to_string() }
    }

    pub fn with_base_url_opt(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url;
        }
        self
    }

    async fn fetch(&self, location: &str) -> Result<WeatherReport, ProviderError> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| ProviderError::Malformed(format!("bad base url: {e}")))?;
        url.path_segments_mut()
            .map_err(|_| ProviderError::Malformed("base url cannot carry a path".to_string()))?
            .pop_if_empty()
            .push(location);

        let body = fetch_text(self.http.get(url).query(&[("format", FORMAT)])).await?;
        parse_line(&body, location)
    }
}

#[async_trait]
impl WeatherProvider for WttrProvider {
    fn id(&self) -> ProviderId {
        ProviderId::Wttr
    }

    async fn query(&self, query: &ProviderQuery) -> Option<WeatherReport> {
        let ProviderQuery::Text(location) = query else {
            return None;
        };

        log_miss(self.id(), location, self.fetch(location).await)
    }
}

/// Parse `place|condition|+12°C|65%|↗11km/h`, or a looser `place: ⛅️ +12°C` line.
pub fn parse_line(body: &str, location: &str) -> Result<WeatherReport, ProviderError> {
    let line = body.lines().map(str::trim).find(|l| !l.is_empty()).unwrap_or("");
    if line.is_empty() || line.starts_with("Unknown location") || line.starts_with('<') {
        return Err(ProviderError::NotFound(location.to_string()));
    }

    let fields: Vec<&str> = line.split('|').map(str::trim).collect();
    if let [place, condition, temp, humidity, wind] = fields.as_slice()
        && let Some(temperature) = parse_celsius(temp)
    {
        let place = if place.is_empty() { location } else { *place };
        return Ok(WeatherReport::new(
            ProviderId::Wttr,
            place,
            translate_condition(condition),
            temperature,
        )
        .with_extra("湿度", *humidity)
        .with_extra("风", *wind));
    }

    loose_line(line, location)
}

fn loose_line(line: &str, location: &str) -> Result<WeatherReport, ProviderError> {
    let temperature = parse_celsius(line)
        .ok_or_else(|| ProviderError::Malformed(format!("no temperature in '{line}'")))?;

    let (place, rest) = match line.split_once(':') {
        Some((place, rest)) if !place.trim().is_empty() => (place.trim(), rest),
        _ => (location, line),
    };

    let description: String = rest
        .split_whitespace()
        .filter(|word| !word.contains("°C") && word.chars().any(char::is_alphabetic))
        .collect::<Vec<_>>()
        .join(" ");
    let description = match description.is_empty() {
        true => "天气".to_string(),
        false => translate_condition(&description),
    };

    Ok(WeatherReport::new(ProviderId::Wttr, place, description, temperature))
}

fn parse_celsius(text: &str) -> Option<f64> {
    static TEMP: OnceLock<Option<Regex>> = OnceLock::new();
    let re = TEMP.get_or_init(|| Regex::new(r"([+-]?\d+(?:\.\d+)?)\s*°C").ok()).as_ref()?;

    re.captures(text).and_then(|caps| caps[1].parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_pipe_format() {
        let report = parse_line("London|Light rain|+12°C|81%|↗11km/h\n", "London").unwrap();

        assert_eq!(report.place_label, "London");
        assert_eq!(report.description, "小雨");
        assert_eq!(report.temperature_celsius, 12.0);
        assert_eq!(report.extra.get("湿度").map(String::as_str), Some("81%"));
    }

    #[test]
    fn negative_temperature() {
        let report = parse_line("Oslo|Snow|-4°C|90%|←5km/h", "Oslo").unwrap();
        assert_eq!(report.temperature_celsius, -4.0);
        assert_eq!(report.description, "雪");
    }

    #[test]
    fn loose_format_three_line() {
        let report = parse_line("Paris: ⛅️  Partly cloudy +17°C", "Paris").unwrap();
        assert_eq!(report.place_label, "Paris");
        assert_eq!(report.description, "多云");
        assert_eq!(report.temperature_celsius, 17.0);
    }

    #[test]
    fn unknown_location_is_not_found() {
        assert!(matches!(
            parse_line("Unknown location; please try ~48.85,2.35", "Nowhere"),
            Err(ProviderError::NotFound(_))
        ));
        assert!(matches!(parse_line("", "x"), Err(ProviderError::NotFound(_))));
        assert!(matches!(parse_line("no numbers here", "x"), Err(ProviderError::Malformed(_))));
    }
}
