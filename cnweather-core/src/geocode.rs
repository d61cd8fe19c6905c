//! Place text to coordinates, for the coordinate-keyed providers.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::fmt::Debug;

use crate::{
    Config,
    error::ProviderError,
    model::Coordinates,
    provider::{ProviderId, amap::AMAP_BASE_URL, fetch_text},
};

const NOMINATIM_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Config section for the Nominatim geocoder, which is not itself a weather provider.
pub const NOMINATIM_CONFIG_KEY: &str = "nominatim";

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    fn name(&self) -> &'static str;

    /// `None` when the place is unknown or the service failed.
    async fn geocode(&self, place: &str) -> Option<Coordinates>;
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(http: Client) -> Self {
        Self { http, base_url: NOMINATIM_BASE_URL.to_string() }
    }

    pub fn with_base_url_opt(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    async fn search(&self, place: &str) -> Result<Coordinates, ProviderError> {
        let url = format!("{}/search", self.base_url);
        let request =
            self.http.get(url).query(&[("q", place), ("format", "json"), ("limit", "1")]);

        let body = fetch_text(request).await?;
        parse_nominatim(&body, place)
    }
}

#[derive(Debug, Deserialize)]
struct NominatimPlace {
    lat: String,
    lon: String,
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    fn name(&self) -> &'static str {
        "nominatim"
    }

    async fn geocode(&self, place: &str) -> Option<Coordinates> {
        match self.search(place).await {
            Ok(coordinates) => Some(coordinates),
            Err(err) => {
                tracing::warn!(geocoder = self.name(), "Geocoding {} failed: {}", place, err);
                None
            }
        }
    }
}

fn parse_nominatim(body: &str, place: &str) -> Result<Coordinates, ProviderError> {
    let places: Vec<NominatimPlace> = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("Nominatim JSON: {e}")))?;
    let first = places.into_iter().next().ok_or_else(|| ProviderError::NotFound(place.to_string()))?;

    coordinates_from_strs(&first.lat, &first.lon)
}

#[derive(Debug, Clone)]
pub struct AMapGeocoder {
    api_key: String,
    http: Client,
    base_url: String,
}

impl AMapGeocoder {
    pub fn new(http: Client, api_key: String) -> Self {
        Self { api_key, http, base_url: AMAP_BASE_URL.to_string() }
    }

    pub fn with_base_url_opt(mut self, base_url: Option<String>) -> Self {
        if let Some(url) = base_url {
            self.base_url = url.trim_end_matches('/').to_string();
        }
        self
    }

    async fn search(&self, place: &str) -> Result<Coordinates, ProviderError> {
        let url = format!("{}/geocode/geo", self.base_url);
        let request =
            self.http.get(url).query(&[("address", place), ("key", self.api_key.as_str())]);

        let body = fetch_text(request).await?;
        parse_amap(&body, place)
    }
}

#[derive(Debug, Deserialize)]
struct AMapGeocodeResponse {
    status: String,
    #[serde(default)]
    geocodes: Vec<AMapGeocode>,
}

#[derive(Debug, Deserialize)]
struct AMapGeocode {
    #[serde(default)]
    location: String,
}

#[async_trait]
impl Geocoder for AMapGeocoder {
    fn name(&self) -> &'static str {
        "amap"
    }

    async fn geocode(&self, place: &str) -> Option<Coordinates> {
        match self.search(place).await {
            Ok(coordinates) => Some(coordinates),
            Err(err) => {
                tracing::warn!(geocoder = self.name(), "Geocoding {} failed: {}", place, err);
                None
            }
        }
    }
}

fn parse_amap(body: &str, place: &str) -> Result<Coordinates, ProviderError> {
    let parsed: AMapGeocodeResponse = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("AMap geocode JSON: {e}")))?;

    if parsed.status != "1" {
        return Err(ProviderError::Malformed(format!("AMap geocode status {}", parsed.status)));
    }

    // "lon,lat"
    let location = parsed
        .geocodes
        .into_iter()
        .map(|g| g.location)
        .find(|l| !l.trim().is_empty())
        .ok_or_else(|| ProviderError::NotFound(place.to_string()))?;
    let (lon, lat) = location
        .split_once(',')
        .ok_or_else(|| ProviderError::Malformed(format!("bad location '{location}'")))?;

    coordinates_from_strs(lat, lon)
}

fn coordinates_from_strs(lat: &str, lon: &str) -> Result<Coordinates, ProviderError> {
    let parse = |s: &str| s.trim().parse::<f64>().ok();

    parse(lat)
        .zip(parse(lon))
        .and_then(|(lat, lon)| Coordinates::new(lat, lon))
        .ok_or_else(|| ProviderError::Malformed(format!("bad coordinates '{lat}', '{lon}'")))
}

/// Geocoders in the order they are tried: AMap when keyed, then Nominatim.
pub fn geocoders_from_config(config: &Config, http: &Client) -> Vec<Box<dyn Geocoder>> {
    let mut geocoders: Vec<Box<dyn Geocoder>> = Vec::new();

    if !config.is_provider_disabled(ProviderId::AMap)
        && let Some(key) = config.provider_api_key(ProviderId::AMap)
    {
        let base_url = config.provider_base_url(ProviderId::AMap).map(str::to_owned);
        geocoders.push(Box::new(AMapGeocoder::new(http.clone(), key).with_base_url_opt(base_url)));
    }

    let nominatim = config.providers.get(NOMINATIM_CONFIG_KEY);
    if !nominatim.is_some_and(|cfg| cfg.disabled) {
        let base_url = nominatim.and_then(|cfg| cfg.base_url.clone());
        geocoders.push(Box::new(NominatimGeocoder::new(http.clone()).with_base_url_opt(base_url)));
    }

    geocoders
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;

    #[test]
    fn nominatim_first_hit() {
        let body = r#"[{"place_id":1,"lat":"51.5073","lon":"-0.1276","display_name":"London"}]"#;
        let c = parse_nominatim(body, "London").unwrap();
        assert_eq!(c.to_string(), "51.5073,-0.1276");

        assert!(matches!(parse_nominatim("[]", "x"), Err(ProviderError::NotFound(_))));
    }

    #[test]
    fn amap_location_is_lon_lat() {
        let body = r#"{"status":"1","geocodes":[{"location":"120.755486,30.746129"}]}"#;
        let c = parse_amap(body, "嘉兴").unwrap();
        assert_eq!(c.latitude, 30.746129);
        assert_eq!(c.longitude, 120.755486);
    }

    #[test]
    fn out_of_range_coordinates_rejected() {
        assert!(coordinates_from_strs("95.0", "10.0").is_err());
        assert!(coordinates_from_strs("abc", "10.0").is_err());
    }

    #[test]
    fn nominatim_always_present_unless_disabled() {
        let client = Client::new();
        let cfg = Config::default();
        let names: Vec<_> = geocoders_from_config(&cfg, &client).iter().map(|g| g.name()).collect();
        assert!(names.contains(&"nominatim"));

        let mut cfg = Config::default();
        cfg.providers.insert(
            NOMINATIM_CONFIG_KEY.to_string(),
            ProviderConfig { disabled: true, ..Default::default() },
        );
        cfg.providers.insert(
            "amap".to_string(),
            ProviderConfig { api_key: Some("KEY".into()), ..Default::default() },
        );
        let names: Vec<_> = geocoders_from_config(&cfg, &client).iter().map(|g| g.name()).collect();
        assert_eq!(names, vec!["amap"]);
    }
}
