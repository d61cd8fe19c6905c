use crate::{
    Config,
    error::{ProviderError, truncate_body},
    model::{Coordinates, WeatherReport},
    provider::{
        amap::AMapWeatherProvider, open_meteo::OpenMeteoProvider, qweather::QWeatherProvider,
        weather_com_cn::WeatherComCnProvider, wttr::WttrProvider,
    },
};
use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::{Deserialize, Serialize};
use std::{convert::TryFrom, fmt::Debug, time::Duration};

pub mod amap;
pub mod open_meteo;
pub mod qweather;
pub mod weather_com_cn;
pub mod wttr;

pub(crate) const USER_AGENT: &str = concat!("cnweather/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    WeatherComCn,
    AMap,
    Wttr,
    QWeather,
    OpenMeteo,
}

/// The kind of identifier a provider understands. Tiers select providers by kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    CityCode,
    Text,
    Coordinates,
}

impl ProviderId {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::WeatherComCn => "weathercomcn",
            ProviderId::AMap => "amap",
            ProviderId::Wttr => "wttr",
            ProviderId::QWeather => "qweather",
            ProviderId::OpenMeteo => "openmeteo",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::WeatherComCn => "中国天气网",
            ProviderId::AMap => "高德天气",
            ProviderId::Wttr => "wttr.in",
            ProviderId::QWeather => "和风天气",
            ProviderId::OpenMeteo => "Open-Meteo",
        }
    }

    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderId::WeatherComCn => ProviderKind::CityCode,
            ProviderId::AMap | ProviderId::Wttr => ProviderKind::Text,
            ProviderId::QWeather | ProviderId::OpenMeteo => ProviderKind::Coordinates,
        }
    }

    /// Environment variable holding the key, for providers that need one.
    pub fn api_key_env(&self) -> Option<&'static str> {
        match self {
            ProviderId::AMap => Some("AMAP_API_KEY"),
            ProviderId::QWeather => Some("QWEATHER_API_KEY"),
            _ => None,
        }
    }

    pub fn requires_api_key(&self) -> bool {
        self.api_key_env().is_some()
    }

    /// Priority order: keyed providers ahead of free ones of the same kind.
    pub const fn all() -> &'static [ProviderId] {
        &[
            ProviderId::WeatherComCn,
            ProviderId::AMap,
            ProviderId::Wttr,
            ProviderId::QWeather,
            ProviderId::OpenMeteo,
        ]
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ProviderId {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let lower = value.to_lowercase();

        ProviderId::all().iter().copied().find(|id| id.as_str() == lower).ok_or_else(|| {
            anyhow::anyhow!(
                "Unknown provider '{value}'. Supported providers: weathercomcn, amap, wttr, qweather, openmeteo."
            )
        })
    }
}

/// Identifier handed to a provider.
#[derive(Debug, Clone, PartialEq)]
pub enum ProviderQuery {
    /// weather.com.cn code plus the place name it was resolved from.
    CityCode { code: String, label: String },
    Text(String),
    Coordinates { coordinates: Coordinates, label: String },
}

impl ProviderQuery {
    pub fn kind(&self) -> ProviderKind {
        match self {
            ProviderQuery::CityCode { .. } => ProviderKind::CityCode,
            ProviderQuery::Text(_) => ProviderKind::Text,
            ProviderQuery::Coordinates { .. } => ProviderKind::Coordinates,
        }
    }
}

/// One weather backend.
///
/// `query` never fails: transport errors, bad statuses and unusable payloads
/// are logged by the adapter and reported as `None`.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    fn id(&self) -> ProviderId;

    fn kind(&self) -> ProviderKind {
        self.id().kind()
    }

    async fn query(&self, query: &ProviderQuery) -> Option<WeatherReport>;
}

/// Shared HTTP client with the per-call timeout.
pub fn http_client(timeout: Duration) -> anyhow::Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build HTTP client: {e}"))
}

/// Send a request and return the body of a successful response.
pub(crate) async fn fetch_text(request: RequestBuilder) -> Result<String, ProviderError> {
    let res = request.send().await?;
    let status = res.status();
    let body = res.text().await?;

    if !status.is_success() {
        return Err(ProviderError::Status { status, body: truncate_body(&body) });
    }

    Ok(body)
}

/// Log an adapter failure and turn it into a miss.
pub(crate) fn log_miss<T>(id: ProviderId, what: &str, result: Result<T, ProviderError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(err) => {
            tracing::warn!(provider = %id, "{} query for {} failed: {}", id.display_name(), what, err);
            None
        }
    }
}

/// Construct a provider from config and explicit ProviderId.
pub fn provider_from_config(
    id: ProviderId,
    config: &Config,
    http: Client,
) -> anyhow::Result<Box<dyn WeatherProvider>> {
    let api_key = match id.requires_api_key() {
        true => Some(config.provider_api_key(id).ok_or_else(|| {
            anyhow::anyhow!(
                "No API key configured for provider '{id}'.\n\
                 Hint: export {} or set [providers.{id}] api_key in {}.",
                id.api_key_env().unwrap_or_default(),
                crate::config::Config::config_file_path()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|_| "config.toml".to_string()),
            )
        })?),
        false => None,
    };
    let base_url = config.provider_base_url(id).map(str::to_owned);

    let boxed: Box<dyn WeatherProvider> = match id {
        ProviderId::WeatherComCn => {
            let mut provider = WeatherComCnProvider::new(http);
            if let Some(url) = base_url {
                provider = provider.with_base_urls(url.clone(), url);
            }
            Box::new(provider)
        }
        ProviderId::Wttr => Box::new(WttrProvider::new(http).with_base_url_opt(base_url)),
        ProviderId::OpenMeteo => Box::new(OpenMeteoProvider::new(http).with_base_url_opt(base_url)),
        ProviderId::AMap => Box::new(
            AMapWeatherProvider::new(http, api_key.unwrap_or_default()).with_base_url_opt(base_url),
        ),
        ProviderId::QWeather => Box::new(
            QWeatherProvider::new(http, api_key.unwrap_or_default()).with_base_url_opt(base_url),
        ),
    };

    Ok(boxed)
}

/// Every enabled provider in priority order. Keyed providers without a key are skipped.
pub fn providers_from_config(
    config: &Config,
    http: &Client,
) -> anyhow::Result<Vec<Box<dyn WeatherProvider>>> {
    let mut providers = Vec::new();

    for &id in ProviderId::all() {
        if config.is_provider_disabled(id) {
            tracing::info!(provider = %id, "Provider disabled in config");
            continue;
        }
        if id.requires_api_key() && config.provider_api_key(id).is_none() {
            tracing::debug!(provider = %id, "No API key, skipping provider");
            continue;
        }
        providers.push(provider_from_config(id, config, http.clone())?);
    }

    Ok(providers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Config, ProviderConfig};

    fn client() -> Client {
        http_client(Duration::from_secs(1)).unwrap()
    }

    #[test]
    fn provider_id_as_str_roundtrip() {
        for id in ProviderId::all() {
            let parsed = ProviderId::try_from(id.as_str()).expect("roundtrip should succeed");
            assert_eq!(*id, parsed);
        }
        assert_eq!(ProviderId::try_from("WTTR").unwrap(), ProviderId::Wttr);
    }

    #[test]
    fn unknown_provider_error() {
        let err = ProviderId::try_from("doesnotexist").unwrap_err();
        assert!(err.to_string().contains("Unknown provider"));
    }

    #[test]
    fn kinds_match_identifiers() {
        assert_eq!(ProviderId::WeatherComCn.kind(), ProviderKind::CityCode);
        assert_eq!(ProviderId::AMap.kind(), ProviderKind::Text);
        assert_eq!(ProviderId::OpenMeteo.kind(), ProviderKind::Coordinates);
        assert_eq!(ProviderQuery::Text("北京".into()).kind(), ProviderKind::Text);
    }

    #[test]
    fn provider_from_config_errors_when_missing_api_key() {
        let cfg = Config::default();
        let err = provider_from_config(ProviderId::QWeather, &cfg, client()).unwrap_err();
        assert!(err.to_string().contains("No API key configured for provider"));
    }

    #[test]
    fn keyless_providers_always_build() {
        let cfg = Config::default();
        let provider = provider_from_config(ProviderId::Wttr, &cfg, client()).unwrap();
        assert_eq!(provider.id(), ProviderId::Wttr);
    }

    #[test]
    fn providers_from_config_respects_disabled_and_order() {
        let mut cfg = Config::default();
        cfg.providers.insert(
            "wttr".to_string(),
            ProviderConfig { disabled: true, ..Default::default() },
        );
        cfg.providers.insert(
            "amap".to_string(),
            ProviderConfig { api_key: Some("KEY".into()), ..Default::default() },
        );

        let ids: Vec<_> =
            providers_from_config(&cfg, &client()).unwrap().iter().map(|p| p.id()).collect();

        assert!(!ids.contains(&ProviderId::Wttr));
        let amap = ids.iter().position(|id| *id == ProviderId::AMap).unwrap();
        let domestic = ids.iter().position(|id| *id == ProviderId::WeatherComCn).unwrap();
        assert!(domestic < amap);
        assert!(ids.contains(&ProviderId::OpenMeteo));
    }
}
