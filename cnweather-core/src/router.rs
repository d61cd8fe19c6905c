//! Tiered fallback: turns one free-text location into one weather report.

use std::{collections::HashSet, fmt};

use crate::{
    data::ReferenceData,
    geo::GeoCompleter,
    geocode::Geocoder,
    model::{
        AdministrativeUnit, ResolvedLocation, RouteOutcome, RoutedReport, SubstitutionReason,
        WeatherReport,
    },
    normalize::normalize,
    provider::{ProviderKind, ProviderQuery, WeatherProvider},
    region::is_domestic,
    resolver::CodeResolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    CityCode,
    Text,
    ProvinceCapital,
    NearbyCity,
    Coordinates,
    ProvinceAnywhere,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Tier::CityCode => "city-code",
            Tier::Text => "text",
            Tier::ProvinceCapital => "province-capital",
            Tier::NearbyCity => "nearby-city",
            Tier::Coordinates => "coordinates",
            Tier::ProvinceAnywhere => "province-anywhere",
        };
        f.write_str(name)
    }
}

pub const DOMESTIC_TIERS: &[Tier] = &[
    Tier::CityCode,
    Tier::Text,
    Tier::ProvinceCapital,
    Tier::NearbyCity,
    Tier::Coordinates,
    Tier::ProvinceAnywhere,
];

pub const FOREIGN_TIERS: &[Tier] = &[Tier::Text, Tier::Coordinates];

#[derive(Debug)]
pub struct FallbackRouter {
    data: ReferenceData,
    providers: Vec<Box<dyn WeatherProvider>>,
    geocoders: Vec<Box<dyn Geocoder>>,
}

impl FallbackRouter {
    pub fn new(data: ReferenceData) -> Self {
        Self { data, providers: Vec::new(), geocoders: Vec::new() }
    }

    /// Providers are consulted in the order they were added.
    pub fn with_providers(mut self, providers: Vec<Box<dyn WeatherProvider>>) -> Self {
        self.providers.extend(providers);
        self
    }

    pub fn with_provider(mut self, provider: Box<dyn WeatherProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    pub fn with_geocoders(mut self, geocoders: Vec<Box<dyn Geocoder>>) -> Self {
        self.geocoders.extend(geocoders);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Box<dyn Geocoder>) -> Self {
        self.geocoders.push(geocoder);
        self
    }

    pub fn data(&self) -> &ReferenceData {
        &self.data
    }

    /// Walk the tiers until one yields a report. Never fails.
    pub async fn route(&self, raw: &str) -> RouteOutcome {
        let raw = raw.trim();
        let normalized = normalize(raw);
        if normalized.is_empty() {
            return RouteOutcome::Exhausted(foreign_failure(raw));
        }

        let domestic = is_domestic(raw, &self.data);
        let (tiers, unit) = match domestic {
            true => (DOMESTIC_TIERS, GeoCompleter::new(&self.data).complete(&normalized)),
            false => (FOREIGN_TIERS, AdministrativeUnit::new("", raw, raw)),
        };
        tracing::info!(input = raw, normalized = %normalized, domestic, "Routing location");

        let mut run = Run {
            router: self,
            raw,
            query_text: if domestic { normalized.clone() } else { raw.to_string() },
            normalized,
            unit,
            attempts: Attempts::default(),
        };

        for &tier in tiers {
            tracing::info!(%tier, "Trying tier");
            if let Some(routed) = run.attempt(tier).await {
                tracing::info!(%tier, provider = %routed.report.provider, "Resolved");
                return RouteOutcome::Resolved(routed);
            }
        }

        tracing::info!(input = raw, "All tiers exhausted");
        let message = match domestic {
            true => domestic_failure(raw),
            false => foreign_failure(raw),
        };
        RouteOutcome::Exhausted(message)
    }

    fn providers_of(&self, kind: ProviderKind) -> impl Iterator<Item = &Box<dyn WeatherProvider>> {
        self.providers.iter().filter(move |p| p.kind() == kind)
    }

    async fn first_answer(&self, query: &ProviderQuery) -> Option<WeatherReport> {
        for provider in self.providers_of(query.kind()) {
            tracing::debug!(provider = %provider.id(), ?query, "Querying provider");
            if let Some(report) = provider.query(query).await {
                return Some(report);
            }
        }
        None
    }
}

fn domestic_failure(raw: &str) -> String {
    format!("无法获取 {raw} 的天气信息，建议尝试查询省会城市或邻近城市")
}

fn foreign_failure(raw: &str) -> String {
    format!("无法获取 {raw} 的天气信息")
}

/// Identifiers already sent during one `route` call.
#[derive(Debug, Default)]
struct Attempts {
    codes: HashSet<String>,
    texts: HashSet<String>,
    places: HashSet<String>,
}

/// State of a single `route` call.
struct Run<'r> {
    router: &'r FallbackRouter,
    raw: &'r str,
    normalized: String,
    query_text: String,
    unit: AdministrativeUnit,
    attempts: Attempts,
}

impl<'r> Run<'r> {
    async fn attempt(&mut self, tier: Tier) -> Option<RoutedReport> {
        match tier {
            Tier::CityCode => self.city_code().await,
            Tier::Text => {
                let text = self.query_text.clone();
                let report = self.try_text(&text).await?;
                Some(self.direct(report))
            }
            Tier::ProvinceCapital => self.province_capital().await,
            Tier::NearbyCity => self.nearby_city().await,
            Tier::Coordinates => {
                let place = self.query_text.clone();
                let report = self.try_coordinates(&place).await?;
                Some(self.direct(report))
            }
            Tier::ProvinceAnywhere => self.province_anywhere().await,
        }
    }

    async fn city_code(&mut self) -> Option<RoutedReport> {
        let mut candidates: Vec<String> = Vec::with_capacity(3);
        let district = self.unit.has_district().then_some(&self.unit.district);
        for name in district.into_iter().chain([&self.unit.city, &self.normalized]) {
            if !name.is_empty() && !candidates.contains(name) {
                candidates.push(name.clone());
            }
        }

        for name in candidates {
            if let Some(report) = self.try_name(&name).await {
                return Some(self.direct(report));
            }
        }
        None
    }

    async fn province_capital(&mut self) -> Option<RoutedReport> {
        let router = self.router;
        let province = router.data.province_prefix_of(&self.normalized)?;
        let capital = province.capital.as_str();
        if capital.is_empty() || capital == self.normalized {
            tracing::debug!(province = %province.name, "Capital is the input itself; skipping");
            return None;
        }

        let report = match self.try_name(capital).await {
            Some(report) => report,
            None => self.try_text(capital).await?,
        };

        let note = format!("{} 天气暂无，显示{}省会 {}", self.raw, province.name, capital);
        Some(self.substituted(
            AdministrativeUnit::city_level(province.name.as_str(), capital),
            SubstitutionReason::ProvinceCapital,
            note,
            report,
        ))
    }

    async fn nearby_city(&mut self) -> Option<RoutedReport> {
        let router = self.router;
        let normalized = self.normalized.as_str();
        let nearby = router.data.cities().iter().find(|entry| {
            !entry.name.is_empty()
                && entry.name != normalized
                && (normalized.contains(&entry.name) || entry.name.contains(normalized))
                && !self.attempts.codes.contains(&entry.code)
        })?;
        tracing::debug!(nearby = %nearby.name, code = %nearby.code, "Nearby dictionary city");

        let report = self.try_code(&nearby.code, &nearby.name).await?;

        let note = format!("{} 天气暂无，显示相近城市 {}", self.raw, nearby.name);
        let province = CodeResolver::new(&router.data)
            .province_of_code(&nearby.code)
            .map(|p| p.name.as_str())
            .unwrap_or_default();
        let unit = AdministrativeUnit::city_level(province, nearby.name.as_str());
        Some(self.substituted(unit, SubstitutionReason::NearbyCity, note, report))
    }

    async fn province_anywhere(&mut self) -> Option<RoutedReport> {
        let router = self.router;
        let province = router.data.province_within(&self.normalized)?;
        let capital = province.capital.as_str();
        if capital.is_empty() || capital == self.normalized {
            return None;
        }

        let report = self.try_text(capital).await?;

        let note = format!("{} 天气暂无，显示{} {}", self.raw, province.name, capital);
        Some(self.substituted(
            AdministrativeUnit::city_level(province.name.as_str(), capital),
            SubstitutionReason::ProvinceCapital,
            note,
            report,
        ))
    }

    /// Resolve `name` to a code and query the code-keyed providers.
    async fn try_name(&mut self, name: &str) -> Option<WeatherReport> {
        let router = self.router;
        let code = CodeResolver::new(&router.data).resolve_code(name)?;
        self.try_code(code, name).await
    }

    async fn try_code(&mut self, code: &str, label: &str) -> Option<WeatherReport> {
        if !self.attempts.codes.insert(code.to_string()) {
            tracing::debug!(code, "Code already tried");
            return None;
        }

        let query = ProviderQuery::CityCode { code: code.to_string(), label: label.to_string() };
        self.router.first_answer(&query).await
    }

    async fn try_text(&mut self, text: &str) -> Option<WeatherReport> {
        if text.is_empty() || !self.attempts.texts.insert(text.to_string()) {
            tracing::debug!(text, "Text already tried");
            return None;
        }

        self.router.first_answer(&ProviderQuery::Text(text.to_string())).await
    }

    async fn try_coordinates(&mut self, place: &str) -> Option<WeatherReport> {
        let router = self.router;
        if router.providers_of(ProviderKind::Coordinates).next().is_none() {
            tracing::debug!("No coordinate providers registered");
            return None;
        }
        if place.is_empty() || !self.attempts.places.insert(place.to_string()) {
            return None;
        }

        let mut coordinates = None;
        for geocoder in &router.geocoders {
            if let Some(found) = geocoder.geocode(place).await {
                tracing::debug!(geocoder = geocoder.name(), %found, "Geocoded");
                coordinates = Some(found);
                break;
            }
        }

        let query = ProviderQuery::Coordinates { coordinates: coordinates?, label: place.to_string() };
        router.first_answer(&query).await
    }

    fn direct(&self, report: WeatherReport) -> RoutedReport {
        RoutedReport {
            location: ResolvedLocation::direct(self.raw, self.unit.clone()),
            report,
            note: None,
        }
    }

    fn substituted(
        &self,
        unit: AdministrativeUnit,
        reason: SubstitutionReason,
        note: String,
        report: WeatherReport,
    ) -> RoutedReport {
        tracing::info!(note = %note, "Substituted location");
        RoutedReport {
            location: ResolvedLocation::substituted(self.raw, unit, reason),
            report,
            note: Some(note),
        }
    }
}
