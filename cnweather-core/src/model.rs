use std::{collections::BTreeMap, fmt};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::provider::ProviderId;

/// A (province, city, district) triple.
///
/// `district` equals `city` when no finer subdivision is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdministrativeUnit {
    pub province: String,
    pub city: String,
    pub district: String,
}

impl AdministrativeUnit {
    pub fn new(
        province: impl Into<String>,
        city: impl Into<String>,
        district: impl Into<String>,
    ) -> Self {
        Self { province: province.into(), city: city.into(), district: district.into() }
    }

    /// A unit whose city and district are both `city`.
    pub fn city_level(province: impl Into<String>, city: impl Into<String>) -> Self {
        let city = city.into();
        Self { province: province.into(), district: city.clone(), city }
    }

    pub fn has_district(&self) -> bool {
        self.district != self.city
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CityCodeEntry {
    pub name: String,
    pub code: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvinceInfo {
    pub name: String,
    pub code_prefix: String,
    pub capital: String,
}

impl ProvinceInfo {
    pub fn owns_code(&self, code: &str) -> bool {
        !self.code_prefix.is_empty() && code.starts_with(&self.code_prefix)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubstitutionReason {
    None,
    ProvinceCapital,
    NearbyCity,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLocation {
    pub raw_input: String,
    pub administrative_unit: AdministrativeUnit,
    pub substituted: bool,
    pub substitution_reason: SubstitutionReason,
}

impl ResolvedLocation {
    pub fn direct(raw_input: impl Into<String>, unit: AdministrativeUnit) -> Self {
        Self {
            raw_input: raw_input.into(),
            administrative_unit: unit,
            substituted: false,
            substitution_reason: SubstitutionReason::None,
        }
    }

    pub fn substituted(
        raw_input: impl Into<String>,
        unit: AdministrativeUnit,
        reason: SubstitutionReason,
    ) -> Self {
        Self {
            raw_input: raw_input.into(),
            administrative_unit: unit,
            substituted: reason != SubstitutionReason::None,
            substitution_reason: reason,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Returns `None` when either component is out of range or not finite.
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        let valid = latitude.is_finite()
            && longitude.is_finite()
            && (-90.0..=90.0).contains(&latitude)
            && (-180.0..=180.0).contains(&longitude);

        valid.then_some(Self { latitude, longitude })
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4}", self.latitude, self.longitude)
    }
}

/// Current conditions as reported by one provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReport {
    pub provider: ProviderId,
    pub place_label: String,
    pub description: String,
    pub temperature_celsius: f64,
    /// Wind, humidity and friends; keys are display labels.
    pub extra: BTreeMap<String, String>,
    pub observed_at: Option<NaiveDateTime>,
}

impl WeatherReport {
    pub fn new(
        provider: ProviderId,
        place_label: impl Into<String>,
        description: impl Into<String>,
        temperature_celsius: f64,
    ) -> Self {
        Self {
            provider,
            place_label: place_label.into(),
            description: description.into(),
            temperature_celsius,
            extra: BTreeMap::new(),
            observed_at: None,
        }
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.extra.insert(key.into(), value);
        }
        self
    }
}

impl fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} {}°C", self.place_label, self.description, self.temperature_celsius)?;
        for (key, value) in &self.extra {
            write!(f, " {key}:{value}")?;
        }
        Ok(())
    }
}

/// Successful outcome of a routing run.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedReport {
    pub location: ResolvedLocation,
    pub report: WeatherReport,
    /// Set when the report describes a substitute place.
    pub note: Option<String>,
}

impl fmt::Display for RoutedReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.note {
            Some(note) => write!(f, "[{note}] {}", self.report),
            None => write!(f, "{}", self.report),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    Resolved(RoutedReport),
    /// Every tier failed; carries the user-facing failure message.
    Exhausted(String),
}

impl RouteOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, RouteOutcome::Resolved(_))
    }

    pub fn report(&self) -> Option<&RoutedReport> {
        match self {
            RouteOutcome::Resolved(routed) => Some(routed),
            RouteOutcome::Exhausted(_) => None,
        }
    }
}

impl fmt::Display for RouteOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteOutcome::Resolved(routed) => routed.fmt(f),
            RouteOutcome::Exhausted(message) => f.write_str(message),
        }
    }
}
