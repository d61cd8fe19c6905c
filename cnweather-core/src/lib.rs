//! Core library for the `cnweather` CLI.
//!
//! This crate defines:
//! - Reference tables of weather.com.cn city codes and provinces
//! - Place-name normalization, completion and code resolution
//! - Adapters over several weather providers and geocoders
//! - The tiered fallback router that ties them together
//!
//! It is used by `cnweather-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod geocode;
pub mod hierarchy;
pub mod model;
pub mod normalize;
pub mod phrases;
pub mod provider;
pub mod region;
pub mod resolver;
pub mod router;

pub use config::{Config, ProviderConfig};
pub use data::ReferenceData;
pub use error::{DataError, ProviderError};
pub use model::{RouteOutcome, RoutedReport, WeatherReport};
pub use provider::{ProviderId, WeatherProvider};
pub use router::FallbackRouter;
