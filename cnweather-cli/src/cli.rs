use std::process::ExitCode;

use clap::{CommandFactory, Parser};
use cnweather_core::{
    Config, FallbackRouter, ReferenceData, RouteOutcome, geocode::geocoders_from_config,
    provider::{http_client, providers_from_config},
};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(
    name = "cnweather",
    version,
    about = "Current weather for Chinese and worldwide places, with fallback to nearby cities",
    after_help = "示例:\n  cnweather 北京\n  cnweather 浙江嘉兴\n  cnweather New York"
)]
pub struct Cli {
    /// Place name; several words are joined with a space.
    #[arg(value_name = "LOCATION")]
    pub location: Vec<String>,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let location = self.location.join(" ");
        if location.trim().is_empty() {
            Cli::command().print_help()?;
            println!();
            return Ok(ExitCode::SUCCESS);
        }

        let config = Config::load()?;
        let data = ReferenceData::load(&config.data_search_paths())?;

        let http = http_client(config.timeout())?;
        let providers = providers_from_config(&config, &http)?;
        tracing::debug!(
            providers = ?providers.iter().map(|p| p.id()).collect::<Vec<_>>(),
            "Providers enabled"
        );

        let router = FallbackRouter::new(data)
            .with_providers(providers)
            .with_geocoders(geocoders_from_config(&config, &http));
        for warning in router.data().fallback_warnings() {
            eprintln!("{warning}");
        }

        let outcome = router.route(&location).await;
        println!("{outcome}");

        Ok(match outcome {
            RouteOutcome::Resolved(_) => ExitCode::SUCCESS,
            RouteOutcome::Exhausted(_) => ExitCode::FAILURE,
        })
    }
}
