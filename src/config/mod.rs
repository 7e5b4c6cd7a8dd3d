pub mod cli;
pub mod toml_config;

use crate::core::provider::ProviderSettings;
#[cfg(feature = "cli")]
use crate::core::retry::Backoff;
use crate::core::retry::RetryPolicy;
use crate::domain::model::{BoundingBox, FetchRequest};
use crate::utils::error::Result;
use crate::utils::validation::{
    validate_non_empty_string, validate_path, validate_positive_number, Validate,
};
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
use clap::Parser;

/// Everything a fetch needs, after defaults, the config file and flags are merged.
#[derive(Debug, Clone)]
pub struct FetchSettings {
    pub request: FetchRequest,
    pub provider: ProviderSettings,
    pub retry: RetryPolicy,
}

impl Validate for FetchSettings {
    fn validate(&self) -> Result<()> {
        validate_non_empty_string("api_key", &self.request.api_key)?;
        validate_path("output_path", &self.request.output_path.to_string_lossy())?;
        validate_positive_number("max_retries", self.retry.max_attempts, 1)?;
        if let Some(timeout) = self.provider.timeout {
            validate_positive_number("timeout", timeout.as_secs(), 1)?;
        }
        self.provider.validate()
    }
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "dem-fetch", version)]
#[command(about = "Download a DEM raster for a bounding box from the OpenTopography global DEM API")]
pub struct CliConfig {
    /// OpenTopography API key
    pub api_key: String,

    /// Bounding box as min_lon,min_lat,max_lon,max_lat
    #[arg(allow_hyphen_values = true)]
    pub bbox: String,

    /// Where to write the GeoTIFF (overwritten if it exists)
    pub output_path: PathBuf,

    #[arg(long, help = "TOML file with [provider] and [retry] settings")]
    pub config: Option<PathBuf>,

    #[arg(long, help = "Override the provider endpoint URL")]
    pub endpoint: Option<String>,

    #[arg(long, help = "Dataset identifier, e.g. SRTMGL3 or COP30")]
    pub dem_type: Option<String>,

    #[arg(long, help = "Total number of download attempts")]
    pub max_retries: Option<u32>,

    #[arg(long, help = "Seconds to wait between attempts")]
    pub retry_delay: Option<u64>,

    #[arg(long, help = "Per-request timeout in seconds (none by default)")]
    pub timeout: Option<u64>,

    #[arg(short, long, help = "Enable verbose output")]
    pub verbose: bool,
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// Merge built-in defaults, the optional config file and flags, in that order.
    pub fn resolve(&self) -> Result<FetchSettings> {
        let bbox: BoundingBox = self.bbox.parse()?;
        if let Err(e) = bbox.validate() {
            tracing::warn!("{}; sending it to the provider unchanged", e);
        }

        let file = match &self.config {
            Some(path) => {
                tracing::debug!("Loading settings from {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };
        file.validate()?;

        let mut provider = file.provider_settings();
        if let Some(endpoint) = &self.endpoint {
            provider.endpoint = endpoint.clone();
        }
        if let Some(dem_type) = &self.dem_type {
            provider.dem_type = dem_type.parse()?;
        }
        if let Some(secs) = self.timeout {
            provider.timeout = Some(Duration::from_secs(secs));
        }

        let mut retry = file.retry_policy()?;
        if let Some(attempts) = self.max_retries {
            retry.max_attempts = attempts;
        }
        if let Some(secs) = self.retry_delay {
            let delay = Duration::from_secs(secs);
            retry.base_delay = delay;
            retry.max_delay = match retry.backoff {
                Backoff::Fixed => delay,
                Backoff::Exponential => retry.max_delay.max(delay),
            };
        }

        let settings = FetchSettings {
            request: FetchRequest::new(self.api_key.clone(), bbox, self.output_path.clone()),
            provider,
            retry,
        };
        settings.validate()?;
        Ok(settings)
    }
}
