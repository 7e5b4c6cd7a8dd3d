pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::{cli::LocalStorage, FetchSettings};
pub use core::{
    fetcher::DemFetcher,
    provider::ProviderSettings,
    retry::{Backoff, RetryPolicy, TokioDelay},
};
pub use domain::model::{BoundingBox, DemType, FetchReport, FetchRequest};
pub use utils::error::{FetchError, Result};
