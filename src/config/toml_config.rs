use crate::core::provider::{ProviderSettings, DEFAULT_ACCEPTED_CONTENT_TYPES, DEFAULT_ENDPOINT};
use crate::core::retry::{
    Backoff, RetryPolicy, DEFAULT_MAX_ATTEMPTS, DEFAULT_MAX_DELAY, DEFAULT_RETRY_DELAY,
};
use crate::domain::model::DemType;
use crate::utils::error::{FetchError, Result};
use crate::utils::validation::{
    validate_non_empty_list, validate_positive_number, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Optional settings file. Every key has a default, so an empty file is valid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    #[serde(default)]
    pub provider: ProviderSection,
    #[serde(default)]
    pub retry: RetrySection,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProviderSection {
    pub endpoint: Option<String>,
    pub dem_type: Option<DemType>,
    pub accepted_content_types: Option<Vec<String>>,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    pub max_attempts: Option<u32>,
    pub delay_seconds: Option<u64>,
    pub backoff: Option<Backoff>,
    pub max_delay_seconds: Option<u64>,
}

impl TomlConfig {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| FetchError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// Parse settings from a TOML string.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replace `${VAR_NAME}` with the environment value; unknown variables are left as-is.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| FetchError::ConfigError {
            message: format!("env substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    pub fn provider_settings(&self) -> ProviderSettings {
        let section = &self.provider;
        ProviderSettings {
            endpoint: section
                .endpoint
                .clone()
                .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string()),
            dem_type: section.dem_type.unwrap_or_default(),
            accepted_content_types: section.accepted_content_types.clone().unwrap_or_else(|| {
                DEFAULT_ACCEPTED_CONTENT_TYPES
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
            timeout: section.timeout_seconds.map(Duration::from_secs),
        }
    }

    pub fn retry_policy(&self) -> Result<RetryPolicy> {
        let section = &self.retry;
        let max_attempts = section.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS);
        let base_delay = section
            .delay_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_RETRY_DELAY);

        match section.backoff.unwrap_or_default() {
            Backoff::Fixed => Ok(RetryPolicy::fixed(max_attempts, base_delay)),
            Backoff::Exponential => {
                // the default cap only applies when the base delay fits under it
                let max_delay = match section.max_delay_seconds {
                    Some(secs) => Duration::from_secs(secs),
                    None if base_delay <= DEFAULT_MAX_DELAY => DEFAULT_MAX_DELAY,
                    None => {
                        return Err(FetchError::MissingConfigError {
                            field: "retry.max_delay_seconds".to_string(),
                        })
                    }
                };
                Ok(RetryPolicy::exponential(max_attempts, base_delay, max_delay))
            }
        }
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        if let Some(endpoint) = &self.provider.endpoint {
            validate_url("provider.endpoint", endpoint)?;
        }
        if let Some(types) = &self.provider.accepted_content_types {
            validate_non_empty_list("provider.accepted_content_types", types)?;
        }
        if let Some(timeout) = self.provider.timeout_seconds {
            validate_positive_number("provider.timeout_seconds", timeout, 1)?;
        }
        if let Some(attempts) = self.retry.max_attempts {
            validate_positive_number("retry.max_attempts", attempts, 1)?;
        }
        let policy = self.retry_policy()?;
        if policy.max_delay < policy.base_delay {
            return Err(FetchError::InvalidConfigValueError {
                field: "retry.max_delay_seconds".to_string(),
                value: policy.max_delay.as_secs().to_string(),
                reason: "Must not be smaller than retry.delay_seconds".to_string(),
            });
        }
        Ok(())
    }
}
