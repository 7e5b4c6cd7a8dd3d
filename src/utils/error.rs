use thiserror::Error;

/// Number of body bytes kept as diagnostic context when the provider answers
/// 200 with something that is not a raster.
pub const PREVIEW_LEN: usize = 100;

#[derive(Error, Debug)]
pub enum FetchError {
    #[error("API returned content of type '{content_type}', which is not a GeoTIFF image (first bytes: {preview})")]
    InvalidContentType {
        content_type: String,
        preview: String,
    },

    #[error("API request failed with status code {status}: {body}")]
    ClientError { status: u16, body: String },

    #[error("Server error (HTTP {status})")]
    ServerError { status: u16 },

    /// Built through `From`, which strips the request URL since its query carries the API key.
    #[error("Network error: {0}")]
    Transport(reqwest::Error),

    #[error("All {attempts} attempts to download the DEM failed (last error: {last_error})")]
    RetriesExhausted {
        attempts: u32,
        last_error: String,
    },

    #[error("Invalid bounding box '{input}': {reason}")]
    InvalidBoundingBox { input: String, reason: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        Self::Transport(e.without_url())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Provider,
    Network,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl FetchError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ServerError { .. } | Self::Transport(_))
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidBoundingBox { .. } => ErrorCategory::Input,
            Self::TomlError(_)
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::InvalidContentType { .. }
            | Self::ClientError { .. }
            | Self::ServerError { .. } => ErrorCategory::Provider,
            Self::Transport(_) | Self::RetriesExhausted { .. } => ErrorCategory::Network,
            Self::IoError(_) => ErrorCategory::Storage,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ServerError { .. } | Self::Transport(_) => ErrorSeverity::Medium,
            Self::InvalidContentType { .. }
            | Self::ClientError { .. }
            | Self::RetriesExhausted { .. }
            | Self::InvalidBoundingBox { .. } => ErrorSeverity::High,
            Self::TomlError(_)
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. }
            | Self::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::InvalidContentType { content_type, .. } if content_type.is_empty() => {
                "The provider answered without a content type, so the response is not a DEM raster"
                    .to_string()
            }
            Self::ClientError { status, .. } if *status == 401 || *status == 403 => {
                format!("The provider rejected the request (HTTP {}): the API key was not accepted", status)
            }
            Self::RetriesExhausted { attempts, .. } => {
                format!("Could not download the DEM after {} attempts", attempts)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::InvalidContentType { .. } => {
                "Check the bounding box size and dataset type; the provider returns an error page for requests it cannot serve"
            }
            Self::ClientError { status, .. } if *status == 401 || *status == 403 => {
                "Verify the API key is valid and active"
            }
            Self::ClientError { .. } => "Check the request parameters and endpoint URL",
            Self::ServerError { .. } | Self::RetriesExhausted { .. } => {
                "The provider may be overloaded; try again later or raise --max-retries"
            }
            Self::Transport(_) => "Check network connectivity and the endpoint URL",
            Self::InvalidBoundingBox { .. } => {
                "Pass the box as min_lon,min_lat,max_lon,max_lat, e.g. -122.6,37.6,-122.3,37.9"
            }
            Self::IoError(_) => "Check that the output directory exists and is writable",
            Self::TomlError(_)
            | Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => "Review the configuration file and command-line flags",
        }
    }
}

pub type Result<T> = std::result::Result<T, FetchError>;
