use crate::domain::model::{DemType, FetchRequest};
use crate::utils::error::Result;
use crate::utils::validation::{validate_non_empty_list, validate_url, Validate};
use reqwest::Client;
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://portal.opentopography.org/API/globaldem";

/// The only output format the fetcher asks for; the content-type allow-list assumes it.
pub const OUTPUT_FORMAT: &str = "GTiff";

pub const DEFAULT_ACCEPTED_CONTENT_TYPES: [&str; 2] = ["image/tiff", "application/octet-stream"];

/// Where to ask for a DEM and what a valid answer looks like.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub endpoint: String,
    pub dem_type: DemType,
    pub accepted_content_types: Vec<String>,
    /// `None` leaves the transport's own defaults in charge.
    pub timeout: Option<Duration>,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            dem_type: DemType::default(),
            accepted_content_types: DEFAULT_ACCEPTED_CONTENT_TYPES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            timeout: None,
        }
    }
}

impl ProviderSettings {
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_dem_type(mut self, dem_type: DemType) -> Self {
        self.dem_type = dem_type;
        self
    }

    /// Query string for a request, in the provider's parameter names.
    pub fn query_params(&self, request: &FetchRequest) -> Vec<(&'static str, String)> {
        let bbox = &request.bbox;
        vec![
            ("demtype", self.dem_type.as_str().to_string()),
            ("south", bbox.south.to_string()),
            ("north", bbox.north.to_string()),
            ("west", bbox.west.to_string()),
            ("east", bbox.east.to_string()),
            ("outputFormat", OUTPUT_FORMAT.to_string()),
            ("API_Key", request.api_key.clone()),
        ]
    }

    /// Checks the media type of a `content-type` header against the allow-list,
    /// ignoring parameters such as `charset` and letter case.
    pub fn accepts_content_type(&self, header: &str) -> bool {
        let media_type = header.split(';').next().unwrap_or("").trim();
        if media_type.is_empty() {
            return false;
        }
        self.accepted_content_types
            .iter()
            .any(|accepted| accepted.trim().eq_ignore_ascii_case(media_type))
    }

    pub fn build_client(&self) -> Result<Client> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = self.timeout {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build()?)
    }
}

impl Validate for ProviderSettings {
    fn validate(&self) -> Result<()> {
        validate_url("provider.endpoint", &self.endpoint)?;
        validate_non_empty_list("provider.accepted_content_types", &self.accepted_content_types)?;
        Ok(())
    }
}
