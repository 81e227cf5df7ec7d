//! Bridge configuration.

use anyhow::{Context, Result};

/// Default API root for the HubSpot CRM v3 endpoints.
pub const DEFAULT_BASE_URL: &str = "https://api.hubapi.com/crm/v3";

/// Connection settings for the HubSpot API.
#[derive(Debug, Clone)]
pub struct HubspotConfig {
    pub base_url: String,
    pub api_key: String,
}

impl HubspotConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    /// Loads the configuration from the environment, reading a `.env` file
    /// first when one is present.
    ///
    /// `HUBSPOT_API_KEY` is required. `HUBSPOT_BASE_URL` overrides the
    /// production API root, so test setups can point the bridge at a proxy.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = std::env::var("HUBSPOT_API_KEY")
            .context("HUBSPOT_API_KEY environment variable not set")?;
        let base_url =
            std::env::var("HUBSPOT_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        Ok(Self::new(base_url, api_key))
    }
}
