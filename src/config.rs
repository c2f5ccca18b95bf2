use anyhow::{Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_FINDING_API: &str = "https://svcs.ebay.com/services/search/FindingService/v1";

/// Service settings. Every key can be overridden by the upper-cased
/// environment variable of the same name (e.g. `EBAY_APP_ID`, `PORT`).
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub ebay_app_id: Option<String>,
    pub ebay_finding_api: String,
    pub request_timeout_secs: u64,
    pub max_results_per_page: u32,
    pub min_keyword_length: usize,
    pub max_keyword_length: usize,
    pub rate_limit_default_per_minute: u32,
    pub rate_limit_search_per_minute: u32,
    pub host: String,
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            ebay_app_id: None,
            ebay_finding_api: DEFAULT_FINDING_API.to_string(),
            request_timeout_secs: 30,
            max_results_per_page: 100,
            min_keyword_length: 1,
            max_keyword_length: 1000,
            rate_limit_default_per_minute: 100,
            rate_limit_search_per_minute: 30,
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

impl Settings {
    /// Load settings from the process environment (and `.env`, if present).
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::load(Environment::default().try_parsing(true))
    }

    fn load(env: Environment) -> Result<Self> {
        let defaults = Settings::default();

        Config::builder()
            .set_default("ebay_finding_api", defaults.ebay_finding_api)?
            .set_default("request_timeout_secs", defaults.request_timeout_secs as i64)?
            .set_default("max_results_per_page", defaults.max_results_per_page as i64)?
            .set_default("min_keyword_length", defaults.min_keyword_length as i64)?
            .set_default("max_keyword_length", defaults.max_keyword_length as i64)?
            .set_default("rate_limit_default_per_minute", defaults.rate_limit_default_per_minute as i64)?
            .set_default("rate_limit_search_per_minute", defaults.rate_limit_search_per_minute as i64)?
            .set_default("host", defaults.host)?
            .set_default("port", defaults.port as i64)?
            .add_source(env)
            .build()
            .context("Failed to read configuration")?
            .try_deserialize()
            .context("Invalid configuration")
    }

    pub fn is_ebay_configured(&self) -> bool {
        self.ebay_app_id
            .as_deref()
            .map(|id| !id.trim().is_empty())
            .unwrap_or(false)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn with_app_id(mut self, app_id: impl Into<String>) -> Self {
        self.ebay_app_id = Some(app_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_from(pairs: &[(&str, &str)]) -> Environment {
        let source: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().try_parsing(true).source(Some(source))
    }

    #[test]
    fn test_defaults_without_environment() {
        let settings = Settings::load(env_from(&[])).unwrap();

        assert_eq!(settings.ebay_finding_api, DEFAULT_FINDING_API);
        assert_eq!(settings.port, 5000);
        assert_eq!(settings.rate_limit_search_per_minute, 30);
        assert_eq!(settings.max_keyword_length, 1000);
        assert!(!settings.is_ebay_configured());
    }

    #[test]
    fn test_environment_overrides() {
        let settings = Settings::load(env_from(&[
            ("EBAY_APP_ID", "my-app"),
            ("PORT", "8080"),
            ("REQUEST_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();

        assert!(settings.is_ebay_configured());
        assert_eq!(settings.port, 8080);
        assert_eq!(settings.request_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_blank_app_id_is_not_configured() {
        let settings = Settings::default().with_app_id("  ");
        assert!(!settings.is_ebay_configured());
    }
}
