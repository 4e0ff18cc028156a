//! Client configuration loader.
//!
//! Everything has a working default aimed at the public USGS host, so a
//! configuration file is optional. Settings can come from a TOML file
//! (`nwis.toml` by convention) or from the environment, with a `.env` file
//! picked up when present.
//!
//! ```toml
//! base_url = "https://waterservices.usgs.gov"
//! user_agent = "my-hydrology-tool/1.0"
//! timeout_secs = 30
//! ```

use serde::Deserialize;
use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::model::{NwisError, Result};

/// Production host of the NWIS water services.
pub const DEFAULT_BASE_URL: &str = "https://waterservices.usgs.gov";

/// Environment variable names read by [`ClientConfig::from_env`].
pub const ENV_BASE_URL: &str = "NWIS_BASE_URL";
pub const ENV_USER_AGENT: &str = "NWIS_USER_AGENT";
pub const ENV_TIMEOUT_SECS: &str = "NWIS_TIMEOUT_SECS";

/// Connection settings shared by the query builder and the HTTP transport.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClientConfig {
    /// Scheme and host the `/nwis/<service>/` path is appended to.
    pub base_url: String,
    pub user_agent: String,
    /// Whole-request timeout handed to the HTTP client.
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 60,
        }
    }
}

impl ClientConfig {
    /// Parses a TOML document. Omitted keys keep their defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ClientConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    /// `NwisError::Configuration` if the file is missing, unreadable, or
    /// malformed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            NwisError::Configuration(format!("failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Defaults overridden by `NWIS_BASE_URL`, `NWIS_USER_AGENT` and
    /// `NWIS_TIMEOUT_SECS`. A `.env` file in the working directory is loaded
    /// first if one exists.
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            config.base_url = base_url;
        }
        if let Some(user_agent) = lookup(ENV_USER_AGENT) {
            config.user_agent = user_agent;
        }
        if let Some(timeout) = lookup(ENV_TIMEOUT_SECS) {
            config.timeout_secs = timeout.trim().parse().map_err(|e| {
                NwisError::Configuration(format!(
                    "{} must be a whole number of seconds, got '{}': {}",
                    ENV_TIMEOUT_SECS, timeout, e
                ))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(NwisError::Configuration(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }
        if self.timeout_secs == 0 {
            return Err(NwisError::Configuration("timeout_secs must be positive".to_string()));
        }
        Ok(())
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
