//! Connection configuration

use crate::{Error, Result, Service};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default resource API version
pub const DEFAULT_API_VERSION: u32 = 4;

/// Default transport timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 100;

/// Where and how to reach a Safeguard appliance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Appliance host name or IP address
    pub network_address: String,

    /// Resource API version used in service URLs
    pub api_version: u32,

    /// Skip TLS certificate verification
    pub ignore_ssl: bool,

    /// Transport timeout for every request
    pub timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            network_address: String::new(),
            api_version: DEFAULT_API_VERSION,
            ignore_ssl: false,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ConnectionConfig {
    /// Create a configuration for the given appliance with default settings
    pub fn new(network_address: impl Into<String>) -> Self {
        Self {
            network_address: network_address.into(),
            ..Default::default()
        }
    }

    /// Set the API version
    pub fn with_api_version(mut self, api_version: u32) -> Self {
        self.api_version = api_version;
        self
    }

    /// Enable or disable TLS certificate verification bypass
    pub fn with_ignore_ssl(mut self, ignore_ssl: bool) -> Self {
        self.ignore_ssl = ignore_ssl;
        self
    }

    /// Set the transport timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Load configuration from `SAFEGUARD_*` environment variables.
    ///
    /// `SAFEGUARD_ADDRESS` is required; `SAFEGUARD_API_VERSION`,
    /// `SAFEGUARD_IGNORE_SSL` and `SAFEGUARD_TIMEOUT_SECS` fall back to the
    /// defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let network_address = lookup("SAFEGUARD_ADDRESS")
            .ok_or_else(|| Error::argument("SAFEGUARD_ADDRESS environment variable not set"))?;

        let mut config = Self::new(network_address);

        if let Some(value) = lookup("SAFEGUARD_API_VERSION") {
            config.api_version = value.trim().parse().map_err(|_| {
                Error::argument(format!("Invalid SAFEGUARD_API_VERSION: {value}"))
            })?;
        }

        if let Some(value) = lookup("SAFEGUARD_IGNORE_SSL") {
            config.ignore_ssl = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" | "" => false,
                _ => {
                    return Err(Error::argument(format!(
                        "Invalid SAFEGUARD_IGNORE_SSL: {value}"
                    )));
                }
            };
        }

        if let Some(value) = lookup("SAFEGUARD_TIMEOUT_SECS") {
            config.timeout_secs = value.trim().parse().map_err(|_| {
                Error::argument(format!("Invalid SAFEGUARD_TIMEOUT_SECS: {value}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Parse a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| Error::argument(format!("Invalid configuration: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a TOML file
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::argument(format!(
                "Unable to read configuration file {}: {e}",
                path.display()
            ))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check the configuration before any URL is built from it
    pub fn validate(&self) -> Result<()> {
        if self.network_address.trim().is_empty() {
            return Err(Error::argument(
                "Parameter may not be null or empty: network_address",
            ));
        }
        if self.timeout_secs == 0 {
            return Err(Error::argument("timeout_secs must be greater than zero"));
        }
        Ok(())
    }

    /// Base URL of the security token service
    pub fn rsts_url(&self) -> String {
        format!("https://{}/RSTS", self.network_address)
    }

    /// Base URL of a backend service
    pub fn service_url(&self, service: Service) -> String {
        format!(
            "https://{}/service/{}/v{}",
            self.network_address,
            service.segment(),
            self.api_version
        )
    }

    /// URL of the push event endpoint
    pub fn event_url(&self) -> String {
        format!("https://{}/service/event", self.network_address)
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
