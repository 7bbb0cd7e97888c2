//! Client configuration.
//!
//! # Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `FHIR_BASE_URL` | http://localhost:8080/fhir | Server endpoint |
//! | `FHIR_FORMAT` | xml | Preferred wire format (xml, json) |
//! | `FHIR_USE_FORMAT_PARAM` | false | Also request the format with `_format` |
//! | `FHIR_TIMEOUT` | 30 | Request timeout (seconds) |
//! | `FHIR_LOG_LEVEL` | info | Log level |
//! | `FHIR_USER_AGENT` | helios-fhir-client | User agent sent with every request |
//!
//! # Example
//!
//! ```rust,ignore
//! use helios_fhir_client::{ClientConfig, FhirClient};
//!
//! let config = ClientConfig {
//!     base_url: "https://fhir.example.org/fhir".to_string(),
//!     format: "json".to_string(),
//!     ..Default::default()
//! };
//! let client = FhirClient::with_config(&config)?;
//! ```

use std::time::Duration;

use clap::Parser;
use helios_serde::ResourceFormat;

/// Configuration of a [`FhirClient`](crate::FhirClient) and its default
/// transport.
#[derive(Debug, Clone, Parser)]
#[command(name = "fhir-client")]
#[command(about = "FHIR REST client")]
pub struct ClientConfig {
    /// Base url of the FHIR server.
    #[arg(long, env = "FHIR_BASE_URL", default_value = "http://localhost:8080/fhir")]
    pub base_url: String,

    /// Preferred wire format (xml, json).
    #[arg(long, env = "FHIR_FORMAT", default_value = "xml")]
    pub format: String,

    /// Send `_format` in addition to the `Accept` header.
    #[arg(long, env = "FHIR_USE_FORMAT_PARAM", default_value = "false")]
    pub use_format_param: bool,

    /// Request timeout in seconds.
    #[arg(long, env = "FHIR_TIMEOUT", default_value = "30")]
    pub timeout: u64,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long, env = "FHIR_LOG_LEVEL", default_value = "info")]
    pub log_level: String,

    #[arg(long, env = "FHIR_USER_AGENT", default_value = "helios-fhir-client")]
    pub user_agent: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080/fhir".to_string(),
            format: "xml".to_string(),
            use_format_param: false,
            timeout: 30,
            log_level: "info".to_string(),
            user_agent: "helios-fhir-client".to_string(),
        }
    }
}

impl ClientConfig {
    /// Reads the configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        Self::try_parse().unwrap_or_default()
    }

    /// The configured format, `None` if it is not recognized.
    pub fn preferred_format(&self) -> Option<ResourceFormat> {
        ResourceFormat::parse(&self.format)
    }

    pub fn timeout_duration(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    /// Validates the configuration and returns errors if any.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        match url::Url::parse(&self.base_url) {
            Ok(url) if url.cannot_be_a_base() => {
                errors.push(format!("Base url '{}' cannot be used as a base", self.base_url));
            }
            Ok(_) => {}
            Err(e) => errors.push(format!("Base url '{}' is invalid: {}", self.base_url, e)),
        }

        if self.preferred_format().is_none() {
            errors.push(format!("Unknown format '{}'", self.format));
        }

        if self.timeout == 0 {
            errors.push("Timeout cannot be 0".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// A configuration suitable for tests.
    pub fn for_testing() -> Self {
        Self {
            base_url: "http://localhost:0/fhir".to_string(),
            format: "xml".to_string(),
            use_format_param: false,
            timeout: 5,
            log_level: "debug".to_string(),
            user_agent: "helios-fhir-client-test".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://localhost:8080/fhir");
        assert_eq!(config.preferred_format(), Some(ResourceFormat::Xml));
        assert_eq!(config.timeout_duration(), Duration::from_secs(30));
        assert!(!config.use_format_param);
    }

    #[test]
    fn test_validate_valid() {
        assert!(ClientConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validate_invalid_base_url() {
        let config = ClientConfig {
            base_url: "not a url".to_string(),
            ..Default::default()
        };
        let result = config.validate();
        assert!(result.is_err());
        assert!(result.unwrap_err().iter().any(|e| e.contains("Base url")));
    }

    #[test]
    fn test_validate_invalid_format_and_timeout() {
        let config = ClientConfig {
            format: "yaml".to_string(),
            timeout: 0,
            ..Default::default()
        };
        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
    }

    #[test]
    fn test_json_format() {
        let config = ClientConfig {
            format: "JSON".to_string(),
            ..Default::default()
        };
        assert_eq!(config.preferred_format(), Some(ResourceFormat::Json));
    }

    #[test]
    fn test_for_testing() {
        let config = ClientConfig::for_testing();
        assert_eq!(config.timeout, 5);
        assert_eq!(config.log_level, "debug");
        assert!(config.validate().is_ok());
    }
}
