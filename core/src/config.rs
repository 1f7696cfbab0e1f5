//! Gateway configuration and its TOML loader.
//!
//! ```toml
//! host = "mycenae.local"
//! port = 8082
//! secure = false
//! timeout_ms = 3000
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const HTTP_PORT: u16 = 80;
const HTTPS_PORT: u16 = 443;

/// Where the remote service lives and how to talk to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
    /// Use `https` instead of `http`.
    #[serde(default)]
    pub secure: bool,
    /// Per-call timeout covering connect, send, and body read.
    #[serde(rename = "timeout_ms", with = "millis")]
    pub timeout: Duration,
    /// Skip certificate verification on TLS connections.
    #[serde(default = "default_insecure_skip_verify")]
    pub insecure_skip_verify: bool,
}

fn default_insecure_skip_verify() -> bool {
    true
}

impl GatewayConfig {
    pub fn new(host: impl Into<String>, port: u16, secure: bool, timeout: Duration) -> Self {
        Self {
            host: host.into(),
            port,
            secure,
            timeout,
            insecure_skip_verify: default_insecure_skip_verify(),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: GatewayConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse, and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::Invalid("host must not be empty".to_string()));
        }
        if self.port == 0 {
            return Err(ConfigError::Invalid("port must not be zero".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must not be zero".to_string()));
        }
        Ok(())
    }

    /// `scheme://host[:port]`, leaving out the port for 80 and 443.
    pub fn base_url(&self) -> String {
        let scheme = if self.secure { "https" } else { "http" };
        if self.port == HTTP_PORT || self.port == HTTPS_PORT {
            format!("{scheme}://{}", self.host)
        } else {
            format!("{scheme}://{}:{}", self.host, self.port)
        }
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        let millis = u64::try_from(value.as_millis()).unwrap_or(u64::MAX);
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(host: &str, port: u16, secure: bool) -> GatewayConfig {
        GatewayConfig::new(host, port, secure, Duration::from_secs(3))
    }

    #[test]
    fn base_url_keeps_non_default_port() {
        assert_eq!(config("localhost", 18080, false).base_url(), "http://localhost:18080");
        assert_eq!(config("localhost", 8443, true).base_url(), "https://localhost:8443");
    }

    #[test]
    fn base_url_drops_default_ports() {
        assert_eq!(config("mycenae.local", 80, false).base_url(), "http://mycenae.local");
        assert_eq!(config("mycenae.local", 443, true).base_url(), "https://mycenae.local");
        // 443 is omitted regardless of the scheme
        assert_eq!(config("mycenae.local", 443, false).base_url(), "http://mycenae.local");
    }

    #[test]
    fn validate_rejects_empty_host() {
        let err = config("  ", 8080, false).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("host")));
    }

    #[test]
    fn validate_rejects_zero_port() {
        let err = config("localhost", 0, false).validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("port")));
    }

    #[test]
    fn validate_rejects_zero_timeout() {
        let config = GatewayConfig::new("localhost", 8080, false, Duration::ZERO);
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("timeout")));
    }

    #[test]
    fn loads_from_toml() {
        let config = GatewayConfig::from_toml_str(
            r#"
            host = "localhost"
            port = 18080
            timeout_ms = 3000
            "#,
        )
        .unwrap();
        assert_eq!(config.host, "localhost");
        assert_eq!(config.port, 18080);
        assert!(!config.secure);
        assert!(config.insecure_skip_verify);
        assert_eq!(config.timeout, Duration::from_secs(3));
    }

    #[test]
    fn toml_with_invalid_values_is_rejected() {
        let err = GatewayConfig::from_toml_str(
            r#"
            host = ""
            port = 18080
            timeout_ms = 3000
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn toml_missing_timeout_is_a_parse_error() {
        let err = GatewayConfig::from_toml_str(r#"host = "localhost""#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_reports_missing_file() {
        let err = GatewayConfig::load(Path::new("/nonexistent/mycenae.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
