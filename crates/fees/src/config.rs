//! Integration configuration for the fee engine.
//!
//! Two settings gate every network call: the enable flag and the base URL.
//! Both are checked before the circuit breaker or retry policy are
//! touched, so misconfiguration never counts as a downstream failure.

use crate::errors::FeeError;

/// Environment variable gating the integration on or off.
pub const FEES_ENABLED_ENV: &str = "NEXT_PUBLIC_PLUGIN_FEES_ENABLED";
/// Environment variable holding the fee engine base URL.
pub const FEES_PATH_ENV: &str = "PLUGIN_FEES_PATH";

/// Fee client configuration.
#[derive(Clone, Debug, Default)]
pub struct FeeClientConfig {
    /// Whether the fee integration is switched on.
    pub enabled: bool,

    /// Base URL of the fee engine, without a trailing slash.
    pub base_url: Option<String>,
}

impl FeeClientConfig {
    /// Create a configuration directly (tests, embedders).
    pub fn new(enabled: bool, base_url: impl Into<String>) -> Self {
        Self {
            enabled,
            base_url: normalize(Some(base_url.into())),
        }
    }

    /// Read the configuration from the process environment.
    ///
    /// The flag accepts `true`/`1` (case-insensitive); anything else,
    /// including absence, disables the integration.
    pub fn from_env() -> Self {
        let enabled = std::env::var(FEES_ENABLED_ENV)
            .map(|value| matches!(value.trim().to_ascii_lowercase().as_str(), "true" | "1"))
            .unwrap_or(false);
        let base_url = normalize(std::env::var(FEES_PATH_ENV).ok());
        Self { enabled, base_url }
    }

    /// Whether a base URL is present.
    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Gate checked before any downstream call. Returns the base URL when
    /// the integration is enabled and configured.
    pub fn ensure_ready(&self) -> Result<&str, FeeError> {
        if !self.enabled {
            return Err(FeeError::Disabled);
        }
        self.base_url
            .as_deref()
            .ok_or_else(|| FeeError::Configuration {
                message: format!("{FEES_PATH_ENV} is not set"),
            })
    }
}

/// Trim whitespace and trailing slashes; empty values count as unset.
fn normalize(raw: Option<String>) -> Option<String> {
    raw.map(|value| value.trim().trim_end_matches('/').to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_slash_is_normalized() {
        let config = FeeClientConfig::new(true, "http://fees.internal/v1/");
        assert_eq!(config.base_url.as_deref(), Some("http://fees.internal/v1"));
    }

    #[test]
    fn test_blank_base_url_counts_as_unset() {
        let config = FeeClientConfig::new(true, "   ");
        assert!(!config.is_configured());
        let error = config.ensure_ready().unwrap_err();
        assert!(error.is_configuration());
    }

    #[test]
    fn test_disabled_wins_over_configured() {
        let config = FeeClientConfig::new(false, "http://fees.internal");
        assert!(matches!(config.ensure_ready(), Err(FeeError::Disabled)));
    }

    #[test]
    fn test_ready_returns_base_url() {
        let config = FeeClientConfig::new(true, "http://fees.internal");
        assert_eq!(config.ensure_ready().unwrap(), "http://fees.internal");
    }

    #[test]
    fn test_from_env_reads_both_settings() {
        std::env::set_var(FEES_ENABLED_ENV, "TRUE");
        std::env::set_var(FEES_PATH_ENV, "http://fees.internal/");

        let config = FeeClientConfig::from_env();
        assert!(config.enabled);
        assert_eq!(config.base_url.as_deref(), Some("http://fees.internal"));

        std::env::remove_var(FEES_ENABLED_ENV);
        std::env::remove_var(FEES_PATH_ENV);
    }
}
