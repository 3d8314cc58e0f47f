//! Build-time configuration for the REST clients.
//!
//! # Design
//! - Base URLs are baked in at compile time (`VITE_API_URL`, `VITE_AUTH_API_URL`).
//! - Validate once at boot so a bad build fails loudly instead of per request.
//! - Keep URL joining here so every caller normalizes slashes the same way.

use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

/// Base URL used when no build-time override is present.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Configuration errors surfaced at startup.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// A configured base URL failed to parse.
    #[error("invalid {name} '{value}': {reason}")]
    InvalidUrl {
        /// Variable name the value came from.
        name: &'static str,
        /// Raw configured value.
        value: String,
        /// Parser error detail.
        reason: String,
    },
    /// A configured base URL is not an HTTP(S) URL.
    #[error("{name} must use http or https, got '{scheme}'")]
    UnsupportedScheme {
        /// Variable name the value came from.
        name: &'static str,
        /// Scheme found in the value.
        scheme: String,
    },
}

/// Base URLs for the two preconfigured clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    /// Main API base URL.
    pub api_url: String,
    /// Authentication API base URL.
    pub auth_api_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            auth_api_url: DEFAULT_API_URL.to_string(),
        }
    }
}

impl ApiConfig {
    /// Read the base URLs captured at compile time.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a configured value is not an HTTP(S) URL.
    pub fn from_build_env() -> Result<Self, ConfigError> {
        Self::from_values(option_env!("VITE_API_URL"), option_env!("VITE_AUTH_API_URL"))
    }

    /// Build a configuration from optional raw values, applying defaults.
    ///
    /// The auth client falls back to the main API URL when unset.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a provided value is not an HTTP(S) URL.
    pub fn from_values(api_url: Option<&str>, auth_api_url: Option<&str>) -> Result<Self, ConfigError> {
        let api_url = normalize_base("VITE_API_URL", non_blank(api_url).unwrap_or(DEFAULT_API_URL))?;
        let auth_api_url = match non_blank(auth_api_url) {
            Some(value) => normalize_base("VITE_AUTH_API_URL", value)?,
            None => api_url.clone(),
        };
        Ok(Self {
            api_url,
            auth_api_url,
        })
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn normalize_base(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let parsed = Url::parse(value).map_err(|err| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason: err.to_string(),
    })?;
    match parsed.scheme() {
        "http" | "https" => Ok(value.trim_end_matches('/').to_string()),
        other => Err(ConfigError::UnsupportedScheme {
            name,
            scheme: other.to_string(),
        }),
    }
}

/// Join a base URL and a request path with exactly one slash between them.
#[must_use]
pub fn join_url(base: &str, path: &str) -> String {
    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');
    if path.is_empty() {
        base.to_string()
    } else {
        format!("{base}/{path}")
    }
}

/// Log level captured at compile time from `DEALERDESK_LOG` (default `info`).
#[must_use]
pub fn log_level() -> LevelFilter {
    parse_level(option_env!("DEALERDESK_LOG"))
}

fn parse_level(raw: Option<&str>) -> LevelFilter {
    raw.and_then(|value| value.trim().parse::<LevelFilter>().ok())
        .unwrap_or(LevelFilter::INFO)
}

/// Default location of the virtual office button script.
pub const DEFAULT_WIDGET_URL: &str = "http://dev.myautohouse.eu/virtual-office-button/widget.js";

/// Virtual office button script URL from `VITE_WIDGET_URL` at compile time.
#[must_use]
pub fn widget_url() -> &'static str {
    non_blank(option_env!("VITE_WIDGET_URL")).unwrap_or(DEFAULT_WIDGET_URL)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_unset() {
        let config = ApiConfig::from_values(None, Some("  ")).expect("defaults are valid");
        assert_eq!(config, ApiConfig::default());
    }

    #[test]
    fn auth_url_falls_back_to_api_url() {
        let config =
            ApiConfig::from_values(Some("https://api.example.com/v1/"), None).expect("valid");
        assert_eq!(config.api_url, "https://api.example.com/v1");
        assert_eq!(config.auth_api_url, "https://api.example.com/v1");
    }

    #[test]
    fn invalid_urls_are_rejected() {
        let err = ApiConfig::from_values(Some("not a url"), None).expect_err("invalid");
        assert!(matches!(err, ConfigError::InvalidUrl { name: "VITE_API_URL", .. }));

        let err = ApiConfig::from_values(None, Some("ftp://files.example.com")).expect_err("scheme");
        assert_eq!(
            err,
            ConfigError::UnsupportedScheme {
                name: "VITE_AUTH_API_URL",
                scheme: "ftp".to_string(),
            }
        );
    }

    #[test]
    fn join_url_normalizes_slashes() {
        assert_eq!(join_url("http://h/", "/companies"), "http://h/companies");
        assert_eq!(join_url("http://h", "companies/1"), "http://h/companies/1");
        assert_eq!(join_url("http://h/", ""), "http://h");
    }

    #[test]
    fn widget_url_is_an_http_address() {
        assert!(widget_url().starts_with("http"));
        assert!(DEFAULT_WIDGET_URL.ends_with("/widget.js"));
    }

    #[test]
    fn log_level_parses_or_defaults() {
        assert_eq!(parse_level(Some("debug")), LevelFilter::DEBUG);
        assert_eq!(parse_level(Some("bogus")), LevelFilter::INFO);
        assert_eq!(parse_level(None), LevelFilter::INFO);
    }
}
