//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `EASYKART_API_URL` - Base URL of the remote catalog/cart API
//!
//! ## Optional
//! - `EASYKART_API_TOKEN` - Bearer token sent to the remote API
//! - `EASYKART_HOST` - Bind address (default: 127.0.0.1)
//! - `EASYKART_PORT` - Listen port (default: 3000)
//! - `EASYKART_SHIPPING` - Flat shipping charge (default: 5.55)
//! - `EASYKART_TAXES` - Flat tax charge (default: 5)
//! - `EASYKART_ITEMS_PER_PAGE` - Listing page size (default: 12)
//! - `EASYKART_CATALOG_TTL_SECS` - Category/brand cache lifetime (default: 300)
//! - `EASYKART_SESSION_IDLE_SECS` - Idle time before a shopper's state is dropped (default: 1800)
//! - `EASYKART_LOG_FORMAT` - `json` for structured logs, anything else for text
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name

use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

use easy_kart_core::Price;
use easy_kart_core::pagination::ITEMS_PER_PAGE;
use easy_kart_core::totals::Charges;
use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Remote API configuration
    pub api: ApiConfig,
    /// Flat shipping and tax charges
    pub charges: Charges,
    /// Listing page size
    pub items_per_page: u32,
    /// How long an idle shopper's state is kept
    pub session_idle: Duration,
    /// Emit JSON logs instead of text
    pub json_logs: bool,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment name
    pub sentry_environment: Option<String>,
}

/// Remote API configuration.
///
/// Implements `Debug` manually to redact the token.
#[derive(Clone)]
pub struct ApiConfig {
    /// Base URL, always ending in `/`
    pub base_url: Url,
    /// Optional bearer token
    pub token: Option<SecretString>,
    /// Lifetime of cached categories and brands
    pub catalog_ttl: Duration,
}

impl std::fmt::Debug for ApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("catalog_ttl", &self.catalog_ttl)
            .finish()
    }
}

impl ApiConfig {
    /// Build an API configuration, normalising the base URL.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `base_url` is not an absolute
    /// http(s) URL.
    pub fn new(
        base_url: &str,
        token: Option<SecretString>,
        catalog_ttl: Duration,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: parse_base_url(base_url)?,
            token,
            catalog_ttl,
        })
    }
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = parse_env::<IpAddr>("EASYKART_HOST", "127.0.0.1")?;
        let port = parse_env::<u16>("EASYKART_PORT", "3000")?;

        let api = ApiConfig::new(
            &get_required_env("EASYKART_API_URL")?,
            get_optional_env("EASYKART_API_TOKEN").map(SecretString::from),
            Duration::from_secs(parse_env("EASYKART_CATALOG_TTL_SECS", "300")?),
        )?;

        let charges = Charges {
            shipping: parse_price("EASYKART_SHIPPING", "5.55")?,
            taxes: parse_price("EASYKART_TAXES", "5")?,
        };

        let items_per_page =
            parse_env::<u32>("EASYKART_ITEMS_PER_PAGE", &ITEMS_PER_PAGE.to_string())?;
        if items_per_page == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "EASYKART_ITEMS_PER_PAGE".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let session_idle = Duration::from_secs(parse_env("EASYKART_SESSION_IDLE_SECS", "1800")?);
        let json_logs = get_optional_env("EASYKART_LOG_FORMAT").is_some_and(|f| f == "json");

        Ok(Self {
            host,
            port,
            api,
            charges,
            items_per_page,
            session_idle,
            json_logs,
            sentry_dsn: get_optional_env("SENTRY_DSN"),
            sentry_environment: get_optional_env("SENTRY_ENVIRONMENT"),
        })
    }

    /// Configuration pointing at `api_url` with every other setting at its default.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if `api_url` is not a valid base URL.
    pub fn with_api_url(api_url: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            api: ApiConfig::new(api_url, None, Duration::from_secs(300))?,
            charges: Charges::default(),
            items_per_page: ITEMS_PER_PAGE,
            session_idle: Duration::from_secs(1800),
            json_logs: false,
            sentry_dsn: None,
            sentry_environment: None,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable, treating empty values as unset.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an environment variable, falling back to `default` when unset.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let raw = get_optional_env(key).unwrap_or_else(|| default.to_string());
    raw.parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Parse a non-negative money amount.
fn parse_price(key: &str, default: &str) -> Result<Price, ConfigError> {
    let amount: Decimal = parse_env(key, default)?;
    if amount.is_sign_negative() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            "must not be negative".to_string(),
        ));
    }
    Ok(Price::new(amount))
}

/// Parse the API base URL so that relative endpoint paths join under it.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidEnvVar("EASYKART_API_URL".to_string(), msg);

    let mut url = Url::parse(raw).map_err(|e| invalid(e.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_gets_trailing_slash() {
        let url = parse_base_url("http://localhost:8000/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/");
        assert_eq!(
            url.join("products").unwrap().as_str(),
            "http://localhost:8000/api/products"
        );
    }

    #[test]
    fn test_base_url_root() {
        let url = parse_base_url("https://api.example.com").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/");
    }

    #[test]
    fn test_base_url_rejects_other_schemes() {
        let err = parse_base_url("ftp://example.com").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(_, _)));
        assert!(parse_base_url("not a url").is_err());
    }

    #[test]
    fn test_parse_price_default() {
        let price = parse_price("EASYKART_TEST_UNSET_PRICE", "5.55").unwrap();
        assert_eq!(price, Price::from_cents(555));
    }

    #[test]
    fn test_parse_env_reports_key() {
        let err = parse_env::<u16>("EASYKART_TEST_UNSET_PORT", "not-a-port").unwrap_err();
        assert!(err.to_string().contains("EASYKART_TEST_UNSET_PORT"));
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig::with_api_url("http://localhost:8000").unwrap();

        let addr = config.socket_addr();
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
        assert_eq!(addr.port(), 3000);
    }

    #[test]
    fn test_api_config_debug_redacts_token() {
        let config = ApiConfig::new(
            "http://localhost:8000",
            Some(SecretString::from("super_secret_api_token")),
            Duration::from_secs(60),
        )
        .unwrap();

        let debug_output = format!("{config:?}");

        assert!(debug_output.contains("localhost:8000"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("super_secret_api_token"));
    }
}
