//! Cart controller configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Optional
//! - `STORECART_DATA_DIR` - Directory holding the local storage file (default: .storecart)
//! - `STORECART_STORAGE_KEY` - Storage key the cart is kept under (default: cart)
//! - `STORECART_API_BASE_URL` - Base URL of the remote cart API (default: <http://127.0.0.1:5000>)
//! - `STORECART_SESSION_COOKIE` - Session cookie (`name=value`) of a logged-in user.
//!   When set, the session is authenticated and the cart is mirrored remotely.
//! - `STORECART_HTTP_TIMEOUT_SECS` - Remote request timeout in seconds (default: 30)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::path::PathBuf;
use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::storage::DEFAULT_CART_KEY;

const DEFAULT_DATA_DIR: &str = ".storecart";
const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Cookie values that are placeholder text rather than a session
/// (case-insensitive, whole value)
const PLACEHOLDER_VALUES: &[&str] = &[
    "changeme",
    "change-me",
    "placeholder",
    "example",
    "xxx",
    "todo",
    "fixme",
    "your-session",
    "your-session-cookie",
    "put-your-session-here",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Top-level configuration.
#[derive(Debug, Clone)]
pub struct StorecartConfig {
    /// Directory of the local storage file
    pub data_dir: PathBuf,
    /// Key the serialized cart is stored under
    pub storage_key: String,
    /// Remote cart API configuration
    pub api: RemoteApiConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Remote cart API configuration.
///
/// Implements `Debug` manually to redact the session cookie.
#[derive(Clone)]
pub struct RemoteApiConfig {
    /// Base URL the `/api/cart` routes are resolved against
    pub base_url: Url,
    /// Session cookie of an authenticated user
    pub session_cookie: Option<SecretString>,
    /// Per-request timeout
    pub timeout: Duration,
}

impl std::fmt::Debug for RemoteApiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemoteApiConfig")
            .field("base_url", &self.base_url.as_str())
            .field(
                "session_cookie",
                &self.session_cookie.as_ref().map(|_| "[REDACTED]"),
            )
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RemoteApiConfig {
    /// Anonymous configuration pointing at `base_url`.
    #[must_use]
    pub const fn anonymous(base_url: Url) -> Self {
        Self {
            base_url,
            session_cookie: None,
            timeout: Duration::from_secs(DEFAULT_HTTP_TIMEOUT_SECS),
        }
    }

    /// Whether requests carry a logged-in session.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.session_cookie.is_some()
    }
}

impl StorecartConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is malformed or the session cookie
    /// looks like a placeholder.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Same as [`StorecartConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let data_dir = PathBuf::from(
            non_empty(lookup("STORECART_DATA_DIR")).unwrap_or_else(|| DEFAULT_DATA_DIR.into()),
        );
        let storage_key = non_empty(lookup("STORECART_STORAGE_KEY"))
            .unwrap_or_else(|| DEFAULT_CART_KEY.to_string());

        let base_url_raw = non_empty(lookup("STORECART_API_BASE_URL"))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let base_url = parse_base_url(&base_url_raw)?;

        let timeout_secs = match non_empty(lookup("STORECART_HTTP_TIMEOUT_SECS")) {
            Some(raw) => raw.parse::<u64>().map_err(|e| {
                ConfigError::InvalidEnvVar("STORECART_HTTP_TIMEOUT_SECS".to_string(), e.to_string())
            })?,
            None => DEFAULT_HTTP_TIMEOUT_SECS,
        };

        let session_cookie = match non_empty(lookup("STORECART_SESSION_COOKIE")) {
            Some(raw) => Some(validate_session_cookie(raw, "STORECART_SESSION_COOKIE")?),
            None => None,
        };

        Ok(Self {
            data_dir,
            storage_key,
            api: RemoteApiConfig {
                base_url,
                session_cookie,
                timeout: Duration::from_secs(timeout_secs),
            },
            sentry_dsn: non_empty(lookup("SENTRY_DSN")),
        })
    }

    /// Path of the local storage file.
    #[must_use]
    pub fn storage_path(&self) -> PathBuf {
        self.data_dir.join("local_storage.json")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Treat blank variables as unset.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse the API base URL, requiring http(s).
///
/// The path always ends in `/` so endpoint paths resolve beneath it.
fn parse_base_url(raw: &str) -> Result<Url, ConfigError> {
    let mut url = Url::parse(raw).map_err(|e| {
        ConfigError::InvalidEnvVar("STORECART_API_BASE_URL".to_string(), e.to_string())
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidEnvVar(
            "STORECART_API_BASE_URL".to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

/// Validate that a session cookie is `name=value` and not a placeholder.
fn validate_session_cookie(raw: String, var_name: &str) -> Result<SecretString, ConfigError> {
    let Some((name, value)) = raw.split_once('=') else {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "expected a cookie in name=value form".to_string(),
        ));
    };
    if name.trim().is_empty() || value.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar(
            var_name.to_string(),
            "cookie name and value must be non-empty".to_string(),
        ));
    }

    // Session values are opaque tokens; only reject ones that are nothing
    // but placeholder text.
    let lower = value.trim().to_lowercase();
    if PLACEHOLDER_VALUES.contains(&lower.as_str()) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder ('{lower}')"),
        ));
    }

    Ok(SecretString::from(raw))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<StorecartConfig, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        StorecartConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from(".storecart"));
        assert_eq!(config.storage_key, "cart");
        assert_eq!(config.api.base_url.as_str(), "http://127.0.0.1:5000/");
        assert_eq!(config.api.timeout, Duration::from_secs(30));
        assert!(!config.api.is_authenticated());
        assert!(config.sentry_dsn.is_none());
    }

    #[test]
    fn test_session_cookie_authenticates() {
        let config = load(&[("STORECART_SESSION_COOKIE", "session=9fK2xQ7pLm")]).unwrap();
        assert!(config.api.is_authenticated());
    }

    #[test]
    fn test_blank_cookie_is_anonymous() {
        let config = load(&[("STORECART_SESSION_COOKIE", "   ")]).unwrap();
        assert!(!config.api.is_authenticated());
    }

    #[test]
    fn test_cookie_without_value_rejected() {
        let result = load(&[("STORECART_SESSION_COOKIE", "session")]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_placeholder_cookie_rejected() {
        for value in ["session=changeme", "session=XXX", "session= Your-Session "] {
            let result = load(&[("STORECART_SESSION_COOKIE", value)]);
            assert!(
                matches!(result, Err(ConfigError::InsecureSecret(_, _))),
                "{value} accepted"
            );
        }
    }

    #[test]
    fn test_opaque_cookie_with_placeholder_substrings_accepted() {
        let config = load(&[(
            "STORECART_SESSION_COOKIE",
            "session=.eJwlzUEKwjAQQNG7zLoLSbOKXMIDeAEJMW1HmkyYTBEpvbuDrv_jvwPmyjn5S7Bx6wMXGa4P2Cxw8UnDUqQXz60wuzNR9mCpsK6rRPnEyxg2MbwtYX4EjX8pyWXXVRCBmUNvBfHsXfdGTfDwb3IyqZmP7d9UxwEqGm5y",
        )])
        .unwrap();
        assert!(config.api.is_authenticated());

        let config = load(&[("STORECART_SESSION_COOKIE", "session=a9XXXq1gTodoExample")]).unwrap();
        assert!(config.api.is_authenticated());
    }

    #[test]
    fn test_base_url_path_prefix_kept() {
        let config = load(&[("STORECART_API_BASE_URL", "http://shop.test/store")]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://shop.test/store/");
        assert_eq!(
            config.api.base_url.join("api/cart").unwrap().as_str(),
            "http://shop.test/store/api/cart"
        );

        let config = load(&[("STORECART_API_BASE_URL", "http://shop.test/store/")]).unwrap();
        assert_eq!(config.api.base_url.as_str(), "http://shop.test/store/");
    }

    #[test]
    fn test_invalid_base_url() {
        let result = load(&[("STORECART_API_BASE_URL", "not a url")]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));

        let result = load(&[("STORECART_API_BASE_URL", "ftp://shop.test")]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_invalid_timeout() {
        let result = load(&[("STORECART_HTTP_TIMEOUT_SECS", "soon")]);
        assert!(matches!(result, Err(ConfigError::InvalidEnvVar(_, _))));
    }

    #[test]
    fn test_debug_redacts_cookie() {
        let config = load(&[("STORECART_SESSION_COOKIE", "session=9fK2xQ7pLm")]).unwrap();
        let debug = format!("{:?}", config.api);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("9fK2xQ7pLm"));
    }

    #[test]
    fn test_storage_path() {
        let config = load(&[("STORECART_DATA_DIR", "/tmp/shop")]).unwrap();
        assert_eq!(
            config.storage_path(),
            PathBuf::from("/tmp/shop/local_storage.json")
        );
    }
}
