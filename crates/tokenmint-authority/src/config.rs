//! Signing authority client configuration.
//!
//! Defaults point at a locally running authority. Override via environment
//! variables or explicit construction.

use url::Url;
use zeroize::Zeroizing;

/// Configuration for connecting to the signing authority.
///
/// Custom `Debug` implementation redacts the `api_token` field.
#[derive(Clone)]
pub struct AuthorityConfig {
    /// Base URL of the authority, e.g. `http://challenge-bypass:2416`.
    pub base_url: Url,
    /// Bearer token for API authentication. Zeroized on drop.
    pub api_token: Zeroizing<String>,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl std::fmt::Debug for AuthorityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorityConfig")
            .field("base_url", &self.base_url)
            .field("api_token", &"[REDACTED]")
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl AuthorityConfig {
    /// Load configuration from environment variables.
    ///
    /// Variables:
    /// - `CHALLENGE_BYPASS_SERVER` (default: `http://127.0.0.1:2416`)
    /// - `CHALLENGE_BYPASS_TOKEN` (required)
    /// - `CHALLENGE_BYPASS_TIMEOUT_SECS` (default: 10)
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_token =
            std::env::var("CHALLENGE_BYPASS_TOKEN").map_err(|_| ConfigError::MissingToken)?;

        Ok(Self {
            base_url: env_url("CHALLENGE_BYPASS_SERVER", "http://127.0.0.1:2416")?,
            api_token: Zeroizing::new(api_token),
            timeout_secs: std::env::var("CHALLENGE_BYPASS_TIMEOUT_SECS")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(10),
        })
    }

    /// Configuration for an authority stub listening on localhost.
    pub fn local_mock(port: u16, token: &str) -> Result<Self, ConfigError> {
        let base_url = Url::parse(&format!("http://127.0.0.1:{port}"))
            .map_err(|e| ConfigError::InvalidUrl("localhost".to_string(), e.to_string()))?;
        Ok(Self {
            base_url,
            api_token: Zeroizing::new(token.to_string()),
            timeout_secs: 5,
        })
    }
}

fn env_url(var: &str, default: &str) -> Result<Url, ConfigError> {
    let raw = std::env::var(var).unwrap_or_else(|_| default.to_string());
    let url = Url::parse(&raw).map_err(|e| ConfigError::InvalidUrl(var.to_string(), e.to_string()))?;
    if url.cannot_be_a_base() {
        return Err(ConfigError::InvalidUrl(
            var.to_string(),
            "URL cannot carry a path".to_string(),
        ));
    }
    Ok(url)
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("CHALLENGE_BYPASS_TOKEN environment variable is required")]
    MissingToken,
    #[error("CHALLENGE_BYPASS_TOKEN is not a valid HTTP header value")]
    InvalidToken,
    #[error("invalid URL for {0}: {1}")]
    InvalidUrl(String, String),
}
