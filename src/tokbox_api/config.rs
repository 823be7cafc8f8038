use crate::tokbox_api::types::TokboxError;
use secrecy::SecretString;
use std::time::Duration;

/// Default REST API endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.opentok.com";
/// Default REST API version path segment
pub const DEFAULT_API_VERSION: &str = "v2";
/// Prefix of every legacy client token
pub const DEFAULT_TOKEN_SENTINEL: &str = "T1==";
/// Header carrying the bearer token
pub const DEFAULT_AUTH_HEADER: &str = "X-OPENTOK-AUTH";
/// Bearer token validity (48 hours)
pub const DEFAULT_BEARER_TOKEN_TTL: Duration = Duration::from_secs(2 * 24 * 60 * 60);
/// Legacy client token validity (1 hour)
pub const DEFAULT_CLIENT_TOKEN_TTL: Duration = Duration::from_secs(60 * 60);

/// Environment variable holding the project API key
pub const ENV_API_KEY: &str = "TOKBOX_API_KEY";
/// Environment variable holding the project API secret
pub const ENV_API_SECRET: &str = "TOKBOX_API_SECRET";
/// Environment variable overriding the REST API endpoint
pub const ENV_API_URL: &str = "TOKBOX_API_URL";

/// Client configuration
///
/// Immutable once handed to a [`TokboxClient`](crate::TokboxClient). Use the
/// builder-style setters to point the client at another endpoint, e.g. a
/// mock server in tests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL of the REST API, without trailing slash
    pub base_url: String,
    /// API version path segment used by the project endpoints
    pub api_version: String,
    /// Literal prefix of legacy client tokens
    pub token_sentinel: String,
    /// Name of the header carrying the bearer token
    pub auth_header: String,
    /// Lifetime of a bearer token
    pub bearer_token_ttl: Duration,
    /// Lifetime of a legacy client token
    pub client_token_ttl: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            token_sentinel: DEFAULT_TOKEN_SENTINEL.to_string(),
            auth_header: DEFAULT_AUTH_HEADER.to_string(),
            bearer_token_ttl: DEFAULT_BEARER_TOKEN_TTL,
            client_token_ttl: DEFAULT_CLIENT_TOKEN_TTL,
        }
    }
}

impl ClientConfig {
    /// Create a new ClientConfig with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Default configuration with `TOKBOX_API_URL` applied when set
    pub fn from_env() -> Self {
        let config = Self::default();
        match std::env::var(ENV_API_URL) {
            Ok(url) if !url.trim().is_empty() => {
                tracing::debug!("Using API base URL from {}: {}", ENV_API_URL, url);
                config.with_base_url(url)
            }
            _ => config,
        }
    }

    /// Set the API base URL (builder pattern)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the API version segment (builder pattern)
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Set the client token sentinel (builder pattern)
    pub fn with_token_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.token_sentinel = sentinel.into();
        self
    }

    /// Set the auth header name (builder pattern)
    pub fn with_auth_header(mut self, header: impl Into<String>) -> Self {
        self.auth_header = header.into();
        self
    }

    /// Set the bearer token lifetime (builder pattern)
    pub fn with_bearer_token_ttl(mut self, ttl: Duration) -> Self {
        self.bearer_token_ttl = ttl;
        self
    }

    /// Set the client token lifetime (builder pattern)
    pub fn with_client_token_ttl(mut self, ttl: Duration) -> Self {
        self.client_token_ttl = ttl;
        self
    }
}

/// Project API key and secret
pub struct Credentials {
    pub(crate) key: String,
    pub(crate) secret: SecretString,
}

impl Credentials {
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            secret: SecretString::from(secret.into()),
        }
    }

    /// Read `TOKBOX_API_KEY` and `TOKBOX_API_SECRET`
    pub fn from_env() -> Result<Self, TokboxError> {
        let key = required_env(ENV_API_KEY)?;
        let secret = required_env(ENV_API_SECRET)?;
        Ok(Self::new(key, secret))
    }

    /// The project API key
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("key", &self.key)
            .field("secret", &"[REDACTED]")
            .finish()
    }
}

fn required_env(name: &str) -> Result<String, TokboxError> {
    match std::env::var(name) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(TokboxError::Config(format!(
            "Missing required environment variable {}",
            name
        ))),
    }
}
