//! Token construction
//!
//! Two independent schemes:
//!
//! - **Client tokens** (legacy `T1==` format) are handed to end-user clients
//!   so they can join one session. They carry role, expiry and nonce and are
//!   signed with HMAC-SHA1.
//! - **Bearer tokens** are HS256 JWTs proving the project identity to the REST
//!   API. A new one is minted for every request and never cached.

use crate::tokbox_api::config::{DEFAULT_CLIENT_TOKEN_TTL, DEFAULT_TOKEN_SENTINEL};
use crate::tokbox_api::resources::Role;
use crate::tokbox_api::signer::{hmac_sign, sign_claims, BearerClaims};
use crate::tokbox_api::types::TokboxError;
use base64::{engine::general_purpose, Engine as _};
use rand::Rng;
use std::time::Duration;

/// Upper bound (exclusive) of the legacy token nonce
const NONCE_UPPER_BOUND: u32 = 999_999;

/// Issuer type claim for project-level credentials
const PROJECT_ISSUER_TYPE: &str = "project";

/// Options for a legacy client token
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientTokenOptions {
    /// Role granted to the connection
    pub role: Role,
    /// How long the token stays valid
    pub expire_in: Duration,
    /// Connection metadata; rendered as `None` when absent
    pub connection_data: Option<String>,
    /// Literal prefix of the token
    pub sentinel: String,
}

impl Default for ClientTokenOptions {
    fn default() -> Self {
        Self {
            role: Role::Publisher,
            expire_in: DEFAULT_CLIENT_TOKEN_TTL,
            connection_data: None,
            sentinel: DEFAULT_TOKEN_SENTINEL.to_string(),
        }
    }
}

impl ClientTokenOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the role (builder pattern)
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Set the validity window (builder pattern)
    pub fn with_expire_in(mut self, expire_in: Duration) -> Self {
        self.expire_in = expire_in;
        self
    }

    /// Set connection metadata (builder pattern)
    pub fn with_connection_data(mut self, data: impl Into<String>) -> Self {
        self.connection_data = Some(data.into());
        self
    }

    /// Set the token prefix (builder pattern)
    pub fn with_sentinel(mut self, sentinel: impl Into<String>) -> Self {
        self.sentinel = sentinel.into();
        self
    }
}

/// Build a legacy client token for `session_id`: publisher role, one hour
/// validity, no connection data.
///
/// # Example
///
/// ```
/// use tokbox_sdk::build_client_token;
///
/// let token = build_client_token("1_MX40NTgyMjcyMn4", "45822722", "secret").unwrap();
/// assert!(token.starts_with("T1=="));
/// ```
pub fn build_client_token(
    session_id: &str,
    key: &str,
    secret: &str,
) -> Result<String, TokboxError> {
    build_client_token_with(session_id, key, secret, &ClientTokenOptions::default())
}

/// Build a legacy client token with explicit options
pub fn build_client_token_with(
    session_id: &str,
    key: &str,
    secret: &str,
    options: &ClientTokenOptions,
) -> Result<String, TokboxError> {
    let now = chrono::Utc::now().timestamp();
    let expire = expiry_after(now, options.expire_in)?;
    let nonce = rand::thread_rng().gen_range(0..NONCE_UPPER_BOUND);

    let payload = format!(
        "create_time={}&session_id={}&nonce={}&expire_time={}&connection_data={}&role={}",
        now,
        session_id,
        nonce,
        expire,
        options.connection_data.as_deref().unwrap_or("None"),
        options.role,
    );
    let signature = hmac_sign(&payload, secret)?;
    let raw = format!("partner_id={}&sig={}:{}", key, signature, payload);

    Ok(format!(
        "{}{}",
        options.sentinel,
        general_purpose::STANDARD.encode(raw.as_bytes())
    ))
}

/// Build a REST API bearer token valid for `ttl`
pub fn build_bearer_token(key: &str, secret: &str, ttl: Duration) -> Result<String, TokboxError> {
    let now = chrono::Utc::now().timestamp();
    let claims = BearerClaims {
        iss: key.to_string(),
        ist: PROJECT_ISSUER_TYPE.to_string(),
        iat: now,
        exp: expiry_after(now, ttl)?,
        jti: uuid::Uuid::new_v4().to_string(),
    };
    sign_claims(&claims, secret)
}

/// `now + ttl` in Unix seconds, rejecting lifetimes that do not fit in an i64
fn expiry_after(now: i64, ttl: Duration) -> Result<i64, TokboxError> {
    i64::try_from(ttl.as_secs())
        .ok()
        .and_then(|secs| now.checked_add(secs))
        .ok_or_else(|| {
            TokboxError::Signing(format!(
                "Token lifetime of {}s overflows the expiry timestamp",
                ttl.as_secs()
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokbox_api::config::DEFAULT_BEARER_TOKEN_TTL;
    use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
    use std::collections::HashMap;

    const TEST_KEY: &str = "45822722";
    const TEST_SECRET: &str = "362f8bfbb5fff2f960c72ee4b798fa7029f9a601";
    const TEST_SESSION: &str = "1_MX40NTgyMjcyMn5-MTUxNjI5OTQyMzM0OH4";

    /// Strip the sentinel and base64, split into (header, payload)
    fn unpack(token: &str) -> (String, String) {
        let encoded = token.strip_prefix("T1==").expect("missing sentinel");
        let decoded = general_purpose::STANDARD.decode(encoded).unwrap();
        let text = String::from_utf8(decoded).unwrap();
        let (header, payload) = text.split_once(':').unwrap();
        (header.to_string(), payload.to_string())
    }

    fn fields(query: &str) -> HashMap<String, String> {
        query
            .split('&')
            .filter_map(|pair| pair.split_once('='))
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_client_token_format() {
        let token = build_client_token(TEST_SESSION, TEST_KEY, TEST_SECRET).unwrap();
        assert!(token.starts_with("T1=="));

        let (header, payload) = unpack(&token);
        let header = fields(&header);
        assert_eq!(header["partner_id"], TEST_KEY);
        assert_eq!(header["sig"], hmac_sign(&payload, TEST_SECRET).unwrap());

        assert!(payload.starts_with("create_time="));
        assert!(payload.ends_with("&connection_data=None&role=publisher"));

        let payload = fields(&payload);
        assert_eq!(payload["session_id"], TEST_SESSION);
        let created: i64 = payload["create_time"].parse().unwrap();
        let expires: i64 = payload["expire_time"].parse().unwrap();
        assert_eq!(expires - created, 3600);
        let nonce: u32 = payload["nonce"].parse().unwrap();
        assert!(nonce < NONCE_UPPER_BOUND);
    }

    #[test]
    fn test_client_token_field_order() {
        let token = build_client_token(TEST_SESSION, TEST_KEY, TEST_SECRET).unwrap();
        let (_, payload) = unpack(&token);
        let keys: Vec<&str> = payload
            .split('&')
            .filter_map(|pair| pair.split_once('=').map(|(k, _)| k))
            .collect();
        assert_eq!(
            keys,
            vec![
                "create_time",
                "session_id",
                "nonce",
                "expire_time",
                "connection_data",
                "role"
            ]
        );
    }

    #[test]
    fn test_client_token_with_options() {
        let options = ClientTokenOptions::new()
            .with_role(Role::Moderator)
            .with_expire_in(Duration::from_secs(60))
            .with_connection_data("name=alice");
        let token = build_client_token_with(TEST_SESSION, TEST_KEY, TEST_SECRET, &options).unwrap();

        let (_, payload) = unpack(&token);
        assert!(payload.contains("&role=moderator"));
        assert!(payload.contains("&connection_data=name=alice&"));

        let created: i64 = fields(&payload)["create_time"].parse().unwrap();
        let expires: i64 = fields(&payload)["expire_time"].parse().unwrap();
        assert_eq!(expires - created, 60);
    }

    #[test]
    fn test_client_token_custom_sentinel() {
        let options = ClientTokenOptions::new().with_sentinel("T2==");
        let token = build_client_token_with(TEST_SESSION, TEST_KEY, TEST_SECRET, &options).unwrap();
        assert!(token.starts_with("T2=="));
    }

    #[test]
    fn test_bearer_token_claims() {
        let token = build_bearer_token(TEST_KEY, TEST_SECRET, DEFAULT_BEARER_TOKEN_TTL).unwrap();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[TEST_KEY]);
        let decoded = decode::<BearerClaims>(
            &token,
            &DecodingKey::from_secret(TEST_SECRET.as_bytes()),
            &validation,
        )
        .unwrap();

        let claims = decoded.claims;
        assert_eq!(claims.iss, TEST_KEY);
        assert_eq!(claims.ist, "project");
        assert_eq!(claims.exp - claims.iat, 172800);
        let jti = uuid::Uuid::parse_str(&claims.jti).unwrap();
        assert_eq!(jti.get_version_num(), 4);
    }

    #[test]
    fn test_expiry_after() {
        assert_eq!(expiry_after(1_000, Duration::from_secs(3600)).unwrap(), 4_600);
        assert!(matches!(
            expiry_after(1_000, Duration::from_secs(i64::MAX as u64)),
            Err(TokboxError::Signing(_))
        ));
        assert!(matches!(
            expiry_after(0, Duration::from_secs(u64::MAX)),
            Err(TokboxError::Signing(_))
        ));
    }

    #[test]
    fn test_oversized_lifetimes_are_rejected() {
        let err = build_bearer_token(TEST_KEY, TEST_SECRET, Duration::MAX).unwrap_err();
        assert!(err.to_string().contains("overflows"));

        let options = ClientTokenOptions::new().with_expire_in(Duration::from_secs(u64::MAX));
        let result = build_client_token_with(TEST_SESSION, TEST_KEY, TEST_SECRET, &options);
        assert!(matches!(result, Err(TokboxError::Signing(_))));
    }

    #[test]
    fn test_bearer_tokens_are_unique() {
        let first = build_bearer_token(TEST_KEY, TEST_SECRET, DEFAULT_BEARER_TOKEN_TTL).unwrap();
        let second = build_bearer_token(TEST_KEY, TEST_SECRET, DEFAULT_BEARER_TOKEN_TTL).unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_tokens_unique_across_threads() {
        let handles: Vec<_> = (0..8)
            .map(|_| {
                std::thread::spawn(|| {
                    build_bearer_token(TEST_KEY, TEST_SECRET, DEFAULT_BEARER_TOKEN_TTL).unwrap()
                })
            })
            .collect();
        let mut tokens: Vec<String> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        tokens.sort();
        tokens.dedup();
        assert_eq!(tokens.len(), 8);
    }
}
