//! Signing primitives shared by both token schemes.
//!
//! The legacy client token is signed with HMAC-SHA1 (hex encoded), the
//! REST API bearer token is an HS256 JWT.

use crate::tokbox_api::types::TokboxError;
use hmac::{Hmac, Mac};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Claims carried by the REST API bearer token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BearerClaims {
    /// Issuer - the project API key
    pub iss: String,
    /// Issuer type, always "project" for API key credentials
    pub ist: String,
    /// Issued at (Unix timestamp, seconds)
    pub iat: i64,
    /// Expiration time (Unix timestamp, seconds)
    pub exp: i64,
    /// Unique token id
    pub jti: String,
}

/// Compute the lowercase hex HMAC-SHA1 of `payload` keyed by `secret`.
///
/// # Example
///
/// ```
/// use tokbox_sdk::hmac_sign;
///
/// let sig = hmac_sign("what do ya want for nothing?", "Jefe").unwrap();
/// assert_eq!(sig, "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79");
/// ```
pub fn hmac_sign(payload: &str, secret: &str) -> Result<String, TokboxError> {
    let mut mac = HmacSha1::new_from_slice(secret.as_bytes())
        .map_err(|e| TokboxError::Signing(e.to_string()))?;
    mac.update(payload.as_bytes());
    Ok(hex::encode(mac.finalize().into_bytes()))
}

/// Sign `claims` as an HS256 JWT with `secret`.
pub fn sign_claims(claims: &BearerClaims, secret: &str) -> Result<String, TokboxError> {
    let token = encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )?;
    Ok(token)
}
