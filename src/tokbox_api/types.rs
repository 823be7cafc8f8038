use serde::{Deserialize, Serialize};
use thiserror::Error;

/// TokBox SDK error type
///
/// Represents all possible errors that can occur when signing tokens for,
/// or talking to, the TokBox REST API. Every error is returned to the caller
/// of the operation that produced it; nothing is retried internally.
#[derive(Debug, Error)]
pub enum TokboxError {
    /// Token signing failed (JWT encoding or HMAC key setup)
    #[error("Token signing failed: {0}")]
    Signing(String),
    /// The HTTP request could not be completed (DNS, connect, timeout, ...)
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),
    /// The platform answered with an error status and a well-formed error body
    #[error("API error: {0}")]
    Api(#[from] ApiError),
    /// The platform answered with an error status but the body is not JSON
    #[error("HTTP {status} error with malformed body: {body}")]
    MalformedErrorBody { status: u16, body: String },
    /// A successful response body did not match the expected JSON shape
    #[error("Failed to parse response JSON: {source} - Body: {body}")]
    Decode {
        #[source]
        source: serde_json::Error,
        body: String,
    },
    /// Valid JSON that breaks a documented invariant of the endpoint
    #[error("Unexpected response shape: {0}")]
    UnexpectedResponseShape(String),
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl TokboxError {
    /// Platform error code, if this is an [`ApiError`]
    pub fn api_code(&self) -> Option<i64> {
        match self {
            TokboxError::Api(err) => Some(err.code),
            _ => None,
        }
    }
}

impl From<jsonwebtoken::errors::Error> for TokboxError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        TokboxError::Signing(err.to_string())
    }
}

/// Error body returned by the TokBox REST API
///
/// Any response with status >= 400 is decoded into this shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message} (code {code})")]
pub struct ApiError {
    pub message: String,
    pub code: i64,
}

/// Wire shape of an error body; either field may be absent.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    #[serde(default)]
    code: Option<i64>,
}

impl ApiError {
    /// Decode an error response body, falling back to the HTTP status when
    /// the body carries no `code`.
    pub(crate) fn from_body(status: u16, body: &str) -> Result<Self, serde_json::Error> {
        let parsed: ErrorBody = serde_json::from_str(body)?;
        Ok(ApiError {
            message: parsed.message,
            code: parsed.code.unwrap_or(i64::from(status)),
        })
    }
}
