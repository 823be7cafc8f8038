/// TokBox REST API integration module
///
/// This module provides the token signing schemes and the HTTP client for
/// the TokBox (OpenTok) REST API.
///
/// ## Request Flow
///
/// 1. A facade operation (e.g. `start_archive`) builds the endpoint URL
/// 2. `TokboxClient::execute` mints a fresh HS256 bearer token
/// 3. The request is sent once with `Accept: application/json` and the token
///    in the `X-OPENTOK-AUTH` header
/// 4. Success bodies are decoded into the target type, error bodies into
///    `ApiError`
pub mod client;
pub mod config;
pub mod resources;
pub mod signer;
pub mod token;
pub mod types;

pub use client::TokboxClient;
pub use config::{ClientConfig, Credentials};
pub use resources::*;
pub use signer::{hmac_sign, sign_claims, BearerClaims};
pub use token::{build_bearer_token, build_client_token, build_client_token_with, ClientTokenOptions};
pub use types::{ApiError, TokboxError};
