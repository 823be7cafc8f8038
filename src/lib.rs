//! TokBox SDK
//!
//! A Rust library for the TokBox (OpenTok) REST API.
//!
//! This SDK provides:
//! - Session creation
//! - Archive lifecycle management (start, stop, list)
//! - Legacy `T1==` client tokens (HMAC-SHA1) for end-user clients
//! - Per-request HS256 bearer tokens for the REST API
//! - Typed errors that expose the platform's error code and message
//!
//! # Example
//!
//! ```no_run
//! use tokbox_sdk::{TokboxClient, TokboxError};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = TokboxClient::new("45822722", "project-secret");
//!
//! // Create a session and a token a browser client can join with
//! let session = client.create_session().await?;
//! let token = client.client_token(&session.id)?;
//! println!("Join {} with {}", session.id, token);
//!
//! // Record it
//! let archive = client.start_archive(&session.id, "standup").await?;
//! match client.stop_archive(&archive.id).await {
//!     Ok(archive) => println!("Archive {} is {}", archive.id, archive.status),
//!     Err(TokboxError::Api(err)) => println!("Platform refused ({}): {}", err.code, err.message),
//!     Err(e) => return Err(e.into()),
//! }
//! # Ok(())
//! # }
//! ```

pub mod tokbox_api;

// Re-export commonly used types and functions
pub use tokbox_api::{
    client::TokboxClient,
    config::{ClientConfig, Credentials},
    resources::{Archive, ArchiveList, ArchiveMode, OutputMode, Role, Session},
    signer::{hmac_sign, sign_claims, BearerClaims},
    token::{build_bearer_token, build_client_token, build_client_token_with, ClientTokenOptions},
    types::{ApiError, TokboxError},
};
