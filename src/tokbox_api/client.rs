use crate::tokbox_api::config::{ClientConfig, Credentials};
use crate::tokbox_api::resources::{Archive, ArchiveList, ArchiveMode, OutputMode, Session};
use crate::tokbox_api::token::{
    build_bearer_token, build_client_token_with, ClientTokenOptions,
};
use crate::tokbox_api::types::{ApiError, TokboxError};
use reqwest::header::ACCEPT;
use reqwest::Method;
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

/// HTTP client for the TokBox REST API
///
/// Holds the project credentials and configuration, both immutable after
/// construction. Cloning is cheap and clones share the same credentials, so a
/// single client can be used from many tasks at once.
#[derive(Debug, Clone)]
pub struct TokboxClient {
    credentials: Arc<Credentials>,
    config: Arc<ClientConfig>,
    /// HTTP client for making requests
    client: reqwest::Client,
}

/// Request payload for session creation
#[derive(Debug, Serialize)]
struct CreateSessionRequest {
    #[serde(rename = "archiveMode")]
    archive_mode: ArchiveMode,
}

/// Request payload for starting an archive
#[derive(Debug, Serialize)]
struct StartArchiveRequest<'a> {
    #[serde(rename = "sessionId")]
    session_id: &'a str,
    name: &'a str,
    #[serde(rename = "outputMode")]
    output_mode: OutputMode,
}

impl TokboxClient {
    /// Create a client for the production API
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tokbox_sdk::TokboxClient;
    ///
    /// let client = TokboxClient::new("45822722", "project-secret");
    /// ```
    pub fn new(key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self::with_config(Credentials::new(key, secret), ClientConfig::default())
    }

    /// Create a client with explicit configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tokbox_sdk::{ClientConfig, Credentials, TokboxClient};
    ///
    /// let config = ClientConfig::new().with_base_url("http://localhost:8080");
    /// let client = TokboxClient::with_config(Credentials::new("45822722", "secret"), config);
    /// ```
    pub fn with_config(credentials: Credentials, config: ClientConfig) -> Self {
        tracing::debug!(
            "Creating TokboxClient for project {} with base URL: {}",
            credentials.key,
            config.base_url
        );

        Self {
            credentials: Arc::new(credentials),
            config: Arc::new(config),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from `TOKBOX_API_KEY`, `TOKBOX_API_SECRET` and the
    /// optional `TOKBOX_API_URL`
    pub fn from_env() -> Result<Self, TokboxError> {
        Ok(Self::with_config(
            Credentials::from_env()?,
            ClientConfig::from_env(),
        ))
    }

    /// Use a preconfigured HTTP client (timeouts, proxies, ...)
    ///
    /// The SDK sets no timeout of its own.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// The project API key
    pub fn key(&self) -> &str {
        &self.credentials.key
    }

    /// The active configuration
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Mint a fresh bearer token for this project
    pub fn bearer_token(&self) -> Result<String, TokboxError> {
        build_bearer_token(
            &self.credentials.key,
            self.credentials.secret.expose_secret(),
            self.config.bearer_token_ttl,
        )
    }

    /// Build a publisher client token for `session_id`, valid for the
    /// configured client token lifetime
    pub fn client_token(&self, session_id: &str) -> Result<String, TokboxError> {
        let options = ClientTokenOptions::new()
            .with_expire_in(self.config.client_token_ttl)
            .with_sentinel(self.config.token_sentinel.clone());
        self.client_token_with(session_id, &options)
    }

    /// Build a client token for `session_id` with explicit options
    pub fn client_token_with(
        &self,
        session_id: &str,
        options: &ClientTokenOptions,
    ) -> Result<String, TokboxError> {
        build_client_token_with(
            session_id,
            &self.credentials.key,
            self.credentials.secret.expose_secret(),
            options,
        )
    }

    /// Create a manually archived session
    ///
    /// # Example
    ///
    /// ```no_run
    /// use tokbox_sdk::TokboxClient;
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = TokboxClient::new("45822722", "project-secret");
    /// let session = client.create_session().await?;
    /// let token = client.client_token(&session.id)?;
    /// println!("Join {} with {}", session.id, token);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn create_session(&self) -> Result<Session, TokboxError> {
        self.create_session_with(ArchiveMode::Manual).await
    }

    /// Create a session with the given archive mode
    ///
    /// The platform answers with a list even for a single session; any
    /// length other than one is reported as
    /// [`TokboxError::UnexpectedResponseShape`].
    ///
    /// # Arguments
    ///
    /// * `archive_mode` - `Manual` to start archives explicitly, `Always` to
    ///   have the platform record every session automatically
    ///
    /// # Returns
    ///
    /// Returns `Ok(Session)` with the platform-assigned session id, or
    /// `Err(TokboxError)` if the request fails or the response is not a
    /// one-element list.
    pub async fn create_session_with(
        &self,
        archive_mode: ArchiveMode,
    ) -> Result<Session, TokboxError> {
        let url = format!("{}/session/create", self.config.base_url);
        let payload = CreateSessionRequest { archive_mode };

        let sessions: Vec<Session> = self.execute(Method::POST, &url, Some(&payload)).await?;

        let session = match <[Session; 1]>::try_from(sessions) {
            Ok([session]) => session,
            Err(sessions) => {
                tracing::error!(
                    "Session creation returned {} sessions, expected exactly 1",
                    sessions.len()
                );
                return Err(TokboxError::UnexpectedResponseShape(format!(
                    "expected exactly 1 session, got {}",
                    sessions.len()
                )));
            }
        };

        tracing::info!("Session created: session_id={}", session.id);
        Ok(session)
    }

    /// List the archives recorded for `session_id`
    pub async fn archives(&self, session_id: &str) -> Result<Vec<Archive>, TokboxError> {
        let mut url = self.archive_url(&[])?;
        url.query_pairs_mut().append_pair("sessionId", session_id);

        let list: ArchiveList = self
            .execute(Method::GET, url.as_str(), None::<&()>)
            .await?;

        tracing::debug!(
            "Listed {} archives for session {} (count={})",
            list.items.len(),
            session_id,
            list.count
        );
        Ok(list.items)
    }

    /// Start a composed archive of `session_id`
    pub async fn start_archive(&self, session_id: &str, name: &str) -> Result<Archive, TokboxError> {
        self.start_archive_with(session_id, name, OutputMode::Composed)
            .await
    }

    /// Start an archive of `session_id` with the given output mode
    ///
    /// # Arguments
    ///
    /// * `session_id` - The session to record; it must have connected clients
    /// * `name` - Name stored with the archive
    /// * `output_mode` - `Composed` for a single mixed file, `Individual` for
    ///   one file per stream
    ///
    /// # Returns
    ///
    /// Returns `Ok(Archive)` with the archive snapshot (normally in the
    /// "started" state), or `Err(TokboxError)` if the platform refuses or the
    /// response cannot be decoded.
    pub async fn start_archive_with(
        &self,
        session_id: &str,
        name: &str,
        output_mode: OutputMode,
    ) -> Result<Archive, TokboxError> {
        let url = self.archive_url(&[""])?;
        let payload = StartArchiveRequest {
            session_id,
            name,
            output_mode,
        };

        let archive: Archive = self
            .execute(Method::POST, url.as_str(), Some(&payload))
            .await?;

        tracing::info!(
            "Archive started: archive_id={}, session_id={}, status={}",
            archive.id,
            session_id,
            archive.status
        );
        Ok(archive)
    }

    /// Stop the archive `archive_id`
    pub async fn stop_archive(&self, archive_id: &str) -> Result<Archive, TokboxError> {
        let url = self.archive_url(&[archive_id, "stop", ""])?;

        let archive: Archive = self
            .execute(Method::POST, url.as_str(), None::<&()>)
            .await?;

        tracing::info!(
            "Archive stopped: archive_id={}, status={}",
            archive.id,
            archive.status
        );
        Ok(archive)
    }

    /// Perform one authenticated request and decode the JSON response
    ///
    /// A new bearer token is attached to every call. Error statuses (>= 400)
    /// are decoded into [`ApiError`]; the request is attempted exactly once.
    ///
    /// # Arguments
    ///
    /// * `method` - HTTP method
    /// * `url` - Fully qualified target URL
    /// * `body` - Optional value sent as a JSON body; when present the
    ///   request also carries `Content-Type: application/json`
    ///
    /// # Returns
    ///
    /// Returns `Ok(T)` decoded from the response body, or:
    ///
    /// * `TokboxError::Signing` if the bearer token cannot be signed
    /// * `TokboxError::Transport` if the request or body read fails
    /// * `TokboxError::Api` for an error status with a JSON error body
    /// * `TokboxError::MalformedErrorBody` for an error status with any
    ///   other body
    /// * `TokboxError::Decode` if a success body does not match `T`
    ///
    /// # Example
    ///
    /// ```no_run
    /// use reqwest::Method;
    /// use tokbox_sdk::{ArchiveList, TokboxClient};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let client = TokboxClient::new("45822722", "project-secret");
    /// let url = "https://api.opentok.com/v2/project/45822722/archive?sessionId=abc";
    /// let list: ArchiveList = client.execute(Method::GET, url, None::<&()>).await?;
    /// println!("{} archives", list.count);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn execute<B, T>(
        &self,
        method: Method,
        url: &str,
        body: Option<&B>,
    ) -> Result<T, TokboxError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let token = self.bearer_token().map_err(|e| {
            tracing::error!("Failed to sign bearer token: {}", e);
            e
        })?;
        tracing::debug!("Sending {} request to: {} (token length: {})", method, url, token.len());

        let mut request = self
            .client
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(self.config.auth_header.as_str(), token);
        if let Some(body) = body {
            // Also sets Content-Type: application/json
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to send request to {}: {}", url, e);
            TokboxError::Transport(e)
        })?;

        let status = response.status();
        tracing::debug!("Received response with status: {}", status);

        let response_text = response.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            TokboxError::Transport(e)
        })?;

        if is_error_status(status.as_u16()) {
            return Err(parse_error(status.as_u16(), response_text));
        }

        serde_json::from_str(&response_text).map_err(|source| {
            tracing::error!(
                "Failed to parse response: {} - Response body: {}",
                source,
                response_text
            );
            TokboxError::Decode {
                source,
                body: response_text,
            }
        })
    }

    /// Project archive endpoint with `segments` appended, each percent-encoded
    fn archive_url(&self, segments: &[&str]) -> Result<url::Url, TokboxError> {
        let base = format!(
            "{}/{}/project/{}/archive",
            self.config.base_url, self.config.api_version, self.credentials.key
        );
        let mut url = url::Url::parse(&base)
            .map_err(|e| TokboxError::Config(format!("Invalid base URL: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| TokboxError::Config(format!("Base URL cannot have a path: {}", base)))?
            .extend(segments);
        Ok(url)
    }
}

/// Any status from 400 up is an error, including non-standard codes above 599
fn is_error_status(status: u16) -> bool {
    status >= 400
}

/// Translate an error response into a typed error
fn parse_error(status: u16, body: String) -> TokboxError {
    match ApiError::from_body(status, &body) {
        Ok(api_error) => {
            tracing::error!(
                "API request failed: HTTP {} - {} (code {})",
                status,
                api_error.message,
                api_error.code
            );
            TokboxError::Api(api_error)
        }
        Err(_) => {
            tracing::error!("API request failed: HTTP {} - unparseable body: {}", status, body);
            TokboxError::MalformedErrorBody { status, body }
        }
    }
}
