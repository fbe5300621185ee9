//! Asset API transport authenticated with the short-lived upload token.
//!
//! The token comes from the management API's upload-token exchange and is
//! kept in an [`AuthSession`]. When the asset API rejects the token, the
//! transport invalidates it, fetches a new one and replays the call once.
//! A second rejection of the same call is fatal.

use reqwest::Method;
use reqwest::header::AUTHORIZATION;
use serde::Serialize;
use tracing::{debug, warn};

use pagesync_protocol::constants::REQUEST_TIMEOUT;

use crate::api::{ApiClient, decode_response, user_agent};
use crate::credentials::bearer;
use crate::error::ClientError;
use crate::session::AuthSession;

/// One initial attempt plus one replay after re-authentication.
const MAX_ATTEMPTS: usize = 2;

/// Sends asset API calls for one project under the upload token.
pub struct AuthenticatingTransport {
    api: ApiClient,
    http: reqwest::Client,
    project: String,
    session: AuthSession,
}

impl AuthenticatingTransport {
    /// Creates a transport for `project`. No token is fetched until the
    /// first call.
    pub fn new(api: ApiClient, project: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            api,
            http,
            project: project.into(),
            session: AuthSession::new(),
        })
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn project(&self) -> &str {
        &self.project
    }

    pub fn session(&self) -> &AuthSession {
        &self.session
    }

    /// Sends one call, re-authenticating at most once on rejection.
    pub async fn send<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<serde_json::Value, ClientError> {
        let mut last_rejection = String::new();

        for attempt in 1..=MAX_ATTEMPTS {
            let token = self.session.token(|| self.acquire_token()).await?;

            match self.send_once(method.clone(), path, body, &token).await {
                Err(ClientError::Unauthorized { status, message }) => {
                    warn!(path, attempt, status, "upload token rejected");
                    self.session.invalidate(&token).await;
                    last_rejection = format!("{status}: {message}");
                }
                other => return other,
            }
        }

        Err(ClientError::Auth(format!(
            "upload token rejected after re-authentication on {path} ({last_rejection})"
        )))
    }

    async fn send_once<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        token: &str,
    ) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}{}", self.api.base_url(), path);
        let mut req = self
            .http
            .request(method, &url)
            .header(AUTHORIZATION, bearer(token)?);
        if let Some(body) = body {
            req = req.json(body);
        }

        debug!(path, "asset API call");
        decode_response(req.send().await?).await
    }

    /// Runs the upload-token exchange; any failure counts as an auth error.
    async fn acquire_token(&self) -> Result<String, ClientError> {
        match self.api.upload_token(&self.project).await {
            Ok(token) => Ok(token),
            Err(e @ ClientError::Auth(_)) => Err(e),
            Err(e) => Err(ClientError::Auth(format!(
                "fetching upload token for project {}: {e}",
                self.project
            ))),
        }
    }
}
