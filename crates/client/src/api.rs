//! Management API client.
//!
//! Async HTTP client using `reqwest`, authenticated with the account
//! credentials. Only the calls the asset sync needs are exposed: the
//! upload-token exchange and the project existence probe.

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::debug;

use pagesync_protocol::constants::{
    DEFAULT_API_BASE_URL, REQUEST_TIMEOUT, project_path, upload_token_path,
};
use pagesync_protocol::{ApiEnvelope, UploadTokenResponse};

use crate::credentials::Credentials;
use crate::error::ClientError;

/// Characters escaped inside a single path segment.
const SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Management API client bound to one account.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    account_id: String,
}

impl ApiClient {
    /// Creates a client for `account_id` using `credentials`.
    pub fn new(credentials: &Credentials, account_id: impl Into<String>) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .default_headers(credentials.headers()?)
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent())
            .build()?;

        Ok(Self {
            http,
            base_url: DEFAULT_API_BASE_URL.to_string(),
            account_id: account_id.into(),
        })
    }

    /// Points the client at another API root (self-hosted proxies, tests).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// API root shared by management and asset endpoints.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn account_id(&self) -> &str {
        &self.account_id
    }

    /// Performs an authenticated request and returns the envelope `result`.
    pub async fn raw<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<serde_json::Value, ClientError> {
        let url = format!("{}{}", self.base_url, path);
        let mut req = self.http.request(method, &url);
        if let Some(body) = body {
            req = req.json(body);
        }
        decode_response(req.send().await?).await
    }

    /// Reports whether the project already exists on the account.
    pub async fn project_exists(&self, project: &str) -> Result<bool, ClientError> {
        let path = project_path(&segment(&self.account_id), &segment(project));
        match self.raw::<()>(Method::GET, &path, None).await {
            Ok(_) => Ok(true),
            Err(ClientError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Exchanges the account credentials for a short-lived upload token.
    pub async fn upload_token(&self, project: &str) -> Result<String, ClientError> {
        let path = upload_token_path(&segment(&self.account_id), &segment(project));
        let result = self.raw::<()>(Method::GET, &path, None).await?;
        let token: UploadTokenResponse = serde_json::from_value(result)?;

        if token.jwt.is_empty() {
            return Err(ClientError::Auth("upload token exchange returned an empty token".into()));
        }

        debug!(project, "upload token acquired");
        Ok(token.jwt)
    }
}

pub(crate) fn user_agent() -> String {
    format!("pagesync/{}", env!("CARGO_PKG_VERSION"))
}

/// Escapes a value for use as one URL path segment.
pub(crate) fn segment(value: &str) -> String {
    utf8_percent_encode(value, SEGMENT).to_string()
}

/// Maps an API response to its `result`, classifying failures.
///
/// 401 and 403 become [`ClientError::Unauthorized`] so the caller can
/// decide whether a fresh credential is worth a retry.
pub(crate) async fn decode_response(
    resp: reqwest::Response,
) -> Result<serde_json::Value, ClientError> {
    let status = resp.status();
    let body = resp.bytes().await?;
    let envelope = serde_json::from_slice::<ApiEnvelope>(&body).ok();

    if !status.is_success() {
        let message = match &envelope {
            Some(env) if !env.errors.is_empty() => env.error_summary(),
            _ => String::from_utf8_lossy(&body).trim().to_string(),
        };
        return Err(match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ClientError::Unauthorized {
                status: status.as_u16(),
                message,
            },
            StatusCode::NOT_FOUND => ClientError::NotFound(message),
            _ => ClientError::Api {
                status: status.as_u16(),
                message,
            },
        });
    }

    let envelope = match envelope {
        Some(env) => env,
        None => serde_json::from_slice::<ApiEnvelope>(&body)?,
    };

    if !envelope.success {
        return Err(ClientError::Api {
            status: status.as_u16(),
            message: envelope.error_summary(),
        });
    }

    Ok(envelope
        .parse_result::<serde_json::Value>()?
        .unwrap_or(serde_json::Value::Null))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockServer, Reply};

    fn client(url: &str) -> ApiClient {
        ApiClient::new(&Credentials::ApiToken("account-token".into()), "acc1")
            .unwrap()
            .with_base_url(url)
    }

    #[tokio::test]
    async fn upload_token_uses_account_credentials() {
        let server =
            MockServer::start(|_| Reply::ok(serde_json::json!({"jwt": "jwt-1"}))).await;

        let token = client(&server.url).upload_token("my-site").await.unwrap();
        assert_eq!(token, "jwt-1");

        let reqs = server.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].method, "GET");
        assert_eq!(
            reqs[0].path,
            "/accounts/acc1/pages/projects/my-site/upload-token"
        );
        assert_eq!(reqs[0].authorization.as_deref(), Some("Bearer account-token"));
    }

    #[tokio::test]
    async fn empty_jwt_is_auth_error() {
        let server = MockServer::start(|_| Reply::ok(serde_json::json!({"jwt": ""}))).await;
        let err = client(&server.url).upload_token("p").await.unwrap_err();
        assert!(matches!(err, ClientError::Auth(_)), "got {err}");
    }

    #[tokio::test]
    async fn project_exists_true() {
        let server = MockServer::start(|_| Reply::ok(serde_json::json!({"name": "p"}))).await;
        assert!(client(&server.url).project_exists("p").await.unwrap());
    }

    #[tokio::test]
    async fn project_exists_false_on_404() {
        let server = MockServer::start(|_| Reply::error(404, "Project not found")).await;
        assert!(!client(&server.url).project_exists("p").await.unwrap());
    }

    #[tokio::test]
    async fn project_exists_propagates_server_error() {
        let server = MockServer::start(|_| Reply::error(500, "internal")).await;
        let err = client(&server.url).project_exists("p").await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("500"), "error should mention 500: {msg}");
        assert!(msg.contains("internal"), "error should carry API message: {msg}");
    }

    #[tokio::test]
    async fn forbidden_is_unauthorized() {
        let server = MockServer::start(|_| Reply::error(403, "Authorization error")).await;
        let err = client(&server.url).upload_token("p").await.unwrap_err();
        assert!(matches!(err, ClientError::Unauthorized { status: 403, .. }));
    }

    #[tokio::test]
    async fn unsuccessful_envelope_with_200_is_api_error() {
        let server = MockServer::start(|_| Reply {
            status: 200,
            body: r#"{"success":false,"errors":[{"code":8000,"message":"nope"}]}"#.into(),
        })
        .await;
        let err = client(&server.url)
            .raw::<()>(Method::GET, "/x", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Api { status: 200, .. }));
        assert!(err.to_string().contains("8000: nope"));
    }

    #[tokio::test]
    async fn malformed_body_is_json_error() {
        let server = MockServer::start(|_| Reply {
            status: 200,
            body: "not json".into(),
        })
        .await;
        let err = client(&server.url)
            .raw::<()>(Method::GET, "/x", None)
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Json(_)));
    }

    #[test]
    fn segment_escapes_separators() {
        assert_eq!(segment("my-site"), "my-site");
        assert_eq!(segment("a/b c"), "a%2Fb%20c");
    }

    #[test]
    fn with_base_url_trims_trailing_slash() {
        let c = client("http://localhost:1/");
        assert_eq!(c.base_url(), "http://localhost:1");
    }
}
