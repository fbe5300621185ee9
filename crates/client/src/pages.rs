//! Asset store calls for one Pages project.

use reqwest::Method;
use tracing::{debug, info};

use pagesync_protocol::constants::{CHECK_MISSING_PATH, UPLOAD_PATH, UPSERT_HASHES_PATH};
use pagesync_protocol::{AssetUpload, HashesRequest};

use crate::api::ApiClient;
use crate::error::ClientError;
use crate::transport::AuthenticatingTransport;

/// The asset store of a single project.
///
/// Existence checks go through the management API with account
/// credentials; everything else goes through the upload-token transport.
pub struct PagesAssets {
    transport: AuthenticatingTransport,
}

impl PagesAssets {
    pub fn new(api: ApiClient, project: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            transport: AuthenticatingTransport::new(api, project)?,
        })
    }

    pub fn project(&self) -> &str {
        self.transport.project()
    }

    pub fn transport(&self) -> &AuthenticatingTransport {
        &self.transport
    }

    pub async fn project_exists(&self) -> Result<bool, ClientError> {
        self.transport.api().project_exists(self.transport.project()).await
    }

    /// Asks the store which of `hashes` it does not hold.
    pub async fn missing_hashes(&self, hashes: &[String]) -> Result<Vec<String>, ClientError> {
        let body = HashesRequest {
            hashes: hashes.to_vec(),
        };
        let result = self
            .transport
            .send(Method::POST, CHECK_MISSING_PATH, Some(&body))
            .await?;

        let missing: Vec<String> = match result {
            serde_json::Value::Null => Vec::new(),
            other => serde_json::from_value(other)?,
        };
        debug!(asked = hashes.len(), missing = missing.len(), "check-missing");
        Ok(missing)
    }

    /// Uploads one batch in a single request.
    pub async fn upload_batch(&self, entries: &[AssetUpload]) -> Result<(), ClientError> {
        let bytes: usize = entries.iter().map(|e| e.value.len()).sum();
        self.transport
            .send(Method::POST, UPLOAD_PATH, Some(entries))
            .await?;
        debug!(files = entries.len(), bytes, "batch stored");
        Ok(())
    }

    /// Records `hashes` as present so later deploys skip them.
    pub async fn upsert_hashes(&self, hashes: &[String]) -> Result<(), ClientError> {
        let body = HashesRequest {
            hashes: hashes.to_vec(),
        };
        self.transport
            .send(Method::POST, UPSERT_HASHES_PATH, Some(&body))
            .await?;
        info!(hashes = hashes.len(), "hashes committed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::credentials::Credentials;
    use crate::mock::{MockServer, Reply};

    fn assets(url: &str) -> PagesAssets {
        let api = ApiClient::new(&Credentials::ApiToken("acct".into()), "acc1")
            .unwrap()
            .with_base_url(url);
        PagesAssets::new(api, "site").unwrap()
    }

    fn token_or(req_path: &str, reply: impl FnOnce() -> Reply) -> Reply {
        if req_path.ends_with("/upload-token") {
            Reply::ok(serde_json::json!({"jwt": "jwt-1"}))
        } else {
            reply()
        }
    }

    #[tokio::test]
    async fn missing_hashes_sends_hash_list() {
        let server = MockServer::start(|req| {
            token_or(&req.path, || Reply::ok(serde_json::json!(["b"])))
        })
        .await;

        let missing = assets(&server.url)
            .missing_hashes(&["a".into(), "b".into()])
            .await
            .unwrap();
        assert_eq!(missing, vec!["b".to_string()]);

        let call = server
            .requests()
            .into_iter()
            .find(|r| r.path == CHECK_MISSING_PATH)
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&call.body).unwrap();
        assert_eq!(body, serde_json::json!({"hashes": ["a", "b"]}));
        assert_eq!(call.authorization.as_deref(), Some("Bearer jwt-1"));
    }

    #[tokio::test]
    async fn missing_hashes_null_result_is_empty() {
        let server = MockServer::start(|req| {
            token_or(&req.path, || Reply::ok(serde_json::Value::Null))
        })
        .await;
        let missing = assets(&server.url).missing_hashes(&["a".into()]).await.unwrap();
        assert!(missing.is_empty());
    }

    #[tokio::test]
    async fn upload_batch_posts_entry_array() {
        let server = MockServer::start(|req| {
            token_or(&req.path, || Reply::ok(serde_json::Value::Null))
        })
        .await;

        let entries = vec![
            AssetUpload::new("h1", b"one".to_vec(), "text/plain"),
            AssetUpload::new("h2", b"two".to_vec(), "text/css"),
        ];
        assets(&server.url).upload_batch(&entries).await.unwrap();

        let call = server
            .requests()
            .into_iter()
            .find(|r| r.path == UPLOAD_PATH)
            .unwrap();
        let body: serde_json::Value = serde_json::from_str(&call.body).unwrap();
        let arr = body.as_array().unwrap();
        assert_eq!(arr.len(), 2);
        assert_eq!(arr[0]["key"], "h1");
        assert_eq!(arr[0]["value"], "b25l");
        assert_eq!(arr[1]["metadata"]["contentType"], "text/css");
        assert_eq!(arr[1]["base64"], true);
    }

    #[tokio::test]
    async fn upsert_hashes_hits_commit_endpoint() {
        let server = MockServer::start(|req| {
            token_or(&req.path, || Reply::ok(serde_json::Value::Null))
        })
        .await;
        assets(&server.url)
            .upsert_hashes(&["a".into()])
            .await
            .unwrap();
        assert_eq!(server.hits(UPSERT_HASHES_PATH), 1);
    }

    #[tokio::test]
    async fn project_exists_uses_account_credentials() {
        let server = MockServer::start(|_| Reply::error(404, "not found")).await;
        let store = assets(&server.url);
        assert!(!store.project_exists().await.unwrap());

        let reqs = server.requests();
        assert_eq!(reqs.len(), 1);
        assert_eq!(reqs[0].path, "/accounts/acc1/pages/projects/site");
        assert_eq!(reqs[0].authorization.as_deref(), Some("Bearer acct"));
    }

    #[tokio::test]
    async fn server_error_on_upload_is_not_auth() {
        let server = MockServer::start(|req| {
            token_or(&req.path, || Reply::error(500, "storage unavailable"))
        })
        .await;
        let err = assets(&server.url)
            .upload_batch(&[AssetUpload::new("h", vec![1], "text/plain")])
            .await
            .unwrap_err();
        assert!(!err.is_auth());
        assert!(err.to_string().contains("storage unavailable"));
    }
}
