//! Client error types.

/// Shown when no usable credentials are configured.
pub const CREDENTIALS_HELP: &str = "missing API credentials, set either \
'CLOUDFLARE_API_TOKEN' for a scoped API token, or both 'CLOUDFLARE_API_KEY' \
and 'CLOUDFLARE_API_EMAIL' for a global API key";

/// Errors produced by the management and asset API clients.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// The remote rejected the credential (HTTP 401 or 403).
    #[error("unauthorized ({status}): {message}")]
    Unauthorized { status: u16, message: String },

    #[error("not found: {0}")]
    NotFound(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Token acquisition failed or a fresh token was rejected again.
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("{CREDENTIALS_HELP}")]
    CredentialsMissing,

    #[error("invalid value for header {0}")]
    InvalidHeader(&'static str),
}

impl ClientError {
    /// True when the failure means "check your credentials" rather than
    /// a network or protocol problem.
    pub fn is_auth(&self) -> bool {
        matches!(
            self,
            ClientError::Auth(_)
                | ClientError::Unauthorized { .. }
                | ClientError::CredentialsMissing
                | ClientError::InvalidHeader(_)
        )
    }
}
