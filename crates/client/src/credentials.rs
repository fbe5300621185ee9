//! Account credentials for the management API.

use std::fmt;

use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};

use crate::error::ClientError;

pub const ENV_API_TOKEN: &str = "CLOUDFLARE_API_TOKEN";
pub const ENV_API_KEY: &str = "CLOUDFLARE_API_KEY";
pub const ENV_API_EMAIL: &str = "CLOUDFLARE_API_EMAIL";

const X_AUTH_KEY: HeaderName = HeaderName::from_static("x-auth-key");
const X_AUTH_EMAIL: HeaderName = HeaderName::from_static("x-auth-email");

/// Credentials used for management API calls, including the upload-token
/// exchange. Asset uploads never see these; they use the short-lived token.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Scoped API token, sent as `Authorization: Bearer`.
    ApiToken(String),
    /// Global API key plus account email.
    ApiKey { key: String, email: String },
}

impl Credentials {
    /// Reads credentials from the process environment.
    ///
    /// A scoped token wins over a key/email pair.
    pub fn from_env() -> Result<Self, ClientError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Resolves credentials through `lookup`, treating empty values as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ClientError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(token) = get(ENV_API_TOKEN) {
            return Ok(Credentials::ApiToken(token));
        }

        match (get(ENV_API_KEY), get(ENV_API_EMAIL)) {
            (Some(key), Some(email)) => Ok(Credentials::ApiKey { key, email }),
            _ => Err(ClientError::CredentialsMissing),
        }
    }

    /// Builds the default headers carrying these credentials.
    pub(crate) fn headers(&self) -> Result<HeaderMap, ClientError> {
        let mut headers = HeaderMap::new();
        match self {
            Credentials::ApiToken(token) => {
                headers.insert(AUTHORIZATION, bearer(token)?);
            }
            Credentials::ApiKey { key, email } => {
                headers.insert(
                    X_AUTH_KEY,
                    HeaderValue::from_str(key).map_err(|_| ClientError::InvalidHeader("X-Auth-Key"))?,
                );
                headers.insert(
                    X_AUTH_EMAIL,
                    HeaderValue::from_str(email)
                        .map_err(|_| ClientError::InvalidHeader("X-Auth-Email"))?,
                );
            }
        }
        Ok(headers)
    }
}

/// Formats a bearer `Authorization` value, marked sensitive.
pub(crate) fn bearer(token: &str) -> Result<HeaderValue, ClientError> {
    let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
        .map_err(|_| ClientError::InvalidHeader("Authorization"))?;
    value.set_sensitive(true);
    Ok(value)
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::ApiToken(_) => f.write_str("ApiToken(<redacted>)"),
            Credentials::ApiKey { email, .. } => f
                .debug_struct("ApiKey")
                .field("key", &"<redacted>")
                .field("email", email)
                .finish(),
        }
    }
}
