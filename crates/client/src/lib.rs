//! Client for the Pages management and asset APIs.
//!
//! Management calls ([`ApiClient`]) authenticate with the account
//! [`Credentials`]. Asset calls go through an [`AuthenticatingTransport`],
//! which trades those credentials for a short-lived upload token and
//! renews it once per call when the store rejects it.

pub mod api;
pub mod credentials;
pub mod error;
pub mod pages;
pub mod session;
pub mod transport;

#[cfg(test)]
mod mock;

// Re-export primary types for convenience.
pub use api::ApiClient;
pub use credentials::Credentials;
pub use error::ClientError;
pub use pages::PagesAssets;
pub use reqwest::Method;
pub use session::AuthSession;
pub use transport::AuthenticatingTransport;
