//! Wire types for the Pages asset store.
//!
//! Shapes shared by the management API (upload-token exchange, project
//! lookup) and the asset API (check-missing, upload, upsert-hashes).

pub mod constants;
pub mod envelope;
pub mod types;

// Re-export primary types for convenience.
pub use envelope::{ApiEnvelope, ApiErrorDetail};
pub use types::{AssetMetadata, AssetUpload, HashesRequest, UploadTokenResponse};
