use std::time::Duration;

/// Base URL of the management API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

/// Checks which asset hashes the store does not hold yet.
pub const CHECK_MISSING_PATH: &str = "/pages/assets/check-missing";

/// Marks asset hashes as present so later deploys skip them.
pub const UPSERT_HASHES_PATH: &str = "/pages/assets/upsert-hashes";

/// Uploads one batch of assets.
pub const UPLOAD_PATH: &str = "/pages/assets/upload";

/// Timeout for a single API request.
///
/// Covers an upload batch of up to 50 MiB of base64 payload.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Path of the project resource under an account.
pub fn project_path(account_id: &str, project: &str) -> String {
    format!("/accounts/{account_id}/pages/projects/{project}")
}

/// Path of the upload-token exchange for a project.
pub fn upload_token_path(account_id: &str, project: &str) -> String {
    format!("{}/upload-token", project_path(account_id, project))
}
