use serde::{Deserialize, Serialize};

/// Result of the upload-token exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadTokenResponse {
    pub jwt: String,
}

/// Body of `check-missing` and `upsert-hashes`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HashesRequest {
    pub hashes: Vec<String>,
}

/// Metadata stored next to an uploaded asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetMetadata {
    pub content_type: String,
}

/// One entry of an upload batch.
///
/// `value` holds the raw file bytes; on the wire it is base64-encoded and
/// `base64` is set so the store decodes it before persisting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetUpload {
    pub key: String,
    #[serde(with = "base64_bytes")]
    pub value: Vec<u8>,
    pub metadata: AssetMetadata,
    pub base64: bool,
}

impl AssetUpload {
    /// Creates an entry for `data` stored under `hash`.
    pub fn new(hash: impl Into<String>, data: Vec<u8>, content_type: impl Into<String>) -> Self {
        Self {
            key: hash.into(),
            value: data,
            metadata: AssetMetadata {
                content_type: content_type.into(),
            },
            base64: true,
        }
    }
}

mod base64_bytes {
    use base64::{Engine, engine::general_purpose::STANDARD};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        STANDARD.encode(data).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(&s).map_err(serde::de::Error::custom)
    }
}
