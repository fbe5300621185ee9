use serde::{Deserialize, Serialize};

/// Error entry in an API response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorDetail {
    pub code: i64,
    pub message: String,
}

/// Envelope wrapping every management and asset API response.
///
/// The `result` field uses `serde_json::value::RawValue` so callers decide
/// the concrete type once the envelope has been checked for success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default)]
    pub errors: Vec<ApiErrorDetail>,
    #[serde(default)]
    pub messages: Vec<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Box<serde_json::value::RawValue>>,
}

impl ApiEnvelope {
    /// Creates a successful envelope around `result`.
    pub fn ok<T: Serialize>(result: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(result)?;
        Ok(Self {
            success: true,
            errors: Vec::new(),
            messages: Vec::new(),
            result: Some(serde_json::value::RawValue::from_string(json)?),
        })
    }

    /// Creates a failed envelope with a single error.
    pub fn failure(code: i64, message: impl Into<String>) -> Self {
        Self {
            success: false,
            errors: vec![ApiErrorDetail {
                code,
                message: message.into(),
            }],
            messages: Vec::new(),
            result: None,
        }
    }

    /// Deserializes the result into the given type.
    pub fn parse_result<T: for<'de> Deserialize<'de>>(
        &self,
    ) -> Result<Option<T>, serde_json::Error> {
        match &self.result {
            Some(raw) => Ok(Some(serde_json::from_str(raw.get())?)),
            None => Ok(None),
        }
    }

    /// Joins all error entries into one line, e.g. `8000000: token expired`.
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| format!("{}: {}", e.code, e.message))
            .collect::<Vec<_>>()
            .join("; ")
    }
}
