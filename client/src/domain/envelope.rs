//! The `{ success, message, data }` wrapper every endpoint responds with.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::ApiError;

/// Decoded response envelope.
///
/// A body that is missing or does not parse as an envelope is treated as
/// `success: false`, matching how the server's own failures are surfaced.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// Whether the server considers the call successful.
    #[serde(default)]
    pub success: bool,
    /// Optional human-readable message.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Endpoint-specific payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl Envelope {
    /// Interpret a raw response body.
    pub fn from_body(body: Option<Value>) -> Self {
        body.and_then(|value| serde_json::from_value(value).ok())
            .unwrap_or_default()
    }

    /// Server message, when present and not blank.
    pub fn message(&self) -> Option<&str> {
        self.message
            .as_deref()
            .map(str::trim)
            .filter(|message| !message.is_empty())
    }

    /// Decode `data` into the endpoint's payload type.
    ///
    /// A missing payload decodes from JSON `null`, so `Option<T>` and
    /// [`serde::de::IgnoredAny`] accept it.
    pub fn into_data<T: DeserializeOwned>(self) -> Result<T, ApiError> {
        let data = self.data.unwrap_or(Value::Null);
        serde_json::from_value(data)
            .map_err(|err| ApiError::decode(format!("unexpected response payload: {err}")))
    }
}
