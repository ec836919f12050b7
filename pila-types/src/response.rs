use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Envelope for every `/push/`, `/pop/` and `/confirm/` reply. All replies
/// are HTTP 200; success or failure travels in the `status` field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse {
    pub status: ResponseStatus,
    pub message: Value,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Ok,
    Error,
}

impl ApiResponse {
    #[must_use]
    pub fn ok(message: Value) -> Self {
        Self {
            status: ResponseStatus::Ok,
            message,
        }
    }

    /// Success reply with a `null` message.
    #[must_use]
    pub fn ok_empty() -> Self {
        Self::ok(Value::Null)
    }

    pub fn error(message: impl ToString) -> Self {
        Self {
            status: ResponseStatus::Error,
            message: Value::String(message.to_string()),
        }
    }
}

/// Message payload of a successful pop. `value` is the task payload encoded
/// with standard base64; `key` is the lease key, or `""` when the pop was
/// made without a lease and cannot be confirmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopMessage {
    pub key: String,
    pub value: String,
}

/// Advisory collection sizes returned by `/status/`. The two queue-side
/// numbers may race with concurrent producers and consumers; no invariant
/// holds across the three fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackStatus {
    pub stack_length: u64,
    pub retry_queue_length: u64,
    pub running_length: u64,
}
