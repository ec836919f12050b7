//! Client for the pila task-stack HTTP API.

pub(crate) mod base;

use base::BaseClient;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;

pub use pila_types::response::{PopMessage, StackStatus};

pub struct Client {
    base: BaseClient,
}

impl Client {
    pub fn new(api_url: impl ToString) -> Self {
        Self {
            base: BaseClient::new(api_url),
        }
    }

    /// Push one task payload onto the stack.
    pub async fn push(&self, data: &str) -> Result<(), String> {
        self.base
            .form::<Option<()>>("/push/", &[("data", data.to_string())])
            .await
            .map(|_| ())
    }

    /// Pop one task under a lease of `timeout` seconds.
    pub async fn pop(&self, timeout: i64) -> Result<PopMessage, String> {
        self.base
            .form("/pop/", &[("timeout", timeout.to_string())])
            .await
    }

    /// Confirm a completed task by its lease key.
    pub async fn confirm(&self, key: &str) -> Result<(), String> {
        self.base
            .form::<Option<()>>("/confirm/", &[("key", key.to_string())])
            .await
            .map(|_| ())
    }

    /// Advisory collection sizes.
    pub async fn status(&self) -> Result<StackStatus, String> {
        self.base.get_raw("/status/").await
    }
}

/// Decode the base64 payload of a pop reply.
pub fn decode_value(message: &PopMessage) -> Result<Vec<u8>, String> {
    BASE64.decode(&message.value).map_err(|e| format!("{e:#?}"))
}
