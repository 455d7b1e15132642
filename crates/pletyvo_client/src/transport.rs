//! Request/response boundary to the event log server.

use crate::error::ClientResult;
use async_trait::async_trait;
use serde_json::Value;

/// JSON request/response channel to the server
///
/// Paths are absolute (`/api/dapp/v1/...`). Implementations own retries,
/// timeouts and authentication of the connection itself.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Fetch the document at `path`
    async fn get(&self, path: &str) -> ClientResult<Value>;

    /// Submit `body` to `path` and return the reply
    async fn post(&self, path: &str, body: Value) -> ClientResult<Value>;
}

