//! Realtime Store Port
//!
//! Abstract interface for a hierarchical key-value database read by path.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::DomainError;

/// Read access to a realtime key-value tree
#[async_trait]
pub trait RealtimeStore: Send + Sync {
    /// Fetch the value stored at `path`.
    ///
    /// Returns `Value::Null` when nothing is stored there; the absent
    /// sentinel is passed through unmodified.
    async fn get(&self, path: &str) -> Result<Value, DomainError>;
}
