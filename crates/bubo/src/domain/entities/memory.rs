//! Memory - the persisted exchange log
//!
//! Rows of the `memory` table: one record per completed `/ask` exchange.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A single row of the `memory(id, content)` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRecord {
    /// Unique identifier
    pub id: String,
    /// Serialized content (JSON text for exchange records)
    pub content: String,
}

impl MemoryRecord {
    /// Create a record with a generated id.
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            content: content.into(),
        }
    }

    /// Create a record describing one message/response exchange.
    pub fn exchange(message: &str, response: &Value) -> Self {
        let content = serde_json::json!({
            "message": message,
            "response": response,
            "at": Utc::now().to_rfc3339(),
        });
        Self::new(content.to_string())
    }
}
