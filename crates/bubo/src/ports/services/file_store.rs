//! File Store Port
//!
//! Abstract interface for a remote file store queried via listing calls.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::errors::DomainError;

/// Descriptor of one remote file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub modified_time: Option<String>,
}

/// Listing access to a remote file store
#[async_trait]
pub trait FileStore: Send + Sync {
    /// List up to `limit` entries.
    async fn list(&self, limit: u32) -> Result<Vec<FileEntry>, DomainError>;
}
