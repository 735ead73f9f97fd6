//! Memory Repository Port
//!
//! Abstract interface for the `memory` exchange log.

use async_trait::async_trait;

use crate::domain::{errors::DomainError, MemoryRecord};

/// Repository interface for the exchange log
#[async_trait]
pub trait MemoryRepository: Send + Sync {
    /// Append one record to the log
    async fn append(&self, record: MemoryRecord) -> Result<(), DomainError>;

    /// Most recent records, newest first
    async fn recent(&self, limit: u32) -> Result<Vec<MemoryRecord>, DomainError>;
}
