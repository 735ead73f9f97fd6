//! Drive listing tool

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::errors::DomainError;
use crate::ports::FileStore;
use crate::tools::Tool;

const NAME: &str = "list_drive_files";

/// Listing page size requested from the file store
const PAGE_SIZE: u32 = 10;

#[derive(Debug, Deserialize)]
struct Input {}

/// Lists files from the remote file store.
pub struct DriveListTool {
    store: Arc<dyn FileStore>,
}

impl DriveListTool {
    pub fn new(store: Arc<dyn FileStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for DriveListTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "List up to 10 files from Google Drive"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {}
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, DomainError> {
        let _input: Input = serde_json::from_value(input)
            .map_err(|e| DomainError::invalid_input(NAME, e))?;
        let files = self.store.list(PAGE_SIZE).await?;
        serde_json::to_value(files).map_err(|e| DomainError::ExternalService(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::FileEntry;

    /// Store holding more entries than one page
    struct BigStore;

    #[async_trait]
    impl FileStore for BigStore {
        async fn list(&self, limit: u32) -> Result<Vec<FileEntry>, DomainError> {
            assert!(limit <= 10, "tool must never request more than 10 entries");
            let total = 15;
            Ok((0..total.min(limit))
                .map(|i| FileEntry {
                    id: format!("id-{}", i),
                    name: format!("file-{}", i),
                    mime_type: Some("text/plain".into()),
                    modified_time: None,
                })
                .collect())
        }
    }

    #[tokio::test]
    async fn lists_at_most_ten_entries() {
        let tool = DriveListTool::new(Arc::new(BigStore));
        let out = tool.execute(serde_json::json!({})).await.unwrap();
        let files = out.as_array().unwrap();
        assert_eq!(files.len(), 10);
        assert_eq!(files[0]["id"], "id-0");
        assert_eq!(files[0]["mimeType"], "text/plain");
    }

    struct FailingStore;

    #[async_trait]
    impl FileStore for FailingStore {
        async fn list(&self, _limit: u32) -> Result<Vec<FileEntry>, DomainError> {
            Err(DomainError::Unavailable("delegated access".into()))
        }
    }

    #[tokio::test]
    async fn store_errors_propagate() {
        let tool = DriveListTool::new(Arc::new(FailingStore));
        let err = tool.execute(serde_json::json!({})).await.unwrap_err();
        assert!(matches!(err, DomainError::Unavailable(_)));
    }
}
