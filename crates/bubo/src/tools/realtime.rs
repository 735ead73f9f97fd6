//! Realtime value read tool

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::errors::DomainError;
use crate::ports::RealtimeStore;
use crate::tools::Tool;

const NAME: &str = "read_firebase_value";

#[derive(Debug, Deserialize)]
struct Input {
    path: String,
}

/// Fetches a single snapshot from the realtime database by path.
pub struct RealtimeReadTool {
    store: Arc<dyn RealtimeStore>,
}

impl RealtimeReadTool {
    pub fn new(store: Arc<dyn RealtimeStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl Tool for RealtimeReadTool {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Read the value stored at a path in the Firebase Realtime Database"
    }

    fn parameters(&self) -> Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "path": {
                    "type": "string",
                    "description": "Slash-separated path within the database tree"
                }
            },
            "required": ["path"]
        })
    }

    async fn execute(&self, input: Value) -> Result<Value, DomainError> {
        let input: Input = serde_json::from_value(input)
            .map_err(|e| DomainError::invalid_input(NAME, e))?;
        self.store.get(&input.path).await
    }
}
