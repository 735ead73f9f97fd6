//! Tool system
//!
//! Tools are named, single-purpose asynchronous adapters the agent engine may
//! invoke while generating a response. Each tool validates its own input at
//! the registry boundary and delegates the actual work to a port, so tests
//! can substitute mocked stores without touching the environment.

mod drive;
mod realtime;
mod spreadsheet;

pub use drive::DriveListTool;
pub use realtime::RealtimeReadTool;
pub use spreadsheet::SpreadsheetReadTool;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::DomainError;

/// A tool the agent engine can call
#[async_trait]
pub trait Tool: Send + Sync {
    /// Tool name (matches the function name the engine sees)
    fn name(&self) -> &'static str;

    /// Human-readable description
    fn description(&self) -> &'static str;

    /// JSON Schema for the input object
    fn parameters(&self) -> Value;

    /// Execute the tool. Malformed input fails with
    /// [`DomainError::Validation`]; downstream failures propagate unchanged.
    async fn execute(&self, input: Value) -> Result<Value, DomainError>;
}

impl std::fmt::Debug for dyn Tool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Tool").field("name", &self.name()).finish()
    }
}

/// Registry of tools, keyed by unique name
///
/// Ordering is deterministic (sorted by name) so the function declarations
/// sent to the engine are stable across runs.
#[derive(Default)]
pub struct ToolRegistry {
    tools: BTreeMap<&'static str, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Names are unique within the registry.
    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), DomainError> {
        let name = tool.name();
        if self.tools.contains_key(name) {
            return Err(DomainError::Conflict(format!(
                "tool '{}' is already registered",
                name
            )));
        }
        self.tools.insert(name, tool);
        Ok(())
    }

    /// Look up a tool by name.
    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>, DomainError> {
        self.tools
            .get(name)
            .cloned()
            .ok_or_else(|| DomainError::ToolNotFound(name.to_string()))
    }

    /// Execute a named tool against a structured input.
    pub async fn execute(&self, name: &str, input: Value) -> Result<Value, DomainError> {
        self.get(name)?.execute(input).await
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Registered tool names in sorted order.
    pub fn names(&self) -> Vec<&'static str> {
        self.tools.keys().copied().collect()
    }

    /// Function declarations in the generative-language API format.
    pub fn function_declarations(&self) -> Vec<Value> {
        self.tools
            .values()
            .map(|tool| {
                serde_json::json!({
                    "name": tool.name(),
                    "description": tool.description(),
                    "parameters": tool.parameters(),
                })
            })
            .collect()
    }
}
