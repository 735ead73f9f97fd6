//! Agent Engine Port
//!
//! Abstract interface for the generation engine behind `/ask`. The engine
//! owns the reasoning loop and decides when registered tools run; this
//! system's contract with it is one message in, one result out.

use async_trait::async_trait;
use serde_json::Value;

use crate::domain::errors::DomainError;

/// Generation engine interface
///
/// Implementations may invoke zero or more registered tools while producing
/// the response. No streaming and no multi-turn state is threaded through
/// this interface.
#[async_trait]
pub trait AgentEngine: Send + Sync {
    /// Generate a response to a single message
    async fn generate(&self, message: &str) -> Result<Value, DomainError>;
}
