//! Bubo Domain Library
//!
//! Core types and interfaces for the Bubo data-assistant service.
//!
//! # Architecture
//!
//! This crate follows a ports-and-adapters split:
//!
//! - **Domain Layer** (`domain/`): entities and error types
//! - **Ports** (`ports/`): abstract interfaces (traits)
//!   - `repositories/`: persistence interfaces
//!   - `services/`: external service interfaces (agent engine, realtime
//!     store, file store)
//! - **Tools** (`tools/`): the named adapters the agent may invoke, plus the
//!   registry that owns them
//!
//! Infrastructure implementations (Gemini, Firebase REST, Google Drive,
//! SQLite) live in `bubo-server`.

pub mod domain;
pub mod ports;
pub mod tools;

// Re-export commonly used types
pub use domain::{DomainError, MemoryRecord};
pub use ports::{AgentEngine, FileEntry, FileStore, MemoryRepository, RealtimeStore};
pub use tools::{
    DriveListTool, RealtimeReadTool, SpreadsheetReadTool, Tool, ToolRegistry,
};
