//! Ports
//!
//! Abstract interfaces implemented by infrastructure adapters in
//! `bubo-server` and by mocks in tests.

pub mod repositories;
pub mod services;

pub use repositories::MemoryRepository;
pub use services::{AgentEngine, FileEntry, FileStore, RealtimeStore};
