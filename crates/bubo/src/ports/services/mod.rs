pub mod agent;
pub mod file_store;
pub mod realtime;

pub use agent::AgentEngine;
pub use file_store::{FileEntry, FileStore};
pub use realtime::RealtimeStore;
