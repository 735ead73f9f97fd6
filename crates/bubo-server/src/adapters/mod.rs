//! Infrastructure adapters
//!
//! Concrete implementations of the bubo ports against external services.

pub mod firebase;
pub mod google;
pub mod sqlite;

pub use firebase::RealtimeDb;
pub use google::{DriveClient, GoogleAuth};
pub use sqlite::SqliteMemoryRepository;
