//! Domain Layer
//!
//! Entities and error types, free of infrastructure dependencies.

pub mod entities;
pub mod errors;

pub use entities::MemoryRecord;
pub use errors::DomainError;
