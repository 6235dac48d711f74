//! Storage layer for EduMate
//!
//! SQLite-backed persistence for chat sessions, ingested documents,
//! curricula and grading records, pooled through r2d2.

mod error;
mod migrations;
mod storage;
#[cfg(test)]
mod tests;
pub mod traits;

pub use error::StorageError;
pub use storage::Storage;
pub use traits::{CurriculumStore, DocumentStore, GradingStore, SessionStore};
