//! Storage trait abstraction
//!
//! Async domain traits implemented by [`crate::Storage`], so services can be
//! exercised against any backend.

pub mod curriculum;
pub mod document;
pub mod grading;
pub mod session;

pub use curriculum::CurriculumStore;
pub use document::DocumentStore;
pub use grading::GradingStore;
pub use session::SessionStore;
