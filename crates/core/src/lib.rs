//! Core types for EduMate
//!
//! Domain types, validation rules and text helpers shared across all other crates.

pub mod constants;
pub mod env_config;
mod error;
mod curriculum;
mod grading;
pub mod json_utils;
mod session;
mod source;
pub mod text;
mod upload;

pub use curriculum::*;
pub use error::*;
pub use grading::*;
pub use session::*;
pub use source::*;
pub use upload::*;
