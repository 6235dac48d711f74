//! Document ingestion for EduMate
//!
//! Validates uploads, extracts text from PDFs, images and web pages, and
//! splits it into retrieval chunks.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]

mod chunker;
mod error;
mod extractor;
mod image;
mod pdf;
mod web;

pub use chunker::chunk_text;
pub use error::IngestError;
pub use extractor::{Extracted, Extractor};
pub use image::{image_data_url, sniff_kind};
pub use pdf::extract_pdf_text;
pub use web::{FetchedPage, HttpFetcher, PageFetcher};
