//! Shared limits and defaults.

/// Maximum accepted size for uploaded files and fetched URL bodies (10 MiB).
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Name given to sessions created without an explicit name.
pub const DEFAULT_SESSION_NAME: &str = "Untitled Session";

/// File extensions accepted by document upload and grading.
pub const ALLOWED_EXTENSIONS: [&str; 6] = ["pdf", "png", "jpg", "jpeg", "gif", "webp"];

/// Target chunk size, in characters, for stored document text.
pub const CHUNK_SIZE: usize = 1000;

/// Overlap between consecutive chunks, in characters.
pub const CHUNK_OVERLAP: usize = 200;

/// Number of chunks handed to the model as document context.
pub const RETRIEVAL_TOP_K: usize = 4;

/// Minimum relevance score for retrieved chunks to count as a sufficient answer source.
pub const RETRIEVAL_SUFFICIENT_SCORE: f64 = 0.35;

/// Length of the excerpt attached to a cited source.
pub const SOURCE_EXCERPT_CHARS: usize = 200;

/// Bounds of a grading score.
pub const MIN_SCORE: u8 = 0;
pub const MAX_SCORE: u8 = 100;

/// Roadmap node titles longer than this are truncated.
pub const ROADMAP_TITLE_MAX: usize = 30;
