//! Text chunking

use edumate_core::constants::{CHUNK_OVERLAP, CHUNK_SIZE};
use text_splitter::{ChunkConfig, TextSplitter};
use tracing::debug;

/// Split extracted text into overlapping retrieval chunks.
#[must_use]
pub fn chunk_text(text: &str) -> Vec<String> {
    let config = ChunkConfig::new(CHUNK_SIZE)
        .with_overlap(CHUNK_OVERLAP)
        .unwrap_or_else(|_| ChunkConfig::new(CHUNK_SIZE));
    let splitter = TextSplitter::new(config);
    let chunks: Vec<String> = splitter.chunks(text).map(str::to_owned).collect();
    debug!(input_len = text.len(), chunk_count = chunks.len(), "Text chunked");
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("A single short paragraph."), vec!["A single short paragraph."]);
    }

    #[test]
    fn long_text_is_split_within_size() {
        let text = "Photosynthesis converts light into chemical energy. ".repeat(80);
        let chunks = chunk_text(&text);
        assert!(chunks.len() > 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= CHUNK_SIZE));
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("").is_empty());
    }
}
