use sha2::{Digest, Sha256};

/// A contiguous window of a source document, measured in characters.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    pub content: String,
    pub source: String,
    pub chunk_index: usize,
    pub start_offset: usize,
}

impl DocumentChunk {
    /// Stable id derived from source and position, so re-ingesting the
    /// same file replaces rows instead of duplicating them.
    pub fn id(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.source.as_bytes());
        hasher.update([0u8]);
        hasher.update(self.start_offset.to_le_bytes());
        hasher.update(self.content.as_bytes());
        hex::encode(hasher.finalize())
    }
}

/// Splits text into fixed-size overlapping character windows. No
/// sentence detection and no trimming: consecutive chunks share exactly
/// the configured overlap, which keeps the source reconstructible from
/// its chunks.
pub struct Chunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl Chunker {
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        Self {
            chunk_size,
            chunk_overlap,
        }
    }

    pub fn chunk(&self, text: &str, source: &str) -> Vec<DocumentChunk> {
        if text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        let size = self.chunk_size.max(1);
        let step = size.saturating_sub(self.chunk_overlap).max(1);

        let mut chunks = Vec::new();
        let mut start = 0usize;
        loop {
            let end = (start + size).min(chars.len());
            let content: String = chars[start..end].iter().collect();
            chunks.push(DocumentChunk {
                content,
                source: source.to_string(),
                chunk_index: chunks.len(),
                start_offset: start,
            });
            if end == chars.len() {
                break;
            }
            start += step;
        }

        chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(chunks: &[DocumentChunk]) -> String {
        let mut chars: Vec<char> = Vec::new();
        for chunk in chunks {
            for (i, ch) in chunk.content.chars().enumerate() {
                let pos = chunk.start_offset + i;
                if pos < chars.len() {
                    chars[pos] = ch;
                } else {
                    chars.push(ch);
                }
            }
        }
        chars.into_iter().collect()
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        let chunker = Chunker::new(1000, 100);
        assert!(chunker.chunk("", "empty.txt").is_empty());
    }

    #[test]
    fn short_text_is_a_single_chunk() {
        let chunker = Chunker::new(1000, 100);
        let chunks = chunker.chunk("hello world", "greeting.txt");

        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "hello world");
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[0].chunk_index, 0);
    }

    #[test]
    fn consecutive_chunks_share_the_overlap() {
        let text = "abcdefghijklmnopqrstuvwxy";
        let chunker = Chunker::new(10, 3);
        let chunks = chunker.chunk(text, "alphabet.txt");

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0].content, "abcdefghij");
        assert_eq!(chunks[1].content, "hijklmnopq");
        assert_eq!(chunks[1].start_offset, 7);
        assert!(chunks[1].content.starts_with(&chunks[0].content[7..]));
        assert_eq!(chunks[3].content, "vwxy");
    }

    #[test]
    fn reconstruction_is_exact_for_multibyte_text() {
        let text = "héllo wörld, això és un tëxt de prova für chunking".repeat(3);
        let chunker = Chunker::new(17, 5);
        let chunks = chunker.chunk(&text, "multibyte.txt");

        assert!(chunks.len() > 2);
        assert_eq!(reconstruct(&chunks), text);
    }

    #[test]
    fn oversized_overlap_still_terminates() {
        let chunker = Chunker::new(5, 10);
        let chunks = chunker.chunk("abcdefgh", "tiny.txt");

        assert_eq!(reconstruct(&chunks), "abcdefgh");
        assert!(chunks.iter().all(|c| c.content.len() <= 5));
    }

    #[test]
    fn chunk_ids_are_stable_and_distinct() {
        let chunker = Chunker::new(10, 3);
        let first = chunker.chunk("abcdefghijklmnop", "a.txt");
        let second = chunker.chunk("abcdefghijklmnop", "a.txt");

        assert_eq!(first[0].id(), second[0].id());
        assert_ne!(first[0].id(), first[1].id());

        let other_source = chunker.chunk("abcdefghijklmnop", "b.txt");
        assert_ne!(first[0].id(), other_source[0].id());
    }
}
