use super::store::ScoredChunk;

/// Context string used when retrieval comes back empty. The prompt
/// builder switches templates on this value.
pub const NO_CONTEXT_SENTINEL: &str = "No relevant context found.";

const SEPARATOR: &str = "\n\n";

/// Assembles retrieved chunks into a bounded context block.
pub struct ContextBuilder {
    max_chars: usize,
}

impl ContextBuilder {
    pub fn new(max_chars: usize) -> Self {
        Self { max_chars }
    }

    /// Concatenates chunk text in rank order, separator included in the
    /// budget, stopping at the first chunk that would overflow. When the
    /// best chunk alone is over budget its prefix is used, so the top
    /// hit is never dropped entirely.
    pub fn build(&self, chunks: &[ScoredChunk]) -> String {
        if chunks.is_empty() {
            return NO_CONTEXT_SENTINEL.to_string();
        }

        let mut context = String::new();
        let mut used = 0usize;

        for chunk in chunks {
            let len = chunk.content.chars().count();
            let cost = if context.is_empty() {
                len
            } else {
                len + SEPARATOR.chars().count()
            };
            if used + cost > self.max_chars {
                break;
            }
            if !context.is_empty() {
                context.push_str(SEPARATOR);
            }
            context.push_str(&chunk.content);
            used += cost;
        }

        if context.is_empty() {
            return chunks[0].content.chars().take(self.max_chars).collect();
        }

        context
    }
}
