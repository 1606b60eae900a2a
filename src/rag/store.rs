//! VectorStore trait — abstract interface for chunk storage backends.
//!
//! The primary implementation is `SqliteVectorStore` in the `sqlite`
//! module.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::errors::ApiError;

/// A chunk as persisted in the vector store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredChunk {
    /// Unique chunk identifier.
    pub chunk_id: String,
    /// The text content of the chunk.
    pub content: String,
    /// Source identifier (filename, URL, etc.).
    pub source: String,
    /// Position data as JSON (chunk index, character offset).
    pub metadata: serde_json::Value,
    /// Embedding vector for the content.
    pub embedding: Vec<f32>,
}

/// A retrieval hit with its similarity to the query.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredChunk {
    pub chunk_id: String,
    pub content: String,
    pub source: String,
    /// Cosine similarity (higher = better).
    pub score: f32,
}

/// Abstract trait for chunk storage backends.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert chunks, replacing rows that share a chunk id.
    async fn insert_batch(&self, chunks: Vec<StoredChunk>) -> Result<(), ApiError>;

    /// Return the chunks most similar to the query embedding.
    async fn search(&self, query_embedding: &[f32], limit: usize)
        -> Result<Vec<ScoredChunk>, ApiError>;

    /// Total number of stored chunks.
    async fn count(&self) -> Result<u64, ApiError>;

    /// Delete every chunk and record the embedding model the next
    /// ingest will use. Stored vectors are only comparable when they
    /// all come from one model.
    async fn clear(&self, embedding_model: &str) -> Result<(), ApiError>;

    /// The embedding model the stored vectors were produced with, if
    /// any ingest has recorded one.
    async fn embedding_model(&self) -> Result<Option<String>, ApiError>;
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.is_empty() || a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0f32;
    let mut norm_a = 0.0f32;
    let mut norm_b = 0.0f32;
    for (x, y) in a.iter().zip(b.iter()) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}
