//! Retrieval pipeline: chunking, embedding storage, similarity search
//! and context assembly.

pub mod chunker;
pub mod context;
pub mod ingest;
pub mod sqlite;
pub mod store;

pub use chunker::{Chunker, DocumentChunk};
pub use context::{ContextBuilder, NO_CONTEXT_SENTINEL};
pub use ingest::{IngestPipeline, IngestReport};
pub use sqlite::SqliteVectorStore;
pub use store::{ScoredChunk, StoredChunk, VectorStore};
