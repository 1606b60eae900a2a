use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::Settings;
use crate::errors::ApiError;
use crate::llm::LlmProvider;

use super::chunker::{Chunker, DocumentChunk};
use super::store::{StoredChunk, VectorStore};

/// Summary of one ingestion run.
#[derive(Debug, Clone)]
pub struct IngestReport {
    pub files: usize,
    pub chunks: usize,
    pub elapsed_secs: f64,
}

/// Rebuilds the vector store from raw text files: clear, chunk, embed,
/// insert. A failure anywhere aborts the run; there is no partial
/// recovery, re-running starts from scratch.
pub struct IngestPipeline {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStore>,
    chunker: Chunker,
    embedding_model: String,
    batch_size: usize,
}

impl IngestPipeline {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStore>,
        settings: &Settings,
    ) -> Self {
        Self {
            provider,
            store,
            chunker: Chunker::new(settings.rag.chunk_size, settings.rag.chunk_overlap),
            embedding_model: settings.ollama.embedding_model.clone(),
            batch_size: settings.rag.embed_batch_size.max(1),
        }
    }

    pub async fn run(&self, files: &[PathBuf]) -> Result<IngestReport, ApiError> {
        let started = Instant::now();

        self.store.clear(&self.embedding_model).await?;

        let mut total_chunks = 0usize;
        for path in files {
            let text = std::fs::read_to_string(path).map_err(|e| {
                ApiError::Internal(format!("Failed to read {}: {}", path.display(), e))
            })?;

            let source = path
                .file_name()
                .map(|v| v.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string());

            tracing::info!("Ingesting {}", source);
            let chunks = self.chunker.chunk(&text, &source);
            total_chunks += self.embed_and_store(chunks).await?;
        }

        Ok(IngestReport {
            files: files.len(),
            chunks: total_chunks,
            elapsed_secs: started.elapsed().as_secs_f64(),
        })
    }

    async fn embed_and_store(&self, chunks: Vec<DocumentChunk>) -> Result<usize, ApiError> {
        let mut inserted = 0usize;

        for batch in chunks.chunks(self.batch_size) {
            let inputs: Vec<String> = batch.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.provider.embed(&inputs, &self.embedding_model).await?;

            let stored: Vec<StoredChunk> = batch
                .iter()
                .zip(embeddings)
                .map(|(chunk, embedding)| StoredChunk {
                    chunk_id: chunk.id(),
                    content: chunk.content.clone(),
                    source: chunk.source.clone(),
                    metadata: serde_json::json!({
                        "chunk_index": chunk.chunk_index,
                        "start_offset": chunk.start_offset,
                    }),
                    embedding,
                })
                .collect();

            inserted += stored.len();
            self.store.insert_batch(stored).await?;
        }

        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use async_trait::async_trait;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    use crate::llm::{ChatRequest, ModelInfo};
    use crate::rag::sqlite::SqliteVectorStore;

    fn stub_embedding(text: &str) -> Vec<f32> {
        let mut v = [0.0f32; 8];
        for (i, b) in text.bytes().enumerate() {
            v[i % 8] += b as f32 / 255.0;
        }
        v.to_vec()
    }

    struct StubEmbedder;

    #[async_trait]
    impl LlmProvider for StubEmbedder {
        fn name(&self) -> &str {
            "stub"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, ApiError> {
            Ok(vec![])
        }

        async fn chat(&self, _request: ChatRequest, _model: &str) -> Result<String, ApiError> {
            Ok(String::new())
        }

        async fn stream_chat(
            &self,
            _request: ChatRequest,
            _model: &str,
        ) -> Result<mpsc::Receiver<Result<String, ApiError>>, ApiError> {
            let (_tx, rx) = mpsc::channel(1);
            Ok(rx)
        }

        async fn embed(&self, inputs: &[String], _model: &str) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs.iter().map(|s| stub_embedding(s)).collect())
        }
    }

    fn small_chunk_settings() -> Settings {
        let mut settings = Settings::default();
        settings.rag.chunk_size = 10;
        settings.rag.chunk_overlap = 3;
        settings.rag.embed_batch_size = 2;
        settings.ollama.embedding_model = "stub-embed".to_string();
        settings
    }

    async fn pipeline_with_store() -> (IngestPipeline, Arc<SqliteVectorStore>, TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteVectorStore::with_path(tmp.path().join("chunks.db"))
                .await
                .unwrap(),
        );
        let pipeline = IngestPipeline::new(
            Arc::new(StubEmbedder),
            store.clone(),
            &small_chunk_settings(),
        );
        (pipeline, store, tmp)
    }

    fn write_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
        path
    }

    #[tokio::test]
    async fn run_chunks_embeds_and_stores_every_file() {
        let (pipeline, store, tmp) = pipeline_with_store().await;
        let a = write_file(&tmp, "a.txt", "abcdefghijklmnopqrstuvwxy");
        let b = write_file(&tmp, "b.txt", "0123456789");

        let report = pipeline.run(&[a, b]).await.unwrap();

        assert_eq!(report.files, 2);
        assert_eq!(report.chunks, 5);
        assert_eq!(store.count().await.unwrap(), 5);
        assert_eq!(
            store.embedding_model().await.unwrap(),
            Some("stub-embed".to_string())
        );
    }

    #[tokio::test]
    async fn run_clears_previous_index() {
        let (pipeline, store, tmp) = pipeline_with_store().await;
        let a = write_file(&tmp, "a.txt", "0123456789");

        pipeline.run(std::slice::from_ref(&a)).await.unwrap();
        pipeline.run(std::slice::from_ref(&a)).await.unwrap();

        assert_eq!(store.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn run_fails_on_missing_file() {
        let (pipeline, store, tmp) = pipeline_with_store().await;
        let missing = tmp.path().join("nope.txt");

        let err = pipeline.run(&[missing]).await.unwrap_err();
        assert!(err.to_string().contains("nope.txt"));
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn ingested_chunk_matches_its_own_embedding() {
        let (pipeline, store, tmp) = pipeline_with_store().await;
        let text = "short one";
        let a = write_file(&tmp, "a.txt", text);
        let b = write_file(&tmp, "b.txt", "ZZZZ other");

        pipeline.run(&[a, b]).await.unwrap();

        let hits = store.search(&stub_embedding(text), 1).await.unwrap();
        assert_eq!(hits[0].content, text);
        assert!(hits[0].score > 0.999);
    }
}
