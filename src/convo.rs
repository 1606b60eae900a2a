use std::sync::Arc;

use crate::agent::AgentProfile;
use crate::config::Settings;
use crate::errors::ApiError;
use crate::llm::{ChatMessage, ChatRequest, LlmProvider};
use crate::rag::{ContextBuilder, VectorStore, NO_CONTEXT_SENTINEL};

/// Retrieval-augmented chat: embed the query, pull similar chunks,
/// build the prompt, stream the model's answer into one string.
///
/// No retry and no timeout here; provider errors propagate to the
/// caller.
pub struct Conversation {
    provider: Arc<dyn LlmProvider>,
    store: Arc<dyn VectorStore>,
    context: ContextBuilder,
    embedding_model: String,
    top_k: usize,
}

impl Conversation {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        store: Arc<dyn VectorStore>,
        settings: &Settings,
    ) -> Self {
        Self {
            provider,
            store,
            context: ContextBuilder::new(settings.rag.max_context_chars),
            embedding_model: settings.ollama.embedding_model.clone(),
            top_k: settings.rag.top_k,
        }
    }

    pub async fn chat(&self, query: &str, profile: &AgentProfile) -> Result<String, ApiError> {
        let embeddings = self
            .provider
            .embed(&[query.to_string()], &self.embedding_model)
            .await?;
        let query_embedding = embeddings
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::Internal("embedding response was empty".to_string()))?;

        let hits = self.store.search(&query_embedding, self.top_k).await?;
        let context = self.context.build(&hits);
        let prompt = build_prompt(&context, query);

        let request = ChatRequest::new(vec![
            ChatMessage::system(profile.system_message.clone()),
            ChatMessage::user(prompt),
        ]);

        let mut rx = self.provider.stream_chat(request, &profile.model).await?;
        let mut response = String::new();
        while let Some(piece) = rx.recv().await {
            response.push_str(&piece?);
        }

        Ok(response)
    }
}

fn build_prompt(context: &str, question: &str) -> String {
    if context == NO_CONTEXT_SENTINEL {
        format!(
            "I couldn't find relevant context. Here's my best answer: {}",
            question
        )
    } else {
        format!(
            "Here's some context to help you answer my question: {}\n\nHere's my question: {}",
            context, question
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use tempfile::TempDir;
    use tokio::sync::mpsc;

    use crate::llm::ModelInfo;
    use crate::rag::{SqliteVectorStore, StoredChunk};

    fn stub_embedding(text: &str) -> Vec<f32> {
        let mut v = [0.0f32; 8];
        for (i, b) in text.bytes().enumerate() {
            v[i % 8] += b as f32 / 255.0;
        }
        v.to_vec()
    }

    struct RecordingProvider {
        last_request: Mutex<Option<ChatRequest>>,
        pieces: Vec<String>,
        fail_stream: bool,
    }

    impl RecordingProvider {
        fn speaking(pieces: &[&str]) -> Self {
            Self {
                last_request: Mutex::new(None),
                pieces: pieces.iter().map(|s| s.to_string()).collect(),
                fail_stream: false,
            }
        }

        fn broken() -> Self {
            Self {
                last_request: Mutex::new(None),
                pieces: vec![],
                fail_stream: true,
            }
        }

        fn last_user_prompt(&self) -> String {
            let guard = self.last_request.lock().unwrap();
            let request = guard.as_ref().unwrap();
            request.messages.last().unwrap().content.clone()
        }
    }

    #[async_trait]
    impl LlmProvider for RecordingProvider {
        fn name(&self) -> &str {
            "recording"
        }

        async fn health_check(&self) -> Result<bool, ApiError> {
            Ok(true)
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, ApiError> {
            Ok(vec![])
        }

        async fn chat(&self, _request: ChatRequest, _model: &str) -> Result<String, ApiError> {
            Ok(self.pieces.concat())
        }

        async fn stream_chat(
            &self,
            request: ChatRequest,
            _model: &str,
        ) -> Result<mpsc::Receiver<Result<String, ApiError>>, ApiError> {
            *self.last_request.lock().unwrap() = Some(request);
            if self.fail_stream {
                return Err(ApiError::Internal("model not found".to_string()));
            }

            let (tx, rx) = mpsc::channel(32);
            for piece in self.pieces.clone() {
                let _ = tx.send(Ok(piece)).await;
            }
            Ok(rx)
        }

        async fn embed(&self, inputs: &[String], _model: &str) -> Result<Vec<Vec<f32>>, ApiError> {
            Ok(inputs.iter().map(|s| stub_embedding(s)).collect())
        }
    }

    fn test_profile() -> AgentProfile {
        AgentProfile {
            model: "llama3:8b".to_string(),
            system_message: "You are a test assistant.".to_string(),
            user_name: "User".to_string(),
            agent_name: "Assistant".to_string(),
        }
    }

    async fn store_with_chunk(content: Option<&str>) -> (Arc<SqliteVectorStore>, TempDir) {
        let tmp = tempfile::tempdir().unwrap();
        let store = Arc::new(
            SqliteVectorStore::with_path(tmp.path().join("chunks.db"))
                .await
                .unwrap(),
        );
        if let Some(content) = content {
            store
                .insert_batch(vec![StoredChunk {
                    chunk_id: "c1".to_string(),
                    content: content.to_string(),
                    source: "doc".to_string(),
                    metadata: serde_json::json!({}),
                    embedding: stub_embedding(content),
                }])
                .await
                .unwrap();
        }
        (store, tmp)
    }

    #[tokio::test]
    async fn chat_builds_prompt_from_retrieved_context() {
        let (store, _tmp) = store_with_chunk(Some("the moon is made of rock")).await;
        let provider = Arc::new(RecordingProvider::speaking(&["Hel", "lo"]));
        let convo = Conversation::new(provider.clone(), store, &Settings::default());

        let response = convo
            .chat("what is the moon made of?", &test_profile())
            .await
            .unwrap();

        assert_eq!(response, "Hello");
        let prompt = provider.last_user_prompt();
        assert!(prompt.starts_with("Here's some context to help you answer my question:"));
        assert!(prompt.contains("the moon is made of rock"));
        assert!(prompt.contains("Here's my question: what is the moon made of?"));
    }

    #[tokio::test]
    async fn chat_sends_profile_system_message() {
        let (store, _tmp) = store_with_chunk(Some("context")).await;
        let provider = Arc::new(RecordingProvider::speaking(&["ok"]));
        let convo = Conversation::new(provider.clone(), store, &Settings::default());

        convo.chat("question", &test_profile()).await.unwrap();

        let guard = provider.last_request.lock().unwrap();
        let request = guard.as_ref().unwrap();
        assert_eq!(request.messages[0].role, "system");
        assert_eq!(request.messages[0].content, "You are a test assistant.");
    }

    #[tokio::test]
    async fn empty_store_switches_to_no_context_prompt() {
        let (store, _tmp) = store_with_chunk(None).await;
        let provider = Arc::new(RecordingProvider::speaking(&["ok"]));
        let convo = Conversation::new(provider.clone(), store, &Settings::default());

        convo.chat("lonely question", &test_profile()).await.unwrap();

        let prompt = provider.last_user_prompt();
        assert_eq!(
            prompt,
            "I couldn't find relevant context. Here's my best answer: lonely question"
        );
    }

    #[tokio::test]
    async fn provider_errors_propagate() {
        let (store, _tmp) = store_with_chunk(Some("context")).await;
        let provider = Arc::new(RecordingProvider::broken());
        let convo = Conversation::new(provider, store, &Settings::default());

        let err = convo.chat("q", &test_profile()).await.unwrap_err();
        assert!(err.to_string().contains("model not found"));
    }

    #[test]
    fn prompt_templates_are_fixed() {
        assert_eq!(
            build_prompt("CTX", "Q"),
            "Here's some context to help you answer my question: CTX\n\nHere's my question: Q"
        );
        assert_eq!(
            build_prompt(NO_CONTEXT_SENTINEL, "Q"),
            "I couldn't find relevant context. Here's my best answer: Q"
        );
    }
}
