use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::llm::{LlmProvider, ModelInfo};

/// Name fragments that mark a model as embedding-only. These never make
/// sense as chat targets, so the catalog hides them.
const EMBEDDING_NAME_HINTS: &[&str] = &["embed", "bge-", "gte-", "e5-"];

fn is_embedding_model(name: &str) -> bool {
    let lower = name.to_lowercase();
    EMBEDDING_NAME_HINTS.iter().any(|hint| lower.contains(hint))
}

/// Catalog of chat-capable models, backed by the provider's tag listing
/// with a static fallback for when Ollama is unreachable.
pub struct ModelCatalog {
    provider: Arc<dyn LlmProvider>,
    fallback: Vec<String>,
    cache: RwLock<Option<Vec<ModelInfo>>>,
    fetch_failed_once: AtomicBool,
}

impl ModelCatalog {
    pub fn new(provider: Arc<dyn LlmProvider>, fallback: Vec<String>) -> Self {
        Self {
            provider,
            fallback,
            cache: RwLock::new(None),
            fetch_failed_once: AtomicBool::new(false),
        }
    }

    /// Chat models currently available, embedding models filtered out.
    /// A successful fetch is cached; a failed fetch returns the fallback
    /// list without caching it, so a later call retries the provider.
    pub async fn list(&self) -> Vec<ModelInfo> {
        if let Some(cached) = self.cache.read().await.as_ref() {
            return cached.clone();
        }

        match self.provider.list_models().await {
            Ok(models) => {
                let chat_models: Vec<ModelInfo> = models
                    .into_iter()
                    .filter(|m| !is_embedding_model(&m.name))
                    .collect();
                *self.cache.write().await = Some(chat_models.clone());
                chat_models
            }
            Err(err) => {
                if !self.fetch_failed_once.swap(true, Ordering::Relaxed) {
                    tracing::warn!(
                        "Could not list models from {}: {}; using fallback list",
                        self.provider.name(),
                        err
                    );
                }
                self.fallback
                    .iter()
                    .map(|name| ModelInfo::named(name))
                    .collect()
            }
        }
    }

    /// Drops the cached listing and fetches a fresh one.
    pub async fn refresh(&self) -> Vec<ModelInfo> {
        *self.cache.write().await = None;
        self.list().await
    }
}
