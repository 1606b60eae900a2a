use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::agent::{AgentProfile, AgentStore};
use crate::config::{AppPaths, Settings};
use crate::convo::Conversation;
use crate::errors::ApiError;
use crate::llm::{LlmProvider, OllamaProvider};
use crate::models::ModelCatalog;
use crate::rag::{SqliteVectorStore, VectorStore};
use crate::transcript::Transcript;

pub struct AppState {
    pub paths: Arc<AppPaths>,
    pub settings: Settings,
    pub provider: Arc<dyn LlmProvider>,
    pub catalog: ModelCatalog,
    pub agent: AgentStore,
    pub store: Arc<dyn VectorStore>,
    pub convo: Conversation,
    pub transcript: Transcript,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub async fn initialize(paths: Arc<AppPaths>) -> Result<Arc<Self>, ApiError> {
        let settings = Settings::load(&paths);
        settings.validate()?;

        let provider: Arc<dyn LlmProvider> =
            Arc::new(OllamaProvider::new(settings.ollama.base_url.clone()));
        let store: Arc<dyn VectorStore> = Arc::new(SqliteVectorStore::new(&paths).await?);

        let defaults = AgentProfile {
            model: settings.agent.model.clone(),
            system_message: settings.agent.system_message.clone(),
            user_name: settings.agent.user_name.clone(),
            agent_name: settings.agent.agent_name.clone(),
        };
        let agent = AgentStore::new(paths.agent_db_path.clone(), defaults).await?;

        let catalog = ModelCatalog::new(provider.clone(), settings.models.fallback.clone());
        let convo = Conversation::new(provider.clone(), store.clone(), &settings);
        let transcript = Transcript::new();
        let started_at = Utc::now();

        Ok(Arc::new(AppState {
            paths,
            settings,
            provider,
            catalog,
            agent,
            store,
            convo,
            transcript,
            started_at,
        }))
    }
}
