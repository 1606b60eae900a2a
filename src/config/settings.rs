use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::paths::AppPaths;
use crate::errors::ApiError;

/// Typed view of `config.yml`. Every field has a default, so an absent
/// file yields a fully usable configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub ollama: OllamaSettings,
    pub rag: RagSettings,
    pub models: ModelSettings,
    pub agent: AgentSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            port: 8000,
            cors_allowed_origins: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OllamaSettings {
    pub base_url: String,
    pub embedding_model: String,
}

impl Default for OllamaSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:11434".to_string(),
            embedding_model: "mxbai-embed-large".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RagSettings {
    /// Maximum chunk size in characters.
    pub chunk_size: usize,
    /// Overlap between adjacent chunks in characters.
    pub chunk_overlap: usize,
    /// How many chunks a similarity search returns.
    pub top_k: usize,
    /// Character budget for the assembled context string.
    pub max_context_chars: usize,
    /// How many chunks are embedded per request.
    pub embed_batch_size: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 100,
            top_k: 6,
            max_context_chars: 1000,
            embed_batch_size: 32,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    /// Models offered when the provider cannot be reached.
    pub fallback: Vec<String>,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            fallback: vec![
                "llama3:8b".to_string(),
                "llama3:8b-q4_0".to_string(),
                "qwen2.5:1.5b".to_string(),
            ],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AgentSettings {
    pub model: String,
    pub system_message: String,
    pub user_name: String,
    pub agent_name: String,
}

impl Default for AgentSettings {
    fn default() -> Self {
        Self {
            model: "llama3:8b".to_string(),
            system_message: "You are a helpful assistant with access to a knowledge base \
                             of scraped Reddit threads and GitHub repositories."
                .to_string(),
            user_name: "User".to_string(),
            agent_name: "Assistant".to_string(),
        }
    }
}

impl Settings {
    pub fn load(paths: &AppPaths) -> Self {
        let path = config_path(paths);
        if !path.exists() {
            return Settings::default();
        }

        match fs::read_to_string(&path) {
            Ok(raw) => match serde_yaml::from_str::<Settings>(&raw) {
                Ok(settings) => settings,
                Err(err) => {
                    tracing::warn!(
                        "Failed to parse {}: {}; falling back to defaults",
                        path.display(),
                        err
                    );
                    Settings::default()
                }
            },
            Err(err) => {
                tracing::warn!(
                    "Failed to read {}: {}; falling back to defaults",
                    path.display(),
                    err
                );
                Settings::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        validate_range("rag.chunk_size", self.rag.chunk_size, 1, 100_000)?;
        if self.rag.chunk_overlap >= self.rag.chunk_size {
            return Err(ApiError::BadRequest(format!(
                "rag.chunk_overlap ({}) must be smaller than rag.chunk_size ({})",
                self.rag.chunk_overlap, self.rag.chunk_size
            )));
        }
        validate_range("rag.top_k", self.rag.top_k, 1, 100)?;
        validate_range("rag.max_context_chars", self.rag.max_context_chars, 1, 1_000_000)?;
        validate_range("rag.embed_batch_size", self.rag.embed_batch_size, 1, 1024)?;
        validate_nonempty("ollama.base_url", &self.ollama.base_url)?;
        validate_nonempty("ollama.embedding_model", &self.ollama.embedding_model)?;
        validate_nonempty("agent.model", &self.agent.model)?;
        Ok(())
    }
}

fn config_path(paths: &AppPaths) -> PathBuf {
    if let Ok(path) = env::var("MAGPIE_CONFIG_PATH") {
        return PathBuf::from(path);
    }

    let data_config = paths.data_dir.join("config.yml");
    if data_config.exists() {
        return data_config;
    }

    paths.project_root.join("config.yml")
}

fn validate_range(field: &str, value: usize, min: usize, max: usize) -> Result<(), ApiError> {
    if value < min || value > max {
        return Err(ApiError::BadRequest(format!(
            "{} must be between {} and {} (got {})",
            field, min, max, value
        )));
    }
    Ok(())
}

fn validate_nonempty(field: &str, value: &str) -> Result<(), ApiError> {
    if value.trim().is_empty() {
        return Err(ApiError::BadRequest(format!("{} must not be empty", field)));
    }
    Ok(())
}
