use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use super::provider::LlmProvider;
use super::types::{ChatRequest, ModelInfo};
use crate::errors::ApiError;

/// Client for the native Ollama HTTP API.
#[derive(Clone)]
pub struct OllamaProvider {
    base_url: String,
    client: Client,
}

impl OllamaProvider {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    fn chat_body(&self, request: &ChatRequest, model: &str, stream: bool) -> Value {
        let mut body = json!({
            "model": model,
            "messages": request.messages,
            "stream": stream,
        });

        let mut options = serde_json::Map::new();
        if let Some(t) = request.temperature {
            options.insert("temperature".to_string(), json!(t));
        }
        if let Some(p) = request.top_p {
            options.insert("top_p".to_string(), json!(p));
        }
        if let Some(s) = &request.stop {
            options.insert("stop".to_string(), json!(s));
        }
        if !options.is_empty() {
            if let Some(obj) = body.as_object_mut() {
                obj.insert("options".to_string(), Value::Object(options));
            }
        }

        body
    }
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

enum LineOutcome {
    Continue,
    Stop,
}

async fn handle_stream_line(line: &str, tx: &mpsc::Sender<Result<String, ApiError>>) -> LineOutcome {
    let Ok(value) = serde_json::from_str::<Value>(line) else {
        return LineOutcome::Continue;
    };

    if let Some(err) = value["error"].as_str() {
        let _ = tx.send(Err(ApiError::Internal(err.to_string()))).await;
        return LineOutcome::Stop;
    }

    if let Some(content) = value["message"]["content"].as_str() {
        if !content.is_empty() && tx.send(Ok(content.to_string())).await.is_err() {
            return LineOutcome::Stop;
        }
    }

    if value["done"].as_bool().unwrap_or(false) {
        return LineOutcome::Stop;
    }

    LineOutcome::Continue
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn health_check(&self) -> Result<bool, ApiError> {
        let url = format!("{}/api/version", self.base_url);
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(ApiError::internal)?;
        match client.get(&url).send().await {
            Ok(resp) => Ok(resp.status().is_success()),
            Err(_) => Ok(false),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, ApiError> {
        let url = format!("{}/api/tags", self.base_url);

        // Short timeout so callers can fall back quickly when the
        // server is down.
        let client = Client::builder()
            .timeout(Duration::from_secs(5))
            .build()
            .map_err(ApiError::internal)?;

        let res = client.get(&url).send().await.map_err(ApiError::internal)?;
        if !res.status().is_success() {
            return Err(ApiError::Internal(format!(
                "Failed to list models: {}",
                res.status()
            )));
        }

        let response: TagsResponse = res.json().await.map_err(ApiError::internal)?;
        Ok(response.models)
    }

    async fn chat(&self, request: ChatRequest, model: &str) -> Result<String, ApiError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.chat_body(&request, model, false);

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("Ollama chat error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;
        if let Some(err) = payload["error"].as_str() {
            return Err(ApiError::Internal(format!("Ollama chat error: {}", err)));
        }

        let content = payload["message"]["content"]
            .as_str()
            .unwrap_or_default()
            .to_string();

        Ok(content)
    }

    async fn stream_chat(
        &self,
        request: ChatRequest,
        model: &str,
    ) -> Result<mpsc::Receiver<Result<String, ApiError>>, ApiError> {
        let url = format!("{}/api/chat", self.base_url);
        let body = self.chat_body(&request, model, true);

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("Ollama stream error: {}", text)));
        }

        let (tx, rx) = mpsc::channel(32);
        let mut stream = res.bytes_stream();

        tokio::spawn(async move {
            // NDJSON lines can be split across chunks; carry the remainder.
            let mut pending = String::new();
            while let Some(item) = stream.next().await {
                match item {
                    Ok(bytes) => {
                        pending.push_str(&String::from_utf8_lossy(&bytes));
                        while let Some(pos) = pending.find('\n') {
                            let line = pending[..pos].trim().to_string();
                            pending.drain(..=pos);
                            if line.is_empty() {
                                continue;
                            }
                            if let LineOutcome::Stop = handle_stream_line(&line, &tx).await {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(ApiError::internal(e))).await;
                        return;
                    }
                }
            }

            let line = pending.trim();
            if !line.is_empty() {
                let _ = handle_stream_line(line, &tx).await;
            }
        });

        Ok(rx)
    }

    async fn embed(&self, inputs: &[String], model: &str) -> Result<Vec<Vec<f32>>, ApiError> {
        let url = format!("{}/api/embed", self.base_url);
        let body = json!({
            "model": model,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(ApiError::internal)?;

        if !res.status().is_success() {
            let text = res.text().await.unwrap_or_default();
            return Err(ApiError::Internal(format!("Ollama embed error: {}", text)));
        }

        let payload: Value = res.json().await.map_err(ApiError::internal)?;

        let mut embeddings = Vec::new();
        if let Some(rows) = payload["embeddings"].as_array() {
            for row in rows {
                if let Some(vals) = row.as_array() {
                    let vec: Vec<f32> = vals
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect();
                    embeddings.push(vec);
                }
            }
        }

        if embeddings.len() != inputs.len() {
            return Err(ApiError::Internal(format!(
                "Ollama embed returned {} vectors for {} inputs",
                embeddings.len(),
                inputs.len()
            )));
        }

        Ok(embeddings)
    }
}
