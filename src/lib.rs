//! Local RAG chat service: scrape a corpus, ingest it into a SQLite
//! vector store, and answer questions over it with a local Ollama
//! model.

pub mod agent;
pub mod config;
pub mod convo;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod scrape;
pub mod server;
pub mod state;
pub mod transcript;
pub mod websearch;
