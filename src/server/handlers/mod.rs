pub mod agent;
pub mod chat;
pub mod health;
pub mod models;
pub mod transcript;
