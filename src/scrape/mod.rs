//! Scrapers that build the raw corpus files the ingest pipeline reads.

pub mod config;
pub mod github;
pub mod reddit;

pub use config::{GithubJob, RedditJob, ScrapeConfig};
pub use github::GithubScraper;
pub use reddit::RedditScraper;
