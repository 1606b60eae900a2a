use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use super::config::GithubJob;

const DEFAULT_API_BASE: &str = "https://api.github.com";

// GitHub rejects requests without a user agent.
const USER_AGENT_VALUE: &str = concat!("magpie-scraper/", env!("CARGO_PKG_VERSION"));

/// Summary of one GitHub scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub repos: usize,
    pub output_file: PathBuf,
}

/// Scrapes repo descriptions and raw READMEs into a flat text file.
/// Unauthenticated: the anonymous rate limit is plenty for a handful of
/// repos.
pub struct GithubScraper {
    client: Client,
    job: GithubJob,
    api_base: String,
}

#[derive(Deserialize)]
struct RepoInfo {
    #[serde(default)]
    description: Option<String>,
}

impl GithubScraper {
    pub fn new(job: GithubJob) -> Self {
        Self::with_base_url(job, DEFAULT_API_BASE)
    }

    pub fn with_base_url(job: GithubJob, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            job,
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    async fn repo_description(&self, repo: &str) -> Result<String> {
        let url = format!("{}/repos/{}", self.api_base, repo);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT_VALUE)
            .send()
            .await
            .with_context(|| format!("Could not fetch {}", repo))?;

        if !response.status().is_success() {
            bail!(
                "GitHub repo fetch for {} failed with status {}",
                repo,
                response.status()
            );
        }

        let info: RepoInfo = response.json().await.context("Unexpected repo payload")?;
        Ok(info.description.unwrap_or_default())
    }

    async fn repo_readme(&self, repo: &str) -> Result<String> {
        let url = format!("{}/repos/{}/readme", self.api_base, repo);
        let response = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT_VALUE)
            .header(reqwest::header::ACCEPT, "application/vnd.github.raw")
            .send()
            .await
            .with_context(|| format!("Could not fetch README for {}", repo))?;

        // Repos without a README still contribute their description.
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(String::new());
        }
        if !response.status().is_success() {
            bail!(
                "GitHub README fetch for {} failed with status {}",
                repo,
                response.status()
            );
        }

        response.text().await.context("Could not read README body")
    }

    pub async fn run(&self, out_dir: &Path) -> Result<ScrapeReport> {
        let mut text = String::new();
        for repo in &self.job.repos {
            tracing::info!("Scraping {}", repo);
            text.push_str(&self.repo_description(repo).await?);
            text.push('\n');
            text.push_str(&self.repo_readme(repo).await?);
            text.push('\n');
        }

        let output_file = out_dir.join(&self.job.output_file);
        std::fs::write(&output_file, text)
            .with_context(|| format!("Could not write {}", output_file.display()))?;

        Ok(ScrapeReport {
            repos: self.job.repos.len(),
            output_file,
        })
    }
}
