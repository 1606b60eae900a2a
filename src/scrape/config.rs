use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

/// Raw deserialization of `scrape.config.json`. Everything is optional
/// at this layer; the job constructors validate and report every
/// missing key in one message.
#[derive(Debug, Default, Deserialize)]
pub struct ScrapeConfig {
    #[serde(default)]
    reddit: RedditSection,
    #[serde(default)]
    scrape_config: ScrapeSection,
    #[serde(default)]
    github: GithubSection,
}

#[derive(Debug, Default, Deserialize)]
struct RedditSection {
    client_id: Option<String>,
    client_secret: Option<String>,
    user_agent: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ScrapeSection {
    subreddit: Option<String>,
    post_limit: Option<u32>,
    output_file: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct GithubSection {
    repos: Option<Vec<String>>,
    output_file: Option<String>,
}

/// Validated settings for one Reddit scrape run.
#[derive(Debug, Clone)]
pub struct RedditJob {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
    pub subreddit: String,
    pub post_limit: u32,
    pub output_file: String,
}

/// Validated settings for one GitHub scrape run.
#[derive(Debug, Clone)]
pub struct GithubJob {
    pub repos: Vec<String>,
    pub output_file: String,
}

fn required(value: &Option<String>, key: &'static str, missing: &mut Vec<&'static str>) -> String {
    match value.as_deref().map(str::trim) {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => {
            missing.push(key);
            String::new()
        }
    }
}

fn missing_keys_error(missing: &[&str]) -> anyhow::Error {
    anyhow::anyhow!(
        "scrape.config.json is missing required keys: {}; see scrape.config.example.json",
        missing.join(", ")
    )
}

impl ScrapeConfig {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            bail!(
                "{} not found; copy scrape.config.example.json there and fill in your values",
                path.display()
            );
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("{} is not valid JSON", path.display()))
    }

    pub fn reddit_job(&self) -> Result<RedditJob> {
        let mut missing = Vec::new();

        let client_id = required(&self.reddit.client_id, "reddit.client_id", &mut missing);
        let client_secret = required(
            &self.reddit.client_secret,
            "reddit.client_secret",
            &mut missing,
        );
        let user_agent = required(&self.reddit.user_agent, "reddit.user_agent", &mut missing);
        let subreddit = required(
            &self.scrape_config.subreddit,
            "scrape_config.subreddit",
            &mut missing,
        );
        let output_file = required(
            &self.scrape_config.output_file,
            "scrape_config.output_file",
            &mut missing,
        );

        let post_limit = self.scrape_config.post_limit.unwrap_or(0);
        if post_limit == 0 {
            missing.push("scrape_config.post_limit");
        }

        if !missing.is_empty() {
            return Err(missing_keys_error(&missing));
        }

        Ok(RedditJob {
            client_id,
            client_secret,
            user_agent,
            subreddit,
            post_limit,
            output_file,
        })
    }

    pub fn github_job(&self) -> Result<GithubJob> {
        let mut missing = Vec::new();

        let repos: Vec<String> = self
            .github
            .repos
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|r| r.trim().to_string())
            .filter(|r| !r.is_empty())
            .collect();
        if repos.is_empty() {
            missing.push("github.repos");
        }

        let output_file = required(&self.github.output_file, "github.output_file", &mut missing);

        if !missing.is_empty() {
            return Err(missing_keys_error(&missing));
        }

        Ok(GithubJob { repos, output_file })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::path::PathBuf;

    use tempfile::TempDir;

    fn write_config(dir: &TempDir, contents: &str) -> PathBuf {
        let path = dir.path().join("scrape.config.json");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path
    }

    const COMPLETE: &str = r#"{
        "reddit": {
            "client_id": "id",
            "client_secret": "secret",
            "user_agent": "magpie-test/0.1"
        },
        "scrape_config": {
            "subreddit": "rust",
            "post_limit": 5,
            "output_file": "reddit_data.txt"
        },
        "github": {
            "repos": ["rust-lang/rust", "tokio-rs/tokio"],
            "output_file": "github_data.txt"
        }
    }"#;

    #[test]
    fn missing_file_error_mentions_the_example() {
        let tmp = tempfile::tempdir().unwrap();
        let err = ScrapeConfig::load(&tmp.path().join("scrape.config.json")).unwrap_err();

        assert!(err.to_string().contains("scrape.config.example.json"));
    }

    #[test]
    fn malformed_json_is_a_descriptive_error() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, "{ this is not json");

        let err = ScrapeConfig::load(&path).unwrap_err();
        assert!(err.to_string().contains("is not valid JSON"));
    }

    #[test]
    fn complete_config_yields_both_jobs() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, COMPLETE);
        let config = ScrapeConfig::load(&path).unwrap();

        let reddit = config.reddit_job().unwrap();
        assert_eq!(reddit.subreddit, "rust");
        assert_eq!(reddit.post_limit, 5);
        assert_eq!(reddit.output_file, "reddit_data.txt");

        let github = config.github_job().unwrap();
        assert_eq!(github.repos, vec!["rust-lang/rust", "tokio-rs/tokio"]);
        assert_eq!(github.output_file, "github_data.txt");
    }

    #[test]
    fn reddit_job_reports_every_missing_key_at_once() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            &tmp,
            r#"{"reddit": {"client_id": "id"}, "scrape_config": {"subreddit": "rust"}}"#,
        );
        let config = ScrapeConfig::load(&path).unwrap();

        let message = config.reddit_job().unwrap_err().to_string();
        assert!(message.contains("reddit.client_secret"));
        assert!(message.contains("reddit.user_agent"));
        assert!(message.contains("scrape_config.post_limit"));
        assert!(message.contains("scrape_config.output_file"));
        assert!(!message.contains("reddit.client_id,"));
    }

    #[test]
    fn blank_values_count_as_missing() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(
            &tmp,
            r#"{
                "reddit": {"client_id": "   ", "client_secret": "s", "user_agent": "ua"},
                "scrape_config": {"subreddit": "rust", "post_limit": 5, "output_file": "out.txt"}
            }"#,
        );
        let config = ScrapeConfig::load(&path).unwrap();

        let message = config.reddit_job().unwrap_err().to_string();
        assert!(message.contains("reddit.client_id"));
    }

    #[test]
    fn github_job_requires_repos_and_output() {
        let tmp = tempfile::tempdir().unwrap();
        let path = write_config(&tmp, r#"{"github": {"repos": ["  "]}}"#);
        let config = ScrapeConfig::load(&path).unwrap();

        let message = config.github_job().unwrap_err().to_string();
        assert!(message.contains("github.repos"));
        assert!(message.contains("github.output_file"));
    }
}
