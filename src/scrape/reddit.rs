use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;

use super::config::RedditJob;

const DEFAULT_AUTH_BASE: &str = "https://www.reddit.com";
const DEFAULT_API_BASE: &str = "https://oauth.reddit.com";

/// Summary of one Reddit scrape run.
#[derive(Debug, Clone)]
pub struct ScrapeReport {
    pub posts: usize,
    pub comments: usize,
    pub output_file: PathBuf,
}

/// Scrapes a subreddit's top posts and their comment trees into a flat
/// text file, one title/selftext/comment body per line.
pub struct RedditScraper {
    client: Client,
    job: RedditJob,
    auth_base: String,
    api_base: String,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Deserialize)]
struct Child {
    data: PostData,
}

#[derive(Deserialize)]
struct PostData {
    #[serde(default)]
    id: String,
    #[serde(default)]
    title: String,
    #[serde(default)]
    selftext: String,
}

impl RedditScraper {
    pub fn new(job: RedditJob) -> Self {
        Self::with_base_urls(job, DEFAULT_AUTH_BASE, DEFAULT_API_BASE)
    }

    pub fn with_base_urls(job: RedditJob, auth_base: &str, api_base: &str) -> Self {
        Self {
            client: Client::new(),
            job,
            auth_base: auth_base.trim_end_matches('/').to_string(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// OAuth client-credentials flow; Reddit rejects requests without a
    /// distinctive user agent.
    async fn access_token(&self) -> Result<String> {
        let url = format!("{}/api/v1/access_token", self.auth_base);
        let response = self
            .client
            .post(&url)
            .basic_auth(&self.job.client_id, Some(&self.job.client_secret))
            .header(reqwest::header::USER_AGENT, &self.job.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .context("Reddit token request failed")?;

        if !response.status().is_success() {
            bail!("Reddit auth failed with status {}", response.status());
        }

        let token: TokenResponse = response
            .json()
            .await
            .context("Reddit token response was not the expected JSON")?;
        Ok(token.access_token)
    }

    async fn top_posts(&self, token: &str) -> Result<Vec<PostData>> {
        let url = format!(
            "{}/r/{}/top?limit={}",
            self.api_base,
            urlencoding::encode(&self.job.subreddit),
            self.job.post_limit
        );
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, &self.job.user_agent)
            .send()
            .await
            .with_context(|| format!("Could not fetch top posts for r/{}", self.job.subreddit))?;

        if !response.status().is_success() {
            bail!(
                "Reddit post listing failed with status {}",
                response.status()
            );
        }

        let listing: Listing = response
            .json()
            .await
            .context("Unexpected post listing shape")?;
        Ok(listing.data.children.into_iter().map(|c| c.data).collect())
    }

    async fn post_comments(&self, token: &str, post_id: &str) -> Result<Vec<String>> {
        let url = format!("{}/comments/{}", self.api_base, post_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, &self.job.user_agent)
            .send()
            .await
            .with_context(|| format!("Could not fetch comments for post {}", post_id))?;

        if !response.status().is_success() {
            bail!(
                "Reddit comment fetch failed with status {}",
                response.status()
            );
        }

        let payload: Value = response
            .json()
            .await
            .context("Unexpected comment payload")?;
        Ok(extract_comment_bodies(&payload))
    }

    pub async fn run(&self, out_dir: &Path) -> Result<ScrapeReport> {
        let token = self.access_token().await?;
        let posts = self.top_posts(&token).await?;
        tracing::info!("Fetched {} posts from r/{}", posts.len(), self.job.subreddit);

        let mut text = String::new();
        let mut comment_count = 0usize;
        for post in &posts {
            text.push_str(&post.title);
            text.push('\n');
            text.push_str(&post.selftext);
            text.push('\n');

            for body in self.post_comments(&token, &post.id).await? {
                text.push_str(&body);
                text.push('\n');
                comment_count += 1;
            }
        }

        let output_file = out_dir.join(&self.job.output_file);
        std::fs::write(&output_file, text)
            .with_context(|| format!("Could not write {}", output_file.display()))?;

        Ok(ScrapeReport {
            posts: posts.len(),
            comments: comment_count,
            output_file,
        })
    }
}

/// The comments endpoint returns a two-element array; element 1 holds
/// the comment listing. Bodies are collected depth-first, so nested
/// replies land right after their parent. "more" stubs have no body and
/// are skipped.
fn extract_comment_bodies(payload: &Value) -> Vec<String> {
    let mut bodies = Vec::new();
    if let Some(children) = payload
        .get(1)
        .and_then(|v| v.get("data"))
        .and_then(|v| v.get("children"))
    {
        collect_bodies(children, &mut bodies);
    }
    bodies
}

fn collect_bodies(children: &Value, bodies: &mut Vec<String>) {
    let Some(items) = children.as_array() else {
        return;
    };

    for child in items {
        let Some(data) = child.get("data") else {
            continue;
        };
        if let Some(body) = data.get("body").and_then(|v| v.as_str()) {
            bodies.push(body.to_string());
        }
        if let Some(nested) = data
            .get("replies")
            .and_then(|v| v.get("data"))
            .and_then(|v| v.get("children"))
        {
            collect_bodies(nested, bodies);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{basic_auth, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_job() -> RedditJob {
        RedditJob {
            client_id: "id".to_string(),
            client_secret: "secret".to_string(),
            user_agent: "magpie-test/0.1".to_string(),
            subreddit: "rust".to_string(),
            post_limit: 2,
            output_file: "reddit_data.txt".to_string(),
        }
    }

    fn comment_payload() -> Value {
        json!([
            {"kind": "Listing", "data": {"children": []}},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {
                    "body": "First comment",
                    "replies": {"kind": "Listing", "data": {"children": [
                        {"kind": "t1", "data": {"body": "Nested reply", "replies": ""}}
                    ]}}
                }},
                {"kind": "more", "data": {"count": 3}}
            ]}}
        ])
    }

    #[tokio::test]
    async fn run_writes_posts_and_comment_trees() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .and(basic_auth("id", "secret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "access_token": "tok",
                "token_type": "bearer"
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/r/rust/top"))
            .and(query_param("limit", "2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "kind": "Listing",
                "data": {"children": [
                    {"kind": "t3", "data": {"id": "abc1", "title": "Post title", "selftext": "Body text"}}
                ]}
            })))
            .mount(&server)
            .await;

        Mock::given(method("GET"))
            .and(path("/comments/abc1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(comment_payload()))
            .mount(&server)
            .await;

        let scraper = RedditScraper::with_base_urls(test_job(), &server.uri(), &server.uri());
        let tmp = tempfile::tempdir().unwrap();

        let report = scraper.run(tmp.path()).await.unwrap();

        assert_eq!(report.posts, 1);
        assert_eq!(report.comments, 2);
        let written = std::fs::read_to_string(report.output_file).unwrap();
        assert_eq!(written, "Post title\nBody text\nFirst comment\nNested reply\n");
    }

    #[tokio::test]
    async fn auth_failure_aborts_the_run() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/v1/access_token"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let scraper = RedditScraper::with_base_urls(test_job(), &server.uri(), &server.uri());
        let tmp = tempfile::tempdir().unwrap();

        let err = scraper.run(tmp.path()).await.unwrap_err();
        assert!(err.to_string().contains("Reddit auth failed"));
    }

    #[test]
    fn comment_extraction_flattens_replies_and_skips_more_stubs() {
        let bodies = extract_comment_bodies(&comment_payload());
        assert_eq!(bodies, vec!["First comment", "Nested reply"]);
    }

    #[test]
    fn comment_extraction_tolerates_unexpected_shapes() {
        assert!(extract_comment_bodies(&json!({})).is_empty());
        assert!(extract_comment_bodies(&json!([])).is_empty());
        assert!(extract_comment_bodies(&json!([{}, {"data": {"children": "nope"}}])).is_empty());
    }
}
