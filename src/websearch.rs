use serde::Deserialize;
use tokio::process::Command;

use crate::errors::ApiError;

pub const DEFAULT_RESULT_COUNT: usize = 3;

/// One result parsed from `ddgr --json` output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(rename = "abstract", default)]
    pub snippet: String,
}

/// Runs a DuckDuckGo search through the `ddgr` CLI.
pub async fn search(query: &str, num: usize) -> Result<Vec<SearchResult>, ApiError> {
    if which::which("ddgr").is_err() {
        return Err(ApiError::NotFound(
            "ddgr is not installed. Install it with 'brew install ddgr' (macOS) \
             or 'apt install ddgr' (Debian/Ubuntu)."
                .to_string(),
        ));
    }

    let output = Command::new("ddgr")
        .arg("--json")
        .arg("--num")
        .arg(num.max(1).to_string())
        .arg(query)
        .output()
        .await
        .map_err(ApiError::internal)?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ApiError::Internal(format!(
            "ddgr exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    parse_results(&String::from_utf8_lossy(&output.stdout))
}

pub fn parse_results(raw: &str) -> Result<Vec<SearchResult>, ApiError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    serde_json::from_str(trimmed)
        .map_err(|e| ApiError::Internal(format!("Could not parse ddgr output: {}", e)))
}

/// Numbered plain-text rendering for terminal display.
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return "No search results found.".to_string();
    }

    results
        .iter()
        .enumerate()
        .map(|(i, r)| {
            format!(
                "{}. {}\n   URL: {}\n   {}\n",
                i + 1,
                r.title,
                r.url,
                r.snippet
            )
        })
        .collect::<Vec<String>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CANNED: &str = r#"[
        {"title": "Rust Programming Language", "url": "https://www.rust-lang.org/", "abstract": "A language empowering everyone."},
        {"title": "Rust (fungus)", "url": "https://en.wikipedia.org/wiki/Rust_(fungus)", "abstract": "Plant-pathogenic fungi."}
    ]"#;

    #[test]
    fn parses_ddgr_json_output() {
        let results = parse_results(CANNED).unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].title, "Rust Programming Language");
        assert_eq!(results[0].url, "https://www.rust-lang.org/");
        assert_eq!(results[1].snippet, "Plant-pathogenic fungi.");
    }

    #[test]
    fn empty_output_parses_to_no_results() {
        assert!(parse_results("").unwrap().is_empty());
        assert!(parse_results("  \n").unwrap().is_empty());
        assert!(parse_results("[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_output_is_an_error() {
        let err = parse_results("not json at all").unwrap_err();
        assert!(err.to_string().contains("Could not parse ddgr output"));
    }

    #[test]
    fn missing_fields_default_to_empty_strings() {
        let results = parse_results(r#"[{"title": "Only a title"}]"#).unwrap();
        assert_eq!(results[0].title, "Only a title");
        assert_eq!(results[0].url, "");
        assert_eq!(results[0].snippet, "");
    }

    #[test]
    fn formats_numbered_results() {
        let results = parse_results(CANNED).unwrap();
        let text = format_results(&results);

        assert!(text.starts_with("1. Rust Programming Language\n   URL: https://www.rust-lang.org/\n"));
        assert!(text.contains("\n2. Rust (fungus)\n"));
        assert!(text.contains("   Plant-pathogenic fungi.\n"));
    }

    #[test]
    fn formats_empty_results_with_message() {
        assert_eq!(format_results(&[]), "No search results found.");
    }
}
