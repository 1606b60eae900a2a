use std::env;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

use magpie::config::AppPaths;
use magpie::scrape::{GithubScraper, ScrapeConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let paths = AppPaths::new();
    let config_path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| paths.project_root.join("scrape.config.json"));

    let job = match ScrapeConfig::load(&config_path).and_then(|config| config.github_job()) {
        Ok(job) => job,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    let scraper = GithubScraper::new(job);
    let report = scraper.run(&paths.data_dir).await?;
    println!(
        "Scraped {} repos into {}",
        report.repos,
        report.output_file.display()
    );

    Ok(())
}
