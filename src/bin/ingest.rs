use std::env;
use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use magpie::config::{AppPaths, Settings};
use magpie::llm::OllamaProvider;
use magpie::rag::{IngestPipeline, SqliteVectorStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let paths = Arc::new(AppPaths::new());
    let settings = Settings::load(&paths);
    settings.validate()?;

    let args: Vec<String> = env::args().skip(1).collect();
    let files: Vec<PathBuf> = if args.is_empty() {
        vec![
            paths.data_dir.join("reddit_data.txt"),
            paths.data_dir.join("github_data.txt"),
        ]
    } else {
        args.into_iter().map(PathBuf::from).collect()
    };

    let provider = Arc::new(OllamaProvider::new(settings.ollama.base_url.clone()));
    let store = Arc::new(SqliteVectorStore::new(&paths).await?);
    let pipeline = IngestPipeline::new(provider, store, &settings);

    let report = pipeline.run(&files).await?;
    println!(
        "Ingested {} chunks from {} files in {:.2}s",
        report.chunks, report.files, report.elapsed_secs
    );

    Ok(())
}
