use std::env;

use tracing_subscriber::EnvFilter;

use magpie::websearch::{self, DEFAULT_RESULT_COUNT};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let query = env::args().skip(1).collect::<Vec<String>>().join(" ");
    if query.trim().is_empty() {
        eprintln!("Usage: magpie-websearch <query terms>");
        std::process::exit(2);
    }

    let results = websearch::search(&query, DEFAULT_RESULT_COUNT).await?;
    println!("{}", websearch::format_results(&results));

    Ok(())
}
