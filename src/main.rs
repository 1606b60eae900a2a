use std::env;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;

use magpie::config::AppPaths;
use magpie::logging;
use magpie::server;
use magpie::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let paths = Arc::new(AppPaths::new());
    logging::init(&paths);

    let state = AppState::initialize(paths).await?;

    let port = env::var("PORT")
        .ok()
        .and_then(|val| val.parse::<u16>().ok())
        .unwrap_or(state.settings.server.port);
    let bind_addr = format!("127.0.0.1:{}", port);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    let addr = listener.local_addr()?;
    tracing::info!("Listening on {}", addr);

    let app = server::router(state);
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
