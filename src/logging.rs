use std::sync::OnceLock;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::Layer;

use crate::config::AppPaths;

/// Events logged under this target land in `logs/query.log`.
pub const QUERY_TARGET: &str = "query";

static LOG_GUARDS: OnceLock<Vec<WorkerGuard>> = OnceLock::new();

/// Installs the global subscriber: stdout, a daily-rolling `server.log`,
/// and a dedicated `query.log` that only receives query-target events.
pub fn init(paths: &AppPaths) {
    let log_dir = &paths.log_dir;
    let _ = std::fs::create_dir_all(log_dir);

    let server_appender = tracing_appender::rolling::daily(log_dir, "server.log");
    let (server_writer, server_guard) = tracing_appender::non_blocking(server_appender);

    let query_appender = tracing_appender::rolling::never(log_dir, "query.log");
    let (query_writer, query_guard) = tracing_appender::non_blocking(query_appender);

    let _ = LOG_GUARDS.set(vec![server_guard, query_guard]);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let stdout_layer = tracing_subscriber::fmt::layer().with_target(false);
    let server_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(server_writer);
    let query_layer = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_ansi(false)
        .with_writer(query_writer)
        .with_filter(Targets::new().with_target(QUERY_TARGET, LevelFilter::INFO));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer)
        .with(server_layer)
        .with(query_layer)
        .init();
}
