mod authoring;
mod config;
mod error;
mod handlers;
mod metrics;
mod routes;

use anyhow::Context;
use arena_common::redis::RedisStore;
use arena_common::{MemoryStore, ProblemStore};
use arena_judge::{Judge0Client, LanguageRegistry};
use authoring::ProblemService;
use axum::Router;
use config::ApiConfig;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};

pub struct AppState {
    pub service: ProblemService,
}

fn init_tracing(json: bool) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ApiConfig::from_env()?;
    init_tracing(config.json_logs);

    info!("Arena API booting...");
    info!(
        bind_addr = %config.bind_addr,
        judge_url = %config.judge.base_url,
        redis = config.redis_url.is_some(),
        duplicate_tags = ?config.duplicate_tags,
        "Configuration loaded"
    );
    metrics::init();

    let languages = match &config.languages_file {
        Some(path) => LanguageRegistry::load_from_file(path)
            .with_context(|| format!("Failed to load language table from {}", path.display()))?,
        None => LanguageRegistry::default(),
    };
    for (language, entry) in languages.entries() {
        info!(language = %language, judge_id = entry.judge_id, "Language registered");
    }

    let judge = Judge0Client::new(&config.judge).context("Failed to build judge client")?;

    let store: Arc<dyn ProblemStore> = match &config.redis_url {
        Some(url) => {
            let store = RedisStore::connect(url)
                .await
                .context("Failed to connect to Redis")?;
            info!("Connected to Redis: {}", url);
            Arc::new(store)
        }
        None => {
            warn!("REDIS_URL not set, problems are kept in memory");
            Arc::new(MemoryStore::new())
        }
    };

    let service = ProblemService::new(
        Arc::new(judge),
        store,
        languages,
        config.judge.poll.clone(),
        config.duplicate_tags,
    );
    let state = Arc::new(AppState { service });

    let app = Router::new()
        .merge(routes::routes())
        .with_state(state);

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr))?;

    info!("HTTP server listening on {}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Arena API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    warn!("Received shutdown signal, draining requests...");
}
