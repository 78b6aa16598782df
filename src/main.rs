use anyhow::{Context, Result};
use natural_translator::config::Config;
use natural_translator::db::{MemoryStore, PgStore, TranslationStore};
use natural_translator::openai::OpenAiClient;
use natural_translator::server::{create_router, AppState};
use natural_translator::translation::TranslationService;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored in production)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("natural_translator=info".parse()?)
                .add_directive("tower_http=info".parse()?),
        )
        .init();

    info!("Starting translation API");

    // Load configuration from environment
    let config = Config::from_env()?;

    let store: Arc<dyn TranslationStore> = match &config.database_url {
        Some(url) => {
            info!("Connecting to PostgreSQL");
            Arc::new(PgStore::connect(url).await?)
        }
        None => {
            warn!("DATABASE_URL not set, history will be kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let client = Arc::new(OpenAiClient::new(reqwest::Client::new(), &config));
    info!("Using model {} at {}", client.model(), config.llm_api_url);

    let service = TranslationService::new(
        client,
        store,
        config.history_default_limit,
        config.history_max_limit,
    );
    let app = create_router(AppState { service });

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;

    info!("✓ Listening on {}", address);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
