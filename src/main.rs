use std::process::ExitCode;
use std::sync::Arc;

use nature_notes::auth::{GoogleOAuth, SessionStore};
use nature_notes::config::{AppConfig, StoreBackend};
use nature_notes::core::DocumentStore;
use nature_notes::server::ServerBuilder;
use nature_notes::storage::{InMemoryStore, MongoStore};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,nature_notes=debug")),
        )
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "server failed");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<()> {
    let config = AppConfig::load()?;

    let store: Arc<dyn DocumentStore> = match config.store.backend {
        StoreBackend::Mongodb => {
            let uri = config.store.uri.as_deref().unwrap_or_default();
            let store = MongoStore::connect(uri, &config.store.database).await?;
            if let Err(e) = store.ping().await {
                tracing::warn!(error = %e, "MongoDB is not reachable yet");
            }
            tracing::info!(database = %config.store.database, "using MongoDB store");
            Arc::new(store)
        }
        StoreBackend::Memory => {
            tracing::warn!("using the in-memory store; data is lost on restart");
            Arc::new(InMemoryStore::new())
        }
    };

    let mut builder = ServerBuilder::new()
        .with_shared_store(store)
        .with_sessions(SessionStore::new(&config.session))
        .with_cors(config.cors.clone())
        .with_default_resources();

    match config.oauth.clone() {
        Some(oauth) => builder = builder.with_oauth(GoogleOAuth::new(oauth)),
        None => tracing::warn!("Google sign-in is not configured; writes cannot be authorised"),
    }

    builder.serve(&config.server.bind_addr()).await
}
