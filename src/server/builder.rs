//! ServerBuilder for fluent API to build HTTP servers

use super::docs;
use super::resource_registry::ResourceRegistry;
use super::router::{cors_layer, docs_routes, health_routes};
use super::state::AppState;
use crate::auth::{GoogleOAuth, SessionAuthProvider, SessionStore, auth_routes, resolve_identity};
use crate::config::{CorsConfig, SessionConfig};
use crate::core::auth::AuthProvider;
use crate::core::resource::Resource;
use crate::core::store::DocumentStore;
use crate::resources::{GearItems, Hikers, Trails, Wildlife};
use anyhow::Result;
use axum::Router;
use axum::middleware::from_fn_with_state;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

/// Builder for the Nature Notes HTTP server
///
/// # Example
///
/// ```ignore
/// let app = ServerBuilder::new()
///     .with_store(InMemoryStore::new())
///     .with_default_resources()
///     .build()?;
/// ```
pub struct ServerBuilder {
    store: Option<Arc<dyn DocumentStore>>,
    auth_provider: Option<Arc<dyn AuthProvider>>,
    sessions: Option<Arc<SessionStore>>,
    oauth: Option<Arc<GoogleOAuth>>,
    cors: CorsConfig,
    registry: ResourceRegistry,
}

impl ServerBuilder {
    /// Create a new ServerBuilder
    pub fn new() -> Self {
        Self {
            store: None,
            auth_provider: None,
            sessions: None,
            oauth: None,
            cors: CorsConfig::default(),
            registry: ResourceRegistry::new(),
        }
    }

    /// Set the document store (required)
    pub fn with_store(self, store: impl DocumentStore + 'static) -> Self {
        self.with_shared_store(Arc::new(store))
    }

    /// Set an already shared document store
    pub fn with_shared_store(mut self, store: Arc<dyn DocumentStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the identity source
    ///
    /// Defaults to the signed session cookie.
    pub fn with_auth_provider(mut self, provider: impl AuthProvider + 'static) -> Self {
        self.auth_provider = Some(Arc::new(provider));
        self
    }

    /// Session store used by sign-in and the default identity source
    ///
    /// Without one, sessions are signed with a random per-process secret.
    pub fn with_sessions(mut self, sessions: SessionStore) -> Self {
        self.sessions = Some(Arc::new(sessions));
        self
    }

    /// Enable Google sign-in
    pub fn with_oauth(mut self, oauth: GoogleOAuth) -> Self {
        self.oauth = Some(Arc::new(oauth));
        self
    }

    pub fn with_cors(mut self, cors: CorsConfig) -> Self {
        self.cors = cors;
        self
    }

    /// Expose a resource under `/{R::PATH}`
    pub fn register<R: Resource>(mut self) -> Self {
        self.registry.register_resource::<R>();
        self
    }

    /// Trails, wildlife, gear and hikers
    pub fn with_default_resources(self) -> Self {
        self.register::<Trails>()
            .register::<Wildlife>()
            .register::<GearItems>()
            .register::<Hikers>()
    }

    /// Get the registry (route table) as configured so far
    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    /// Build the final router
    ///
    /// The route table and the API docs are fixed here.
    pub fn build(self) -> Result<Router> {
        let store = self
            .store
            .ok_or_else(|| anyhow::anyhow!("DocumentStore is required. Call .with_store()"))?;

        if self.registry.is_empty() {
            tracing::warn!("no resources registered; only auth, docs and health routes are served");
        }

        let sessions = self.sessions.unwrap_or_else(|| {
            Arc::new(SessionStore::new(&SessionConfig {
                secret: format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple()),
                ..SessionConfig::default()
            }))
        });
        let auth = self
            .auth_provider
            .unwrap_or_else(|| Arc::new(SessionAuthProvider::new(sessions.clone())));

        let api_docs = Arc::new(docs::openapi(&self.registry, sessions.cookie_name()));

        let state = AppState {
            store,
            auth,
            sessions,
            oauth: self.oauth,
        };

        let app = Router::new()
            .merge(health_routes())
            .merge(docs_routes(api_docs))
            .merge(auth_routes())
            .merge(self.registry.routes());

        tracing::debug!(
            resources = ?self.registry.paths(),
            routes = self.registry.route_table().len(),
            "route table built"
        );

        Ok(app
            .layer(from_fn_with_state(state.clone(), resolve_identity))
            .layer(cors_layer(&self.cors))
            .layer(TraceLayer::new_for_http())
            .with_state(state))
    }

    /// Serve the application with graceful shutdown
    ///
    /// Handles SIGTERM and SIGINT (Ctrl+C).
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
