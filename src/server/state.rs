//! Shared application state

use std::sync::Arc;

use crate::auth::{GoogleOAuth, SessionStore};
use crate::core::auth::AuthProvider;
use crate::core::store::DocumentStore;

/// State handed to every handler
///
/// Built once by [`ServerBuilder::build`](super::ServerBuilder::build); every
/// field is a shared handle, so cloning per request is cheap.
#[derive(Clone)]
pub struct AppState {
    /// Ready-to-use store handle
    pub store: Arc<dyn DocumentStore>,

    /// Resolves the request identity
    pub auth: Arc<dyn AuthProvider>,

    pub sessions: Arc<SessionStore>,

    /// Google sign-in, when configured
    pub oauth: Option<Arc<GoogleOAuth>>,
}
