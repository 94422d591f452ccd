//! Identity resolution and the auth gate
//!
//! `resolve_identity` runs on every request and stores the caller's
//! [`AuthContext`] in the request extensions. `require_auth` is layered only
//! on write routes and turns an anonymous context into a 401 before any
//! extractor or handler runs.

use anyhow::Result;
use async_trait::async_trait;
use axum::extract::{FromRequestParts, Request, State};
use axum::http::request::Parts;
use axum::middleware::Next;
use axum::response::Response;
use std::convert::Infallible;
use std::sync::Arc;

use super::session::SessionStore;
use crate::core::auth::{AuthContext, AuthPolicy, AuthProvider};
use crate::core::error::ApiError;
use crate::server::state::AppState;

/// Identity from the signed session cookie
pub struct SessionAuthProvider {
    sessions: Arc<SessionStore>,
}

impl SessionAuthProvider {
    pub fn new(sessions: Arc<SessionStore>) -> Self {
        Self { sessions }
    }
}

#[async_trait]
impl AuthProvider for SessionAuthProvider {
    async fn extract_context(&self, parts: &Parts) -> Result<AuthContext> {
        let Some(cookie) = self.sessions.read_cookie(&parts.headers) else {
            return Ok(AuthContext::Anonymous);
        };
        Ok(self
            .sessions
            .get(cookie)?
            .map(|user| user.to_context())
            .unwrap_or_default())
    }
}

/// Attach the request-scoped identity
pub async fn resolve_identity(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let (mut parts, body) = request.into_parts();

    let context = match state.auth.extract_context(&parts).await {
        Ok(context) => context,
        Err(e) => {
            tracing::warn!(error = %e, "identity lookup failed, continuing as anonymous");
            AuthContext::Anonymous
        }
    };

    parts.extensions.insert(context);
    next.run(Request::from_parts(parts, body)).await
}

/// Gate for mutating routes
pub async fn require_auth(request: Request, next: Next) -> Result<Response, ApiError> {
    let allowed = request
        .extensions()
        .get::<AuthContext>()
        .is_some_and(|context| AuthPolicy::Authenticated.check(context));

    if !allowed {
        tracing::debug!(method = %request.method(), path = %request.uri().path(), "rejected anonymous write");
        return Err(ApiError::Unauthorized);
    }

    Ok(next.run(request).await)
}

/// Handlers can take the resolved identity as an argument
impl<S> FromRequestParts<S> for AuthContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts
            .extensions
            .get::<AuthContext>()
            .cloned()
            .unwrap_or_default())
    }
}
