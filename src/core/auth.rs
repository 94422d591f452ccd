//! Authorization model
//!
//! The only distinction the API makes is signed in or not. Identity is
//! resolved once per request into an [`AuthContext`] and write routes check it
//! with [`AuthPolicy::check`], a pure predicate over that value.

use anyhow::Result;
use async_trait::async_trait;
use axum::http::request::Parts;

/// Identity attached to a request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum AuthContext {
    /// Signed-in user
    User {
        /// Identity provider subject (Google account id)
        subject: String,
        display_name: String,
        email: Option<String>,
    },

    /// No session
    #[default]
    Anonymous,
}

impl AuthContext {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, AuthContext::User { .. })
    }

    /// Display name, if signed in
    pub fn display_name(&self) -> Option<&str> {
        match self {
            AuthContext::User { display_name, .. } => Some(display_name),
            AuthContext::Anonymous => None,
        }
    }

    /// Provider subject, if signed in
    pub fn subject(&self) -> Option<&str> {
        match self {
            AuthContext::User { subject, .. } => Some(subject),
            AuthContext::Anonymous => None,
        }
    }
}

/// Authorization policy for a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthPolicy {
    /// Anyone
    Public,

    /// Any signed-in user
    Authenticated,
}

impl AuthPolicy {
    /// Check if auth context satisfies this policy
    pub fn check(&self, context: &AuthContext) -> bool {
        match self {
            AuthPolicy::Public => true,
            AuthPolicy::Authenticated => context.is_authenticated(),
        }
    }
}

/// Source of request identity
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Extract auth context from the request head
    async fn extract_context(&self, parts: &Parts) -> Result<AuthContext>;
}

/// Provider that treats every request as anonymous
pub struct NoAuthProvider;

#[async_trait]
impl AuthProvider for NoAuthProvider {
    async fn extract_context(&self, _parts: &Parts) -> Result<AuthContext> {
        Ok(AuthContext::Anonymous)
    }
}
