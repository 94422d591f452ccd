//! # Nature Notes
//!
//! REST API over four document collections (trails, wildlife sightings,
//! hiking gear and hikers) with Google sign-in gating every write.
//!
//! ## Features
//!
//! - **Declarative validation**: one static rule table per resource drives
//!   create and update checks, type coercion and the API docs
//! - **Generic handlers**: one handler set serves every resource
//! - **Pluggable store**: MongoDB in production, an in-memory store for tests
//! - **Request-scoped identity**: the auth gate is a pure check over the
//!   caller's resolved context
//! - **Generated docs**: `/api-docs` is derived from the route table
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use nature_notes::prelude::*;
//!
//! let app = ServerBuilder::new()
//!     .with_store(InMemoryStore::new())
//!     .with_default_resources()
//!     .build()?;
//!
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod core;
pub mod resources;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        auth::{AuthContext, AuthPolicy, AuthProvider, NoAuthProvider},
        error::{ApiError, ApiResult, FieldValidationError},
        extractors::RecordPath,
        resource::Resource,
        store::{DeleteOutcome, DocumentStore, InsertOutcome, UpdateOutcome, document_to_json},
        validation::{FieldKind, FieldRule, Operation, RuleSet, ValidatedBody},
    };

    // === Resources ===
    pub use crate::resources::{GearItems, Hikers, Trails, Wildlife};

    // === Auth ===
    pub use crate::auth::{GoogleOAuth, SessionAuthProvider, SessionStore, SessionUser};

    // === Storage ===
    pub use crate::storage::{InMemoryStore, MongoStore};

    // === Config ===
    pub use crate::config::{AppConfig, ConfigError, StoreBackend};

    // === Server ===
    pub use crate::server::{AppState, ResourceRegistry, RouteInfo, ServerBuilder};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use async_trait::async_trait;
    pub use mongodb::bson::{Document, doc, oid::ObjectId};
    pub use serde::{Deserialize, Serialize};

    // === Axum ===
    pub use axum::{
        Router,
        extract::State,
        routing::{delete, get, post, put},
    };
}
