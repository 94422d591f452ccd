//! Server module for building the HTTP server
//!
//! `ServerBuilder` assembles:
//! - CRUD routes for every registered resource, writes behind the auth gate
//! - sign-in routes and the welcome page
//! - `/api-docs`, generated from the route table
//! - `/health`

pub mod builder;
pub mod docs;
pub mod resource_registry;
pub mod router;
pub mod state;

pub use builder::ServerBuilder;
pub use resource_registry::{
    ResourceDescriptor, ResourceRegistry, ResourceRoutes, RouteInfo, RouteKind,
};
pub use state::AppState;
