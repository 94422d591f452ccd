//! Resource registry: the static route table
//!
//! Each registered resource contributes five routes and a matching set of
//! [`RouteInfo`] entries. The API docs are generated from those entries, so
//! routing and documentation cannot drift apart.

use axum::Router;
use axum::middleware::from_fn;
use axum::routing::{delete, get, post, put};
use indexmap::IndexMap;
use serde::Serialize;
use std::marker::PhantomData;

use super::state::AppState;
use crate::auth::require_auth;
use crate::core::resource::Resource;
use crate::core::validation::RuleSet;
use crate::resources::handlers::{
    create_record, delete_record, get_record, list_records, update_record,
};

/// The five record operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteKind {
    List,
    Get,
    Create,
    Update,
    Delete,
}

impl RouteKind {
    pub const ALL: [RouteKind; 5] = [
        RouteKind::List,
        RouteKind::Get,
        RouteKind::Create,
        RouteKind::Update,
        RouteKind::Delete,
    ];

    pub fn method(&self) -> &'static str {
        match self {
            RouteKind::List | RouteKind::Get => "GET",
            RouteKind::Create => "POST",
            RouteKind::Update => "PUT",
            RouteKind::Delete => "DELETE",
        }
    }

    /// Whether the path carries `{id}`
    pub fn targets_record(&self) -> bool {
        !matches!(self, RouteKind::List | RouteKind::Create)
    }

    /// Writes sit behind the auth gate
    pub fn requires_auth(&self) -> bool {
        matches!(
            self,
            RouteKind::Create | RouteKind::Update | RouteKind::Delete
        )
    }

    pub fn success_status(&self) -> u16 {
        match self {
            RouteKind::Create => 201,
            RouteKind::Delete => 204,
            _ => 200,
        }
    }

    pub fn failure_statuses(&self) -> &'static [u16] {
        match self {
            RouteKind::List => &[500],
            RouteKind::Get => &[400, 404, 500],
            RouteKind::Create => &[400, 401, 422, 500],
            RouteKind::Update => &[400, 401, 404, 422, 500],
            RouteKind::Delete => &[400, 401, 404, 500],
        }
    }
}

/// One row of the route table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteInfo {
    pub kind: RouteKind,
    pub method: &'static str,
    pub path: String,
    pub auth_required: bool,
    pub success_status: u16,
    pub failure_statuses: &'static [u16],
    pub summary: String,
    /// Documentation group
    pub tag: &'static str,
    /// Capitalised resource name
    pub title: &'static str,
}

/// Describes how to route and document one resource
pub trait ResourceDescriptor: Send + Sync {
    /// URL segment (e.g., "trails")
    fn path(&self) -> &'static str;

    fn title(&self) -> &'static str;

    fn tag(&self) -> &'static str;

    fn description(&self) -> &'static str;

    fn rules(&self) -> RuleSet;

    /// Build the five routes with the auth gate on writes
    fn build_routes(&self) -> Router<AppState>;

    fn route_info(&self) -> Vec<RouteInfo>;
}

/// Descriptor for any [`Resource`]
pub struct ResourceRoutes<R>(PhantomData<R>);

impl<R: Resource> ResourceRoutes<R> {
    pub fn new() -> Self {
        Self(PhantomData)
    }
}

impl<R: Resource> Default for ResourceRoutes<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Resource> ResourceDescriptor for ResourceRoutes<R> {
    fn path(&self) -> &'static str {
        R::PATH
    }

    fn title(&self) -> &'static str {
        R::TITLE
    }

    fn tag(&self) -> &'static str {
        R::TAG
    }

    fn description(&self) -> &'static str {
        R::DESCRIPTION
    }

    fn rules(&self) -> RuleSet {
        R::rules()
    }

    fn build_routes(&self) -> Router<AppState> {
        let collection = format!("/{}", R::PATH);
        let record = format!("/{}/{{id}}", R::PATH);

        Router::new()
            .route(
                &collection,
                get(list_records::<R>)
                    .merge(post(create_record::<R>).route_layer(from_fn(require_auth))),
            )
            .route(
                &record,
                get(get_record::<R>).merge(
                    put(update_record::<R>)
                        .merge(delete(delete_record::<R>))
                        .route_layer(from_fn(require_auth)),
                ),
            )
    }

    fn route_info(&self) -> Vec<RouteInfo> {
        RouteKind::ALL
            .iter()
            .map(|kind| {
                let path = if kind.targets_record() {
                    format!("/{}/{{id}}", R::PATH)
                } else {
                    format!("/{}", R::PATH)
                };
                let summary = match kind {
                    RouteKind::List => format!("List all {}", R::PLURAL),
                    RouteKind::Get => format!("Get a {} by ID", R::SINGULAR),
                    RouteKind::Create => format!("Create a {}", R::SINGULAR),
                    RouteKind::Update => format!("Update a {}", R::SINGULAR),
                    RouteKind::Delete => format!("Delete a {}", R::SINGULAR),
                };
                RouteInfo {
                    kind: *kind,
                    method: kind.method(),
                    path,
                    auth_required: kind.requires_auth(),
                    success_status: kind.success_status(),
                    failure_statuses: kind.failure_statuses(),
                    summary,
                    tag: R::TAG,
                    title: R::TITLE,
                }
            })
            .collect()
    }
}

/// Registry for all resources of the application
///
/// Keeps registration order, which is also the order of the API docs.
#[derive(Default)]
pub struct ResourceRegistry {
    descriptors: IndexMap<&'static str, Box<dyn ResourceDescriptor>>,
}

impl ResourceRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a descriptor; a second one for the same path replaces the first
    pub fn register(&mut self, descriptor: Box<dyn ResourceDescriptor>) {
        self.descriptors.insert(descriptor.path(), descriptor);
    }

    pub fn register_resource<R: Resource>(&mut self) {
        self.register(Box::new(ResourceRoutes::<R>::new()));
    }

    /// Merge every resource's routes
    pub fn routes(&self) -> Router<AppState> {
        self.descriptors
            .values()
            .fold(Router::new(), |router, descriptor| {
                router.merge(descriptor.build_routes())
            })
    }

    /// Every route of every resource
    pub fn route_table(&self) -> Vec<RouteInfo> {
        self.descriptors
            .values()
            .flat_map(|descriptor| descriptor.route_info())
            .collect()
    }

    pub fn descriptors(&self) -> impl Iterator<Item = &dyn ResourceDescriptor> {
        self.descriptors.values().map(|d| d.as_ref())
    }

    pub fn paths(&self) -> Vec<&'static str> {
        self.descriptors.keys().copied().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }
}
