//! Google sign-in and session handling
//!
//! The identity provider is an external collaborator: it only produces a
//! session, and the rest of the API sees nothing but the resolved
//! [`AuthContext`](crate::core::AuthContext).

pub mod google;
pub mod middleware;
pub mod routes;
pub mod session;

pub use google::{GoogleOAuth, GoogleProfile, OAuthError};
pub use middleware::{SessionAuthProvider, require_auth, resolve_identity};
pub use routes::auth_routes;
pub use session::{SessionStore, SessionUser};
