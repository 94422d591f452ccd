//! Core module containing the fundamental traits and types of the API

pub mod auth;
pub mod error;
pub mod extractors;
pub mod id;
pub mod resource;
pub mod store;
pub mod validation;

pub use auth::{AuthContext, AuthPolicy, AuthProvider, NoAuthProvider};
pub use error::{ApiError, ApiResult, ErrorResponse, FieldValidationError};
pub use extractors::RecordPath;
pub use resource::Resource;
pub use store::{DeleteOutcome, DocumentStore, InsertOutcome, UpdateOutcome, document_to_json};
pub use validation::{FieldKind, FieldRule, Operation, RuleSet, ValidatedBody};
