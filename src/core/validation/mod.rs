//! Validation and normalisation of request bodies
//!
//! Rule tables are plain data ([`rules`]); coercion lives in [`filters`],
//! predicates in [`validators`] and the axum integration in [`extractor`].

pub mod extractor;
pub mod filters;
pub mod rules;
pub mod validators;

pub use extractor::ValidatedBody;
pub use rules::{FieldKind, FieldRule, Operation, RuleSet};
