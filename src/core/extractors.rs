//! Axum extractors for record routes

use std::marker::PhantomData;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use mongodb::bson::oid::ObjectId;

use crate::core::error::ApiError;
use crate::core::id;
use crate::core::resource::Resource;

/// Decoded `{id}` path segment of resource `R`
///
/// Rejects with [`ApiError::InvalidId`] before the body is read or the store
/// is touched.
#[derive(Debug, Clone, Copy)]
pub struct RecordPath<R> {
    pub id: ObjectId,
    _resource: PhantomData<R>,
}

impl<R> RecordPath<R> {
    pub fn new(id: ObjectId) -> Self {
        Self {
            id,
            _resource: PhantomData,
        }
    }

    /// Lowercase hex form for logs and responses
    pub fn encoded(&self) -> String {
        id::encode(&self.id)
    }
}

impl<S, R> FromRequestParts<S> for RecordPath<R>
where
    S: Send + Sync,
    R: Resource,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let invalid = || ApiError::InvalidId {
            resource: R::SINGULAR,
        };

        let Path(token) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| invalid())?;

        match id::decode(&token) {
            Some(id) => Ok(Self::new(id)),
            None => {
                tracing::debug!(resource = R::SINGULAR, token = %token, "rejected malformed id");
                Err(invalid())
            }
        }
    }
}
