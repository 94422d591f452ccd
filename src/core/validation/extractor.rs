//! Axum extractor for validated request bodies
//!
//! [`ValidatedBody`] reads the JSON body, picks the operation from the HTTP
//! method and runs the resource's rule table, so handlers only ever see a
//! normalised document.

use std::marker::PhantomData;

use axum::{
    Json,
    extract::{FromRequest, Request},
    http::Method,
};
use mongodb::bson::Document;
use serde_json::Value;

use super::rules::Operation;
use crate::core::error::ApiError;
use crate::core::resource::Resource;

/// Validated, normalised body for resource `R`
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_record<R: Resource>(
///     State(state): State<AppState>,
///     body: ValidatedBody<R>,
/// ) -> ApiResult<impl IntoResponse> {
///     state.store.insert(R::COLLECTION, body.into_inner()).await
/// }
/// ```
#[derive(Debug)]
pub struct ValidatedBody<R> {
    document: Document,
    _resource: PhantomData<R>,
}

impl<R> ValidatedBody<R> {
    pub fn new(document: Document) -> Self {
        Self {
            document,
            _resource: PhantomData,
        }
    }

    /// Get the normalised document
    pub fn into_inner(self) -> Document {
        self.document
    }
}

impl<R> std::ops::Deref for ValidatedBody<R> {
    type Target = Document;

    fn deref(&self) -> &Self::Target {
        &self.document
    }
}

/// Operation implied by the request method
pub fn operation_for(method: &Method) -> Operation {
    if method == Method::PUT || method == Method::PATCH {
        Operation::Update
    } else {
        Operation::Create
    }
}

impl<S, R> FromRequest<S> for ValidatedBody<R>
where
    S: Send + Sync,
    R: Resource,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let operation = operation_for(req.method());

        let Json(payload): Json<Value> = Json::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::InvalidJson {
                message: rejection.body_text(),
            })?;

        let document = R::rules().validate(&payload, operation)?;
        Ok(Self::new(document))
    }
}
