//! Generic CRUD handlers
//!
//! One set of handlers serves every [`Resource`]. Each request runs at most
//! one store call; id decoding and body validation happen in the extractors
//! before the handler body starts.

use anyhow::anyhow;
use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::core::error::{ApiError, ApiResult};
use crate::core::extractors::RecordPath;
use crate::core::id;
use crate::core::resource::Resource;
use crate::core::store::document_to_json;
use crate::core::validation::ValidatedBody;
use crate::server::state::AppState;

/// Message for mutation failures without a more specific context
const UNEXPECTED: &str = "Unexpected error.";

/// `GET /{R}`: every record of the collection
pub async fn list_records<R: Resource>(State(state): State<AppState>) -> ApiResult<Json<Value>> {
    let documents = state
        .store
        .find_all(R::COLLECTION)
        .await
        .map_err(|e| ApiError::store(format!("Fetching {} failed.", R::PLURAL), e))?;

    tracing::debug!(resource = R::PATH, count = documents.len(), "listed records");

    Ok(Json(Value::Array(
        documents.into_iter().map(document_to_json).collect(),
    )))
}

/// `GET /{R}/{id}`
pub async fn get_record<R: Resource>(
    State(state): State<AppState>,
    path: RecordPath<R>,
) -> ApiResult<Json<Value>> {
    let document = state
        .store
        .find_by_id(R::COLLECTION, &path.id)
        .await
        .map_err(|e| ApiError::store(format!("Fetching {} failed.", R::SINGULAR), e))?
        .ok_or(ApiError::NotFound { resource: R::TITLE })?;

    tracing::debug!(resource = R::PATH, id = %path.encoded(), "fetched record");
    Ok(Json(document_to_json(document)))
}

/// `POST /{R}`: 201 with the generated id
pub async fn create_record<R: Resource>(
    State(state): State<AppState>,
    body: ValidatedBody<R>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let outcome = state
        .store
        .insert(R::COLLECTION, body.into_inner())
        .await
        .map_err(|e| ApiError::store(UNEXPECTED, e))?;

    if !outcome.acknowledged {
        return Err(ApiError::store(
            format!("Failed to create {}.", R::SINGULAR),
            anyhow!("insert into {} was not acknowledged", R::COLLECTION),
        ));
    }

    let id = id::encode(&outcome.inserted_id);
    tracing::info!(resource = R::PATH, id = %id, "created record");

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}

/// `PUT /{R}/{id}`: partial update, untouched fields keep their values
pub async fn update_record<R: Resource>(
    State(state): State<AppState>,
    path: RecordPath<R>,
    body: ValidatedBody<R>,
) -> ApiResult<Json<Value>> {
    let outcome = state
        .store
        .update_by_id(R::COLLECTION, &path.id, body.into_inner())
        .await
        .map_err(|e| ApiError::store(UNEXPECTED, e))?;

    if outcome.matched_count == 0 {
        return Err(ApiError::NotFound { resource: R::TITLE });
    }

    tracing::info!(
        resource = R::PATH,
        id = %path.encoded(),
        modified = outcome.modified_count,
        "updated record"
    );

    Ok(Json(json!({
        "message": format!("{} updated successfully.", R::TITLE)
    })))
}

/// `DELETE /{R}/{id}`: 204 with an empty body
pub async fn delete_record<R: Resource>(
    State(state): State<AppState>,
    path: RecordPath<R>,
) -> ApiResult<StatusCode> {
    let outcome = state
        .store
        .delete_by_id(R::COLLECTION, &path.id)
        .await
        .map_err(|e| ApiError::store(UNEXPECTED, e))?;

    if outcome.deleted_count == 0 {
        return Err(ApiError::NotFound { resource: R::TITLE });
    }

    tracing::info!(resource = R::PATH, id = %path.encoded(), "deleted record");
    Ok(StatusCode::NO_CONTENT)
}
