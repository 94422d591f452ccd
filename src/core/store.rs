//! Store adapter trait
//!
//! The document database is an external collaborator. Handlers only see this
//! trait: one collection-scoped call per request, no transactions, no retries.

use anyhow::Result;
use async_trait::async_trait;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use serde_json::{Map, Number, Value};

/// Result of an insert
#[derive(Debug, Clone, PartialEq)]
pub struct InsertOutcome {
    /// Whether the store confirmed the write
    pub acknowledged: bool,
    pub inserted_id: ObjectId,
}

/// Result of a partial update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched_count: u64,
    pub modified_count: u64,
}

/// Result of a delete
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeleteOutcome {
    pub deleted_count: u64,
}

/// Collection-scoped document store
///
/// Implementations are shared across requests behind an `Arc` and must be
/// safe to call concurrently. Per-document atomicity is the only isolation
/// guarantee; concurrent updates to one record are last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Every document of a collection, in store-native order
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>>;

    /// One document by key
    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>>;

    /// Insert a document; the store assigns `_id` when absent
    async fn insert(&self, collection: &str, document: Document) -> Result<InsertOutcome>;

    /// Replace the given fields of one document (`$set` semantics)
    async fn update_by_id(
        &self,
        collection: &str,
        id: &ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome>;

    /// Hard delete of one document
    async fn delete_by_id(&self, collection: &str, id: &ObjectId) -> Result<DeleteOutcome>;

    /// Set `fields` on the document whose `field` equals `value`, inserting it if missing
    async fn upsert_by_field(
        &self,
        collection: &str,
        field: &str,
        value: Bson,
        fields: Document,
    ) -> Result<()>;

    /// Cheap connectivity check
    async fn ping(&self) -> Result<()>;
}

/// Render a stored document as client JSON
///
/// Object ids become lowercase hex strings and datetimes RFC 3339 strings, so
/// responses never carry extended-JSON wrappers.
pub fn document_to_json(document: Document) -> Value {
    let map: Map<String, Value> = document
        .into_iter()
        .map(|(key, value)| (key, bson_to_json(value)))
        .collect();
    Value::Object(map)
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(id) => Value::String(id.to_hex()),
        Bson::String(s) => Value::String(s),
        Bson::Boolean(b) => Value::Bool(b),
        Bson::Int32(i) => Value::from(i),
        Bson::Int64(i) => Value::from(i),
        Bson::Double(f) => Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null),
        Bson::Null | Bson::Undefined => Value::Null,
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        Bson::Document(inner) => document_to_json(inner),
        Bson::DateTime(dt) => match dt.try_to_rfc3339_string() {
            Ok(s) => Value::String(s),
            Err(_) => Value::from(dt.timestamp_millis()),
        },
        other => other.into_relaxed_extjson(),
    }
}
