//! In-memory implementation of DocumentStore for testing and development

use crate::core::store::{DeleteOutcome, DocumentStore, InsertOutcome, UpdateOutcome};
use anyhow::{Result, anyhow};
use async_trait::async_trait;
use indexmap::IndexMap;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

type Collections = HashMap<String, IndexMap<ObjectId, Document>>;

/// In-memory document store
///
/// Collections keep insertion order. Uses RwLock for thread-safe access.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    collections: Arc<RwLock<Collections>>,
}

impl InMemoryStore {
    /// Create a new, empty in-memory store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of documents in a collection
    pub fn len(&self, collection: &str) -> Result<usize> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections.get(collection).map_or(0, IndexMap::len))
    }
}

#[async_trait]
impl DocumentStore for InMemoryStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections
            .get(collection)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>> {
        let collections = self
            .collections
            .read()
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))?;

        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn insert(&self, collection: &str, mut document: Document) -> Result<InsertOutcome> {
        let id = match document.get("_id") {
            Some(Bson::ObjectId(id)) => *id,
            Some(other) => return Err(anyhow!("Unsupported _id type: {:?}", other.element_type())),
            None => ObjectId::new(),
        };

        // _id goes first, like a server-assigned key
        document.remove("_id");
        let mut stored = Document::new();
        stored.insert("_id", id);
        stored.extend(document);

        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let docs = collections.entry(collection.to_string()).or_default();
        if docs.contains_key(&id) {
            return Err(anyhow!("Duplicate key {} in {}", id, collection));
        }
        docs.insert(id, stored);

        Ok(InsertOutcome {
            acknowledged: true,
            inserted_id: id,
        })
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let Some(existing) = collections.get_mut(collection).and_then(|docs| docs.get_mut(id))
        else {
            return Ok(UpdateOutcome {
                matched_count: 0,
                modified_count: 0,
            });
        };

        let mut modified = false;
        for (key, value) in fields {
            if key == "_id" {
                continue;
            }
            if existing.get(&key) != Some(&value) {
                existing.insert(key, value);
                modified = true;
            }
        }

        Ok(UpdateOutcome {
            matched_count: 1,
            modified_count: u64::from(modified),
        })
    }

    async fn delete_by_id(&self, collection: &str, id: &ObjectId) -> Result<DeleteOutcome> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let removed = collections
            .get_mut(collection)
            .and_then(|docs| docs.shift_remove(id));

        Ok(DeleteOutcome {
            deleted_count: u64::from(removed.is_some()),
        })
    }

    async fn upsert_by_field(
        &self,
        collection: &str,
        field: &str,
        value: Bson,
        fields: Document,
    ) -> Result<()> {
        let mut collections = self
            .collections
            .write()
            .map_err(|e| anyhow!("Failed to acquire write lock: {}", e))?;

        let docs = collections.entry(collection.to_string()).or_default();

        if let Some(existing) = docs.values_mut().find(|doc| doc.get(field) == Some(&value)) {
            existing.extend(fields);
            return Ok(());
        }

        let id = ObjectId::new();
        let mut stored = Document::new();
        stored.insert("_id", id);
        stored.insert(field, value);
        stored.extend(fields);
        docs.insert(id, stored);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.collections
            .read()
            .map(|_| ())
            .map_err(|e| anyhow!("Failed to acquire read lock: {}", e))
    }
}
