//! MongoDB storage backend using the official MongoDB async driver.
//!
//! # Storage model
//!
//! One collection per resource (`trails`, `wildlife`, `gear`, `hikers`) plus
//! the `users` collection written at sign-in. Documents are stored exactly as
//! the validator produced them: doubles, int64s, booleans and `ObjectId`
//! references keep their BSON types, and `_id` is a driver-generated
//! `ObjectId`.

use crate::core::store::{DeleteOutcome, DocumentStore, InsertOutcome, UpdateOutcome};
use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document, doc};
use mongodb::options::{Acknowledgment, WriteConcern};
use mongodb::{Client, Collection, Database};

/// Document store backed by a MongoDB database.
///
/// # Example
///
/// ```rust,ignore
/// use nature_notes::storage::MongoStore;
///
/// let store = MongoStore::connect("mongodb://localhost:27017", "nature_notes").await?;
/// let trails = store.find_all("trails").await?;
/// ```
#[derive(Clone, Debug)]
pub struct MongoStore {
    database: Database,
}

impl MongoStore {
    /// Wrap an existing database handle.
    pub fn new(database: Database) -> Self {
        Self { database }
    }

    /// Build a client from a connection string and select a database.
    ///
    /// The driver connects lazily; call [`DocumentStore::ping`] to check
    /// the server is reachable.
    pub async fn connect(uri: &str, database: &str) -> Result<Self> {
        let client = Client::with_uri_str(uri)
            .await
            .context("Failed to parse MongoDB connection string")?;
        Ok(Self::new(client.database(database)))
    }

    fn collection(&self, name: &str) -> Collection<Document> {
        self.database.collection(name)
    }
}

#[async_trait]
impl DocumentStore for MongoStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        let cursor = self
            .collection(collection)
            .find(doc! {})
            .await
            .map_err(|e| anyhow!("Failed to query {}: {}", collection, e))?;

        cursor
            .try_collect()
            .await
            .map_err(|e| anyhow!("Failed to collect {}: {}", collection, e))
    }

    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>> {
        self.collection(collection)
            .find_one(doc! { "_id": id })
            .await
            .map_err(|e| anyhow!("Failed to get document from {}: {}", collection, e))
    }

    /// The `_id` is generated client-side when absent.
    ///
    /// `acknowledged` follows the collection's write concern: with `w: 0`
    /// the driver returns before the server confirms the write, so the
    /// outcome is reported as unacknowledged.
    async fn insert(&self, collection: &str, mut document: Document) -> Result<InsertOutcome> {
        let id = match document.get("_id") {
            Some(Bson::ObjectId(id)) => *id,
            Some(other) => return Err(anyhow!("Unsupported _id type: {:?}", other.element_type())),
            None => {
                let id = ObjectId::new();
                document.insert("_id", id);
                id
            }
        };

        let target = self.collection(collection);
        target
            .insert_one(document)
            .await
            .map_err(|e| anyhow!("Failed to insert into {}: {}", collection, e))?;

        Ok(InsertOutcome {
            acknowledged: is_acknowledged(target.write_concern()),
            inserted_id: id,
        })
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome> {
        let result = self
            .collection(collection)
            .update_one(doc! { "_id": id }, doc! { "$set": fields })
            .await
            .map_err(|e| anyhow!("Failed to update document in {}: {}", collection, e))?;

        Ok(UpdateOutcome {
            matched_count: result.matched_count,
            modified_count: result.modified_count,
        })
    }

    async fn delete_by_id(&self, collection: &str, id: &ObjectId) -> Result<DeleteOutcome> {
        let result = self
            .collection(collection)
            .delete_one(doc! { "_id": id })
            .await
            .map_err(|e| anyhow!("Failed to delete document from {}: {}", collection, e))?;

        Ok(DeleteOutcome {
            deleted_count: result.deleted_count,
        })
    }

    async fn upsert_by_field(
        &self,
        collection: &str,
        field: &str,
        value: Bson,
        fields: Document,
    ) -> Result<()> {
        self.collection(collection)
            .update_one(doc! { field: value }, doc! { "$set": fields })
            .upsert(true)
            .await
            .map_err(|e| anyhow!("Failed to upsert into {}: {}", collection, e))?;
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.database
            .run_command(doc! { "ping": 1 })
            .await
            .map_err(|e| anyhow!("MongoDB ping failed: {}", e))?;
        Ok(())
    }
}

/// Unacknowledged only when the concern asks for no confirmation (`w: 0`).
fn is_acknowledged(concern: Option<&WriteConcern>) -> bool {
    !matches!(
        concern.and_then(|c| c.w.as_ref()),
        Some(Acknowledgment::Nodes(0))
    )
}
