//! Shared fixtures for the HTTP-level tests
//!
//! Provides a fixed-identity auth provider, a store wrapper that counts calls
//! and can be switched to fail or drop acknowledgement, and request bodies for every resource.

#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::http::request::Parts;
use axum_test::TestServer;
use mongodb::bson::oid::ObjectId;
use mongodb::bson::{Bson, Document};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use nature_notes::prelude::*;

/// Every request resolves to the same identity
pub struct FixedIdentity(pub AuthContext);

impl FixedIdentity {
    pub fn user() -> Self {
        Self(AuthContext::User {
            subject: "108000000000000000001".to_string(),
            display_name: "Ada Hiker".to_string(),
            email: Some("ada@example.com".to_string()),
        })
    }

    pub fn anonymous() -> Self {
        Self(AuthContext::Anonymous)
    }
}

#[async_trait]
impl AuthProvider for FixedIdentity {
    async fn extract_context(&self, _parts: &Parts) -> Result<AuthContext> {
        Ok(self.0.clone())
    }
}

/// Per-operation call counters
#[derive(Default)]
pub struct Calls {
    pub find_all: AtomicUsize,
    pub find_by_id: AtomicUsize,
    pub insert: AtomicUsize,
    pub update: AtomicUsize,
    pub delete: AtomicUsize,
}

impl Calls {
    pub fn total(&self) -> usize {
        self.find_all.load(Ordering::SeqCst)
            + self.find_by_id.load(Ordering::SeqCst)
            + self.insert.load(Ordering::SeqCst)
            + self.update.load(Ordering::SeqCst)
            + self.delete.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.insert.load(Ordering::SeqCst)
            + self.update.load(Ordering::SeqCst)
            + self.delete.load(Ordering::SeqCst)
    }
}

/// In-memory store that records what reaches it
#[derive(Clone, Default)]
pub struct RecordingStore {
    inner: InMemoryStore,
    pub calls: Arc<Calls>,
    failing: Arc<AtomicBool>,
    unacknowledged: Arc<AtomicBool>,
    inserted: Arc<Mutex<Vec<Document>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every later call fails
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Later inserts report an unacknowledged write
    pub fn unacknowledged(&self) {
        self.unacknowledged.store(true, Ordering::SeqCst);
    }

    /// Last document handed to `insert`
    pub fn last_inserted(&self) -> Option<Document> {
        self.inserted.lock().unwrap().last().cloned()
    }

    fn check(&self) -> Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(anyhow!("connection reset by peer"));
        }
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for RecordingStore {
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>> {
        self.calls.find_all.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.find_all(collection).await
    }

    async fn find_by_id(&self, collection: &str, id: &ObjectId) -> Result<Option<Document>> {
        self.calls.find_by_id.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.find_by_id(collection, id).await
    }

    async fn insert(&self, collection: &str, document: Document) -> Result<InsertOutcome> {
        self.calls.insert.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inserted.lock().unwrap().push(document.clone());
        if self.unacknowledged.load(Ordering::SeqCst) {
            return Ok(InsertOutcome {
                acknowledged: false,
                inserted_id: ObjectId::new(),
            });
        }
        self.inner.insert(collection, document).await
    }

    async fn update_by_id(
        &self,
        collection: &str,
        id: &ObjectId,
        fields: Document,
    ) -> Result<UpdateOutcome> {
        self.calls.update.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.update_by_id(collection, id, fields).await
    }

    async fn delete_by_id(&self, collection: &str, id: &ObjectId) -> Result<DeleteOutcome> {
        self.calls.delete.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.delete_by_id(collection, id).await
    }

    async fn upsert_by_field(
        &self,
        collection: &str,
        field: &str,
        value: Bson,
        fields: Document,
    ) -> Result<()> {
        self.check()?;
        self.inner
            .upsert_by_field(collection, field, value, fields)
            .await
    }

    async fn ping(&self) -> Result<()> {
        self.check()?;
        self.inner.ping().await
    }
}

/// Server with every default resource and the given identity
pub fn server_with(store: RecordingStore, identity: FixedIdentity) -> TestServer {
    let app = ServerBuilder::new()
        .with_store(store)
        .with_auth_provider(identity)
        .with_default_resources()
        .build()
        .unwrap();
    TestServer::new(app)
}

/// Signed-in server plus a handle on its store
pub fn signed_in() -> (TestServer, RecordingStore) {
    let store = RecordingStore::new();
    (server_with(store.clone(), FixedIdentity::user()), store)
}

/// Anonymous server plus a handle on its store
pub fn anonymous() -> (TestServer, RecordingStore) {
    let store = RecordingStore::new();
    (server_with(store.clone(), FixedIdentity::anonymous()), store)
}

/// Well-formed id that no record uses
pub const ABSENT_ID: &str = "000000000000000000000000";

pub fn trail_body() -> Value {
    json!({
        "name": "Ridge Loop",
        "location": "Blue Hills",
        "distance_miles": 4.2,
        "difficulty": "Moderate",
        "type": "Loop",
        "elevation_gain_ft": 850,
    })
}

pub fn sighting_body() -> Value {
    json!({
        "species": "Moose",
        "location": "North meadow",
        "date": "2024-06-01",
        "time": "06:30",
        "observer": "ada",
        "count": 2,
        "trailId": "654321654321654321654321",
    })
}

pub fn gear_body() -> Value {
    json!({
        "name": "Pack",
        "type": "Backpack",
        "brand": "X",
        "weightOz": "20",
        "category": "Hiking",
        "condition": "New",
        "owner": "a",
        "purchaseDate": "2024-01-01",
        "favorite": "true",
        "notes": "n",
    })
}

pub fn hiker_body() -> Value {
    json!({
        "firstName": "Ada",
        "lastName": "Lovelace",
        "username": "ada",
        "email": "ada@example.com",
        "location": "London",
        "memberSince": "2020-05-01",
        "isAdmin": false,
    })
}

/// `(path, singular, title, valid create body)` for every resource
pub fn resources() -> Vec<(&'static str, &'static str, &'static str, Value)> {
    vec![
        ("trails", "trail", "Trail", trail_body()),
        ("wildlife", "sighting", "Sighting", sighting_body()),
        ("gear", "gear", "Gear", gear_body()),
        ("hikers", "hiker", "Hiker", hiker_body()),
    ]
}

/// POST a valid body and return the new id
pub async fn create(server: &TestServer, path: &str, body: &Value) -> String {
    let response = server.post(&format!("/{}", path)).json(body).await;
    response.assert_status(axum::http::StatusCode::CREATED);
    let created: Value = response.json();
    created["id"].as_str().unwrap().to_string()
}
