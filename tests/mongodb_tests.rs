//! MongoDB store against a real server
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a MongoDB container)
//! - Feature flag `mongodb_integration` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features mongodb_integration --test mongodb_tests -- --test-threads=1
//! ```
//!
//! All tests share one container; each test gets its own database.

#![cfg(feature = "mongodb_integration")]

mod common;

use axum::http::StatusCode;
use axum_test::TestServer;
use common::*;
use mongodb::Client;
use mongodb::bson::{Bson, doc, oid::ObjectId};
use nature_notes::prelude::*;
use serde_json::{Value, json};
use std::sync::OnceLock;
use std::sync::atomic::{AtomicU64, Ordering};
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::mongo::Mongo;

struct MongoTestEnv {
    /// Dropping this stops the container
    _container: testcontainers::ContainerAsync<Mongo>,
    connection_url: String,
}

static TEST_ENV: OnceLock<MongoTestEnv> = OnceLock::new();
static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

async fn init_mongo_env() -> &'static MongoTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Mongo::default()
        .start()
        .await
        .expect("Failed to start MongoDB container; is Docker running?");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(27017).await.unwrap();

    let _ = TEST_ENV.set(MongoTestEnv {
        _container: container,
        connection_url: format!("mongodb://{}:{}", host, port),
    });
    TEST_ENV.get().unwrap()
}

/// Store over a fresh database
async fn mongo_store() -> MongoStore {
    let env = init_mongo_env().await;
    let client = Client::with_uri_str(&env.connection_url)
        .await
        .expect("Failed to connect to MongoDB");
    let db_num = DB_COUNTER.fetch_add(1, Ordering::SeqCst);
    MongoStore::new(client.database(&format!("nature_notes_test_{}", db_num)))
}

// ---------------------------------------------------------------------------
// Store contract
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_ping() {
    let store = mongo_store().await;
    store.ping().await.unwrap();
}

#[tokio::test]
async fn test_insert_keeps_bson_types() {
    let store = mongo_store().await;
    let trail = ObjectId::new();

    let outcome = store
        .insert(
            "wildlife",
            doc! { "species": "Heron", "count": 3_i64, "trailId": trail, "seen": true },
        )
        .await
        .unwrap();
    assert!(outcome.acknowledged);

    let stored = store
        .find_by_id("wildlife", &outcome.inserted_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.get_object_id("_id").unwrap(), outcome.inserted_id);
    assert_eq!(stored.get_i64("count").unwrap(), 3);
    assert_eq!(stored.get_object_id("trailId").unwrap(), trail);
    assert!(stored.get_bool("seen").unwrap());
}

#[tokio::test]
async fn test_update_and_delete_counts() {
    let store = mongo_store().await;
    let id = store
        .insert("gear", doc! { "name": "Stove", "weightOz": 12.5 })
        .await
        .unwrap()
        .inserted_id;

    let outcome = store
        .update_by_id("gear", &id, doc! { "weightOz": 11.0 })
        .await
        .unwrap();
    assert_eq!((outcome.matched_count, outcome.modified_count), (1, 1));

    let outcome = store
        .update_by_id("gear", &id, doc! { "weightOz": 11.0 })
        .await
        .unwrap();
    assert_eq!((outcome.matched_count, outcome.modified_count), (1, 0));

    let stored = store.find_by_id("gear", &id).await.unwrap().unwrap();
    assert_eq!(stored.get_str("name").unwrap(), "Stove");

    let missing = ObjectId::new();
    let outcome = store
        .update_by_id("gear", &missing, doc! { "name": "x" })
        .await
        .unwrap();
    assert_eq!(outcome.matched_count, 0);

    assert_eq!(store.delete_by_id("gear", &id).await.unwrap().deleted_count, 1);
    assert_eq!(store.delete_by_id("gear", &id).await.unwrap().deleted_count, 0);
    assert!(store.find_by_id("gear", &id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_upsert_by_field() {
    let store = mongo_store().await;
    let key = Bson::String("google-1".to_string());

    store
        .upsert_by_field("users", "googleId", key.clone(), doc! { "fullName": "Ada" })
        .await
        .unwrap();
    store
        .upsert_by_field("users", "googleId", key, doc! { "fullName": "Ada L." })
        .await
        .unwrap();

    let users = store.find_all("users").await.unwrap();
    assert_eq!(users.len(), 1);
    assert_eq!(users[0].get_str("googleId").unwrap(), "google-1");
    assert_eq!(users[0].get_str("fullName").unwrap(), "Ada L.");
}

// ---------------------------------------------------------------------------
// HTTP round trip
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_rest_round_trip_over_mongodb() {
    let app = ServerBuilder::new()
        .with_store(mongo_store().await)
        .with_auth_provider(FixedIdentity::user())
        .with_default_resources()
        .build()
        .unwrap();
    let server = TestServer::new(app);

    let id = create(&server, "gear", &gear_body()).await;

    let gear: Value = server.get(&format!("/gear/{}", id)).await.json();
    assert_eq!(gear["_id"], id.as_str());
    assert_eq!(gear["weightOz"].as_f64(), Some(20.0));
    assert_eq!(gear["favorite"], json!(true));

    server
        .put(&format!("/gear/{}", id))
        .json(&json!({ "condition": "Worn" }))
        .await
        .assert_status_ok();

    let listed: Vec<Value> = server.get("/gear").await.json();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0]["condition"], "Worn");

    server
        .delete(&format!("/gear/{}", id))
        .await
        .assert_status(StatusCode::NO_CONTENT);
    server
        .get(&format!("/gear/{}", id))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    server
        .get("/health")
        .await
        .assert_json(&json!({ "status": "ok", "store": "ok" }));
}
