#![allow(unused)]
//! Postgres document store tests.
//!
//! These need a reachable database; set `ROSTER__DATABASE__TEST_DATABASE_URL`
//! to run them. Each test works in its own collection so they can share one
//! database.

mod support;

use axum::http::{Method, StatusCode};
use roster::{
    config::{Config, UpdatePolicy},
    db::{DocumentStore, PostgresDocumentStore},
    Error,
};
use serde_json::{json, Map, Value as JsonValue};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use support::*;

fn test_database_url() -> Option<String> {
    std::env::var("ROSTER__DATABASE__TEST_DATABASE_URL")
        .ok()
        .filter(|url| !url.trim().is_empty())
}

async fn postgres_store() -> anyhow::Result<Option<PostgresDocumentStore>> {
    let Some(url) = test_database_url() else {
        eprintln!("ROSTER__DATABASE__TEST_DATABASE_URL not set; skipping Postgres test");
        return Ok(None);
    };
    let pool = PgPoolOptions::new().max_connections(4).connect(&url).await?;
    let store = PostgresDocumentStore::new(pool);
    store.prepare().await?;
    Ok(Some(store))
}

fn fresh_collection() -> String {
    format!("test_{}", uuid::Uuid::new_v4().simple())
}

fn body(value: JsonValue) -> Map<String, JsonValue> {
    match value {
        JsonValue::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[tokio::test]
async fn insert_then_find_all_in_insertion_order() -> anyhow::Result<()> {
    let Some(store) = postgres_store().await? else {
        return Ok(());
    };
    let collection = fresh_collection();

    let first = store
        .insert(&collection, body(json!({ "firstName": "Ada", "phone": null })))
        .await?;
    let second = store
        .insert(&collection, body(json!({ "firstName": "Grace" })))
        .await?;

    assert!(first.body.get("phone").is_none(), "nulls are not stored");

    let all = store.find_all(&collection).await?;
    let ids: Vec<_> = all.iter().map(|d| d.id).collect();
    assert_eq!(ids, vec![first.id, second.id]);

    assert!(store.find_all(&fresh_collection()).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn update_overwrites_keys_and_removes_nulls() -> anyhow::Result<()> {
    let Some(store) = postgres_store().await? else {
        return Ok(());
    };
    let collection = fresh_collection();

    let created = store
        .insert(
            &collection,
            body(json!({ "firstName": "Ada", "lastName": "Lovelace", "phone": 123 })),
        )
        .await?;

    let updated = store
        .update_by_id(
            &collection,
            &created.id.to_string(),
            body(json!({ "firstName": "Grace", "phone": null })),
        )
        .await?
        .expect("document exists");

    assert_eq!(
        JsonValue::Object(updated.body),
        json!({ "firstName": "Grace", "lastName": "Lovelace" })
    );
    assert!(updated.updated_at >= created.updated_at);
    Ok(())
}

#[tokio::test]
async fn unknown_and_malformed_ids() -> anyhow::Result<()> {
    let Some(store) = postgres_store().await? else {
        return Ok(());
    };
    let collection = fresh_collection();
    let unknown = "00000000-0000-4000-8000-000000000000";

    assert!(store
        .update_by_id(&collection, unknown, body(json!({ "firstName": "x" })))
        .await?
        .is_none());
    assert!(store.delete_by_id(&collection, unknown).await?.is_none());

    let err = store
        .delete_by_id(&collection, "not-a-valid-id")
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidId(_)));
    Ok(())
}

#[tokio::test]
async fn delete_is_scoped_to_the_collection() -> anyhow::Result<()> {
    let Some(store) = postgres_store().await? else {
        return Ok(());
    };
    let users = fresh_collection();
    let others = fresh_collection();

    let doc = store
        .insert(&users, body(json!({ "firstName": "Ada" })))
        .await?;
    let id = doc.id.to_string();

    assert!(store.delete_by_id(&others, &id).await?.is_none());
    assert_eq!(store.find_all(&users).await?.len(), 1);

    let deleted = store.delete_by_id(&users, &id).await?.expect("deleted");
    assert_eq!(deleted.id, doc.id);
    assert!(store.find_all(&users).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn crud_over_http_against_postgres() -> anyhow::Result<()> {
    let Some(store) = postgres_store().await? else {
        return Ok(());
    };
    // The users collection is shared, so only assert on the record created here.
    let app = TestApp::with_store(test_config(), Arc::new(store));

    let id = app
        .create_user_returning_id(&json!({ "firstName": "Ada", "lastName": "Lovelace", "phone": 123 }))
        .await?;

    let (_status, _headers, body) = app
        .request(
            Method::PATCH,
            &format!("/users/{id}"),
            Some(to_json_body(&json!({ "firstName": "Grace" }))?),
        )
        .await?;
    assert_envelope(&parse_envelope(&body)?, "SUCCESS", "User updated successfully");

    let users = app.list_users().await?;
    let user = users
        .iter()
        .find(|u| user_id(u) == id)
        .expect("updated user is listed");
    assert_eq!(user, &json!({ "id": id, "firstName": "Grace" }));

    let (status, _headers, body) = app
        .request(Method::DELETE, &format!("/users/{id}"), None)
        .await?;
    assert_status(status, StatusCode::OK, "delete");
    assert_envelope(&parse_envelope(&body)?, "SUCCESS", "User deleted successfully");
    assert!(!app.list_users().await?.iter().any(|u| user_id(u) == id));

    Ok(())
}
