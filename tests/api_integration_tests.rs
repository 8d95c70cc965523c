//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for each endpoint.

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use serde_json::Value;
use storefront_cache::api::create_router;
use storefront_cache::tasks::{InventorySource, RowScheduler, RowTick};
use storefront_cache::{AppState, MemoryStore};
use tower::ServiceExt;

// == Helper Functions ==

fn create_test_app() -> (MemoryStore, Router) {
    let store = MemoryStore::new();
    let app = create_router(AppState::new(store.clone()));
    (store, app)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    (status, body_to_json(response.into_body()).await)
}

// == Token Endpoint Tests ==

#[tokio::test]
async fn test_token_update_and_lookup() {
    let (_store, app) = create_test_app();

    let (status, json) = send(
        &app,
        "POST",
        "/tokens",
        Some(r#"{"token":"t1","user":"alice","item":"itemX"}"#),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["user"], "alice");

    let (status, json) = send(&app, "GET", "/tokens/t1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["token"], "t1");
    assert_eq!(json["user"], "alice");
}

#[tokio::test]
async fn test_token_empty_rejected() {
    let (_store, app) = create_test_app();

    let (status, json) = send(&app, "POST", "/tokens", Some(r#"{"token":"","user":"alice"}"#)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json["error"].as_str().unwrap().contains("Token"));
}

#[tokio::test]
async fn test_token_malformed_json() {
    let (_store, app) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/tokens")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_client_error());
}

// == Cart Endpoint Tests ==

#[tokio::test]
async fn test_cart_add_and_remove() {
    let (_store, app) = create_test_app();

    let (status, json) = send(&app, "PUT", "/carts/t1", Some(r#"{"item":"itemY","count":3}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["items"]["itemY"], 3);

    let (_, json) = send(&app, "PUT", "/carts/t1", Some(r#"{"item":"itemY","count":0}"#)).await;
    assert!(json["items"].as_object().unwrap().is_empty());

    let (status, json) = send(&app, "GET", "/carts/t1", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["items"].as_object().unwrap().is_empty());
}

// == Row Endpoint Tests ==

#[tokio::test]
async fn test_row_schedule_and_publish() {
    let (store, app) = create_test_app();

    let (status, json) = send(&app, "PUT", "/rows/itemX/schedule", Some(r#"{"interval":5}"#)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cancelled"], false);

    let (status, _) = send(&app, "GET", "/rows/itemX", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let scheduler = RowScheduler::new(store.handle(), InventorySource);
    assert_eq!(
        scheduler.tick().await.unwrap(),
        RowTick::Refreshed("itemX".to_string())
    );

    let (status, json) = send(&app, "GET", "/rows/itemX", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["interval"], 5);
    assert!(json["popularity"].is_null());
    let row: Value = serde_json::from_str(json["content"].as_str().unwrap()).unwrap();
    assert_eq!(row["id"], "itemX");
    assert!(row["time"].as_i64().is_some());
}

// == Page Endpoint Tests ==

#[tokio::test]
async fn test_page_cached_for_popular_item() {
    let (store, app) = create_test_app();
    send(
        &app,
        "POST",
        "/tokens",
        Some(r#"{"token":"t1","user":"alice","item":"itemX"}"#),
    )
    .await;
    let keys_before = store.key_count().await;

    let (status, json) = send(&app, "GET", "/page?request=http%3A%2F%2Ftest.com%2F%3Fitem%3DitemX", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cacheable"], true);
    assert_eq!(json["content"], "content for http://test.com/?item=itemX");
    assert_eq!(store.key_count().await, keys_before + 1);
}

#[tokio::test]
async fn test_page_with_cache_buster_not_cached() {
    let (store, app) = create_test_app();
    send(
        &app,
        "POST",
        "/tokens",
        Some(r#"{"token":"t1","user":"alice","item":"itemX"}"#),
    )
    .await;
    let keys_before = store.key_count().await;

    let (status, json) = send(
        &app,
        "GET",
        "/page?request=http%3A%2F%2Ftest.com%2F%3Fitem%3DitemX%26_%3D1234536",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["cacheable"], false);
    assert_eq!(store.key_count().await, keys_before);
}

// == Stats and Health ==

#[tokio::test]
async fn test_stats_reports_sessions() {
    let (_store, app) = create_test_app();
    send(&app, "POST", "/tokens", Some(r#"{"token":"a","user":"u","item":"itemX"}"#)).await;
    send(&app, "POST", "/tokens", Some(r#"{"token":"b","user":"u"}"#)).await;

    let (status, json) = send(&app, "GET", "/stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["active_sessions"], 2);
    assert_eq!(json["due_rows"], 0);
    assert_eq!(json["top_items"][0]["item"], "itemX");
    assert_eq!(json["top_items"][0]["score"], -1.0);
    assert!(json.get("hit_rate").is_some());
}

#[tokio::test]
async fn test_health_endpoint() {
    let (_store, app) = create_test_app();

    let (status, json) = send(&app, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

#[tokio::test]
async fn test_unknown_route() {
    let (_store, app) = create_test_app();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/nope")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
