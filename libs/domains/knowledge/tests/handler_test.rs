//! Handler tests for the knowledge API
//!
//! These exercise the HTTP layer against the in-memory store:
//! - request validation and error envelopes
//! - status codes for missing collections
//! - response bodies for create, add and search

use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use domain_knowledge::{
    HashingProvider, InMemoryVectorRepository, KnowledgeOptions, KnowledgeService, router,
};
use http_body_util::BodyExt;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tower::ServiceExt;

async fn app() -> Router {
    let service = KnowledgeService::initialize(
        Arc::new(InMemoryVectorRepository::new()),
        Arc::new(HashingProvider::default()),
        KnowledgeOptions::default(),
    )
    .await
    .unwrap();
    router(Arc::new(service))
}

async fn json_body<T: DeserializeOwned>(body: Body) -> T {
    let bytes = body.collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn post(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    (status, json_body(response.into_body()).await)
}

#[tokio::test]
async fn test_create_collection_handler_returns_200() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post(
            "/knowledge/create_collection",
            json!({ "collection_name": "cities" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "cities");
    assert_eq!(body["dimension"], 384);
    assert_eq!(body["distance"], "cosine");
    assert_eq!(body["replaced"], false);
}

#[tokio::test]
async fn test_create_collection_handler_empty_name_returns_400() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post("/knowledge/create_collection", json!({ "collection_name": "" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_add_vectors_handler_returns_point_ids() {
    let app = app().await;
    send(
        &app,
        post(
            "/knowledge/create_collection",
            json!({ "collection_name": "cities" }),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        post(
            "/knowledge/add_vectors",
            json!({
                "docs": ["Berlin is the capital of Germany", "Paris is the capital of France"],
                "collection_name": "cities"
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "completed");
    assert_eq!(body["point_ids"], json!([1, 2]));
}

#[tokio::test]
async fn test_add_vectors_handler_missing_collection_returns_404() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post(
            "/knowledge/add_vectors",
            json!({ "docs": ["orphan"], "collection_name": "missing" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "COLLECTION_NOT_FOUND");
}

#[tokio::test]
async fn test_add_vectors_handler_empty_docs_returns_400() {
    let app = app().await;

    let (status, _) = send(
        &app,
        post(
            "/knowledge/add_vectors",
            json!({ "docs": [], "collection_name": "cities" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_search_vectors_handler_returns_best_match_first() {
    let app = app().await;
    send(
        &app,
        post(
            "/knowledge/create_collection",
            json!({ "collection_name": "cities" }),
        ),
    )
    .await;
    send(
        &app,
        post(
            "/knowledge/add_vectors",
            json!({
                "docs": ["Berlin is the capital of Germany", "Paris is the capital of France"],
                "collection_name": "cities"
            }),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        post(
            "/knowledge/search_vectors",
            json!({
                "query_text": "capital of Germany",
                "collection_name": "cities",
                "limit": 1
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let hits = body.as_array().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0]["payload"]["text"], "Berlin is the capital of Germany");
    assert_eq!(hits[0]["id"], 1);
}

#[tokio::test]
async fn test_search_vectors_handler_defaults_limit_to_three() {
    let app = app().await;
    send(
        &app,
        post(
            "/knowledge/create_collection",
            json!({ "collection_name": "notes" }),
        ),
    )
    .await;
    send(
        &app,
        post(
            "/knowledge/add_vectors",
            json!({
                "docs": ["note a", "note b", "note c", "note d", "note e"],
                "collection_name": "notes"
            }),
        ),
    )
    .await;

    let (status, body) = send(
        &app,
        post(
            "/knowledge/search_vectors",
            json!({ "query_text": "note", "collection_name": "notes" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_search_vectors_handler_zero_limit_returns_400() {
    let app = app().await;

    let (status, body) = send(
        &app,
        post(
            "/knowledge/search_vectors",
            json!({ "query_text": "x", "collection_name": "notes", "limit": 0 }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_search_vectors_handler_missing_collection_returns_404() {
    let app = app().await;

    let (status, _) = send(
        &app,
        post(
            "/knowledge/search_vectors",
            json!({ "query_text": "x", "collection_name": "nowhere" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let app = app().await;

    let request = Request::builder()
        .method("POST")
        .uri("/knowledge/create_collection")
        .header("content-type", "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert!(response.status().is_client_error());
}
