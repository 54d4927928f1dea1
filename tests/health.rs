mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use common::spawn_app;

#[tokio::test]
async fn root_and_health_are_public() {
    let app = spawn_app();

    let (status, body) = app.request(Method::GET, "/", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Company Service API");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));

    let (status, body) = app.request(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "status": "healthy" }));
}

#[tokio::test]
async fn unknown_routes_are_not_found() {
    let app = spawn_app();
    let (status, _) = app.request(Method::GET, "/empresas", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
