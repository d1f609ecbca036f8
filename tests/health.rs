mod common;

use axum::{extract::State, http::StatusCode};
use common::TestApp;
use storefront_api::routes::health::health_check;
use tower::ServiceExt;

#[tokio::test]
async fn health_check_returns_ok() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let response = health_check(State(app.state.clone())).await;
    assert_eq!(response.0.message, "Health check");

    let data = response.0.data.expect("health data");
    assert_eq!(data.status, "ok");
    assert_eq!(data.database, "up");
    Ok(())
}

#[tokio::test]
async fn health_route_is_public() -> anyhow::Result<()> {
    let app = TestApp::new().await?;
    let response = storefront_api::routes::app(app.state)
        .oneshot(axum::http::Request::get("/health").body(axum::body::Body::empty())?)
        .await?;
    assert_eq!(response.status(), StatusCode::OK);
    Ok(())
}
