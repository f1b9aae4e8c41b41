mod profiles_test;

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;
use wellness_hub_domain::testing::{FixtureMetricsProvider, MockHealthService, MockIngestionService};

use crate::api::handlers::AppState;
use crate::api::routes::create_app;

/// Router over mock services
pub(super) fn test_app(ingestion: MockIngestionService, metrics: FixtureMetricsProvider) -> Router {
    let state = AppState {
        ingestion: Arc::new(ingestion),
        metrics: Arc::new(metrics),
    };
    create_app(state, Arc::new(MockHealthService::new()), "test")
}

/// Send a request and return the status with the parsed JSON body
pub(super) async fn send(app: Router, method: Method, uri: &str, body: Option<&str>) -> (StatusCode, Value) {
    let mut request = Request::builder().method(method).uri(uri);
    if body.is_some() {
        request = request.header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref());
    }
    let request = request
        .body(body.map(|b| Body::from(b.to_string())).unwrap_or_else(Body::empty))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}
