pub mod health;
pub mod metrics;
pub mod profiles;
pub mod webhook;

// Tests module
#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use wellness_hub_domain::services::{WearableIngestionServiceTrait, WearableMetricsProvider};

use crate::entities::common::ErrorResponse;

// Re-export handlers for easier imports
pub use health::health_check;
pub use metrics::{get_batch_metrics, get_metrics, metrics_usage};
pub use profiles::{get_profile, list_profiles};
pub use webhook::receive_wearable_event;

/// Ingestion service type for dependency injection
pub type IngestionService = Arc<dyn WearableIngestionServiceTrait>;

/// Metrics provider type for dependency injection
pub type MetricsProvider = Arc<dyn WearableMetricsProvider>;

/// Shared state of the wearable routes
#[derive(Clone)]
pub struct AppState {
    pub ingestion: IngestionService,
    pub metrics: MetricsProvider,
}

/// `{"error": message}` with the given status
pub(crate) fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(ErrorResponse::new(message))).into_response()
}
