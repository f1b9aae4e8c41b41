use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use chrono::Utc;
use serde_json::{json, Value};
use tracing::{error, info, instrument, warn};

use wellness_hub_domain::services::fetch_metrics_for_users;

use super::{error_response, AppState};
use crate::entities::common::ErrorResponse;
use crate::entities::wearable::{
    BatchMetricsRequest, BatchMetricsResponse, MetricsErrorResponse, MetricsRequest,
    MetricsResponse, MetricsUsageResponse,
};

fn fetch_failed(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(MetricsErrorResponse::fetch_failed(message)),
    )
        .into_response()
}

fn parse_body(body: &Bytes) -> Result<Value, Response> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("Metrics request body is not valid JSON: {}", e);
        fetch_failed(e.to_string())
    })
}

/// Fetch live wearable metrics for one user
#[utoipa::path(
    post,
    path = "/api/v1/wearables/metrics",
    request_body = MetricsRequest,
    responses(
        (status = 200, description = "Current metrics", body = MetricsResponse),
        (status = 400, description = "Missing or malformed userId", body = ErrorResponse),
        (status = 500, description = "Metrics could not be fetched", body = MetricsErrorResponse),
    ),
    tag = "wearables"
)]
#[instrument(skip(state, body))]
pub async fn get_metrics(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, Response> {
    let payload = parse_body(&body)?;
    let request = MetricsRequest::from_json(&payload)
        .map_err(|message| error_response(StatusCode::BAD_REQUEST, message))?;

    match state.metrics.fetch_metrics(&request.user_id).await {
        Ok(data) => {
            info!("Fetched wearable metrics for {}", request.user_id);
            Ok(Json(MetricsResponse {
                success: true,
                data,
                timestamp: Utc::now(),
            }))
        }
        Err(e) => {
            error!("Error fetching wearable metrics for {}: {}", request.user_id, e);
            Err(fetch_failed(e.to_string()))
        }
    }
}

/// Fetch live wearable metrics for several users at once
#[utoipa::path(
    post,
    path = "/api/v1/wearables/metrics/batch",
    request_body = BatchMetricsRequest,
    responses(
        (status = 200, description = "Metrics keyed by user id", body = BatchMetricsResponse),
        (status = 400, description = "Missing or malformed userIds", body = ErrorResponse),
        (status = 500, description = "Malformed body", body = MetricsErrorResponse),
    ),
    tag = "wearables"
)]
#[instrument(skip(state, body))]
pub async fn get_batch_metrics(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, Response> {
    let payload = parse_body(&body)?;
    let request = BatchMetricsRequest::from_json(payload)
        .map_err(|message| error_response(StatusCode::BAD_REQUEST, message))?;

    let data = fetch_metrics_for_users(state.metrics.as_ref(), &request.user_ids).await;
    info!("Fetched wearable metrics for {} users", data.len());

    Ok(Json(BatchMetricsResponse {
        success: true,
        data,
        timestamp: Utc::now(),
    }))
}

/// Describe how to call the metrics endpoint
#[utoipa::path(
    get,
    path = "/api/v1/wearables/metrics",
    responses(
        (status = 200, description = "Usage hint", body = MetricsUsageResponse),
    ),
    tag = "wearables"
)]
pub async fn metrics_usage() -> Json<MetricsUsageResponse> {
    Json(MetricsUsageResponse {
        message: "Use POST method with { userId } to get wearable data".to_string(),
        example: json!({
            "method": "POST",
            "body": { "userId": "user-uuid-here" }
        }),
    })
}
