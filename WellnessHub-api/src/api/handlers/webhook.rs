use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::Value;
use tracing::{error, info, instrument, warn};

use wellness_hub_domain::entities::IncomingEvent;
use wellness_hub_domain::services::IngestionServiceError;

use super::{error_response, AppState};
use crate::entities::common::{ErrorResponse, MessageResponse};
use crate::entities::webhook::WebhookEvent;

pub const MISSING_FIELDS: &str = "Missing required fields";
pub const INVALID_JSON: &str = "Invalid JSON payload";
pub const STORE_FAILED: &str = "Failed to store data";

/// Receive one wearable event and merge it into the user's profile
#[utoipa::path(
    post,
    path = "/api/v1/wearables/webhook",
    request_body = WebhookEvent,
    responses(
        (status = 200, description = "Event stored", body = MessageResponse),
        (status = 400, description = "Missing fields or malformed body", body = ErrorResponse),
        (status = 500, description = "Profile store failure", body = ErrorResponse),
    ),
    tag = "wearables"
)]
#[instrument(skip(state, body))]
pub async fn receive_wearable_event(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<impl IntoResponse, Response> {
    let payload: Value = serde_json::from_slice(&body).map_err(|e| {
        warn!("Webhook body is not valid JSON: {}", e);
        error_response(StatusCode::BAD_REQUEST, INVALID_JSON)
    })?;

    match state.ingestion.ingest_event(IncomingEvent::from_json(&payload)).await {
        Ok(receipt) => {
            info!("Webhook stored {} for {}", receipt.category, receipt.user_id);
            Ok((
                StatusCode::OK,
                Json(MessageResponse {
                    message: format!("Stored {} for {}", receipt.category, receipt.user_id),
                }),
            ))
        }
        Err(IngestionServiceError::ValidationError(message)) => {
            warn!("Webhook event rejected: {}", message);
            Err(error_response(StatusCode::BAD_REQUEST, MISSING_FIELDS))
        }
        Err(e) => {
            error!("Error upserting wearable data: {}", e);
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, STORE_FAILED))
        }
    }
}
