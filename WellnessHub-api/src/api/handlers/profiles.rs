use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tracing::{error, info, instrument};

use wellness_hub_domain::services::IngestionServiceError;

use super::{error_response, AppState};
use crate::entities::common::ErrorResponse;
use crate::entities::wearable::{ProfileListResponse, PublicWearableProfile};

pub const PROFILE_NOT_FOUND: &str = "Profile not found";
pub const PROFILE_LOAD_FAILED: &str = "Failed to load profile";

/// List the users that have a wearable profile
#[utoipa::path(
    get,
    path = "/api/v1/wearables/profiles",
    responses(
        (status = 200, description = "Known user ids", body = ProfileListResponse),
        (status = 500, description = "Profile store failure", body = ErrorResponse),
    ),
    tag = "wearables"
)]
#[instrument(skip(state))]
pub async fn list_profiles(State(state): State<AppState>) -> Result<impl IntoResponse, Response> {
    match state.ingestion.list_profiles().await {
        Ok(user_ids) => Ok(Json(ProfileListResponse {
            count: user_ids.len(),
            user_ids,
        })),
        Err(e) => {
            error!("Error listing wearable profiles: {}", e);
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, PROFILE_LOAD_FAILED))
        }
    }
}

/// Get the merged wearable profile of one user
#[utoipa::path(
    get,
    path = "/api/v1/wearables/profiles/{user_id}",
    params(
        ("user_id" = String, Path, description = "User identifier")
    ),
    responses(
        (status = 200, description = "Profile found", body = PublicWearableProfile),
        (status = 404, description = "No profile for this user", body = ErrorResponse),
        (status = 500, description = "Profile store failure", body = ErrorResponse),
    ),
    tag = "wearables"
)]
#[instrument(skip(state))]
pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, Response> {
    match state.ingestion.get_profile(&user_id).await {
        Ok(profile) => Ok(Json(PublicWearableProfile::from(profile))),
        Err(IngestionServiceError::NotFound(_)) => {
            info!("Wearable profile not found: {}", user_id);
            Err(error_response(StatusCode::NOT_FOUND, PROFILE_NOT_FOUND))
        }
        Err(e) => {
            error!("Error loading wearable profile {}: {}", user_id, e);
            Err(error_response(StatusCode::INTERNAL_SERVER_ERROR, PROFILE_LOAD_FAILED))
        }
    }
}
