use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tracing::{error, info, instrument, warn};

use crate::entities::conversions;
use crate::entities::wearable::{
    IncomingEvent, IngestionReceipt, WearableEvent, WearableProfile,
};
use crate::services::normalizer::{category_from_event_type, normalize_event};
use wellness_hub_data::repository::{ProfileRepository, ProfileRepositoryTrait, RepositoryError};

/// Wearable ingestion service errors
#[derive(Debug, Error)]
pub enum IngestionServiceError {
    /// The event or request is incomplete
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// No profile exists for the user
    #[error("Profile not found: {0}")]
    NotFound(String),

    /// The profile store failed
    #[error("Storage error: {0}")]
    StorageError(String),
}

/// Trait for wearable ingestion operations
#[async_trait]
pub trait WearableIngestionServiceTrait: Send + Sync {
    /// Normalize an event and merge it into the user's profile
    async fn ingest_event(&self, event: IncomingEvent) -> Result<IngestionReceipt, IngestionServiceError>;

    /// Get the merged profile of a user
    async fn get_profile(&self, user_id: &str) -> Result<WearableProfile, IngestionServiceError>;

    /// User ids that have a profile
    async fn list_profiles(&self) -> Result<Vec<String>, IngestionServiceError>;
}

/// Ingestion service combining the event normalizer with a profile repository
pub struct WearableIngestionService<R: ProfileRepositoryTrait> {
    repository: R,
}

impl<R: ProfileRepositoryTrait> WearableIngestionService<R> {
    /// Create a new ingestion service
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    /// Map repository errors to service errors
    fn map_repo_error(&self, err: RepositoryError) -> IngestionServiceError {
        match err {
            RepositoryError::NotFound(msg) => IngestionServiceError::NotFound(msg),
            RepositoryError::Validation(msg) => IngestionServiceError::ValidationError(msg),
            _ => IngestionServiceError::StorageError(err.to_string()),
        }
    }
}

#[async_trait]
impl<R: ProfileRepositoryTrait + Send + Sync> WearableIngestionServiceTrait for WearableIngestionService<R> {
    #[instrument(skip(self, event), fields(event_type = ?event.event_type, user_id = ?event.user_id))]
    async fn ingest_event(&self, event: IncomingEvent) -> Result<IngestionReceipt, IngestionServiceError> {
        let event = WearableEvent::try_from(event).map_err(|e| {
            warn!("Rejected wearable event: {}", e);
            IngestionServiceError::ValidationError(e.to_string())
        })?;

        let category = category_from_event_type(&event.event_type).to_string();
        let update = normalize_event(&event, Utc::now());

        let record = self
            .repository
            .upsert(conversions::convert_to_data_update(&update))
            .await
            .map_err(|e| {
                error!("Failed to store {} for {}: {}", category, event.user_id, e);
                self.map_repo_error(e)
            })?;

        info!("Stored {} data for user {}", category, event.user_id);

        Ok(IngestionReceipt {
            category,
            user_id: event.user_id,
            profile: conversions::convert_to_domain_profile(record),
        })
    }

    #[instrument(skip(self))]
    async fn get_profile(&self, user_id: &str) -> Result<WearableProfile, IngestionServiceError> {
        match self.repository.get(user_id).await {
            Ok(Some(record)) => Ok(conversions::convert_to_domain_profile(record)),
            Ok(None) => Err(IngestionServiceError::NotFound(user_id.to_string())),
            Err(e) => Err(self.map_repo_error(e)),
        }
    }

    #[instrument(skip(self))]
    async fn list_profiles(&self) -> Result<Vec<String>, IngestionServiceError> {
        self.repository
            .list_user_ids()
            .await
            .map_err(|e| self.map_repo_error(e))
    }
}

/// Create an ingestion service over the given repository
pub fn create_ingestion_service(repository: ProfileRepository) -> impl WearableIngestionServiceTrait {
    WearableIngestionService::new(repository)
}
