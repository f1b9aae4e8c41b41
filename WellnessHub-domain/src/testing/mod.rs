// Testing utilities and mock implementations for the domain layer
// This module is only available in tests or when the "mock" feature is enabled

// Re-export useful test mocks from the data layer
pub use wellness_hub_data::repository::tests::MockProfileRepository;

use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::entities::wearable::{
    IncomingEvent, IngestionReceipt, WearableEvent, WearableMetrics, WearableProfile,
};
use crate::health::{
    overall_status, ComponentStatus, HealthComponent, HealthServiceTrait, SystemHealth,
};
use crate::services::ingestion::{IngestionServiceError, WearableIngestionServiceTrait};
use crate::services::metrics::{MetricsError, WearableMetricsProvider};
use crate::services::normalizer::{category_from_event_type, normalize_event};

/// Mock implementation of the WearableIngestionServiceTrait for testing
#[derive(Debug, Default)]
pub struct MockIngestionService {
    profiles: RwLock<HashMap<String, WearableProfile>>,
    should_fail_storage: bool,
}

impl MockIngestionService {
    /// Create a new mock ingestion service
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the mock to fail every write
    pub fn with_storage_failure(mut self) -> Self {
        self.should_fail_storage = true;
        self
    }

    /// Add a pre-defined profile to the mock
    pub fn with_profile(self, profile: WearableProfile) -> Self {
        {
            let mut profiles = self.profiles.write().unwrap();
            profiles.insert(profile.user_id.clone(), profile);
        }
        self
    }
}

#[async_trait]
impl WearableIngestionServiceTrait for MockIngestionService {
    async fn ingest_event(&self, event: IncomingEvent) -> Result<IngestionReceipt, IngestionServiceError> {
        let event = WearableEvent::try_from(event)
            .map_err(|e| IngestionServiceError::ValidationError(e.to_string()))?;

        if self.should_fail_storage {
            return Err(IngestionServiceError::StorageError(
                "Storage error - mock is configured to fail writes".to_string(),
            ));
        }

        let update = normalize_event(&event, Utc::now());
        let timestamp = update.processed_at.to_rfc3339();

        let mut profiles = self.profiles.write().unwrap();
        let profile = profiles
            .entry(update.user_id.clone())
            .or_insert_with(|| WearableProfile {
                user_id: update.user_id.clone(),
                ..WearableProfile::default()
            });

        profile.last_event = Some(update.last_event.clone());
        profile.last_updated = Some(timestamp.clone());
        profile.updated_at = Some(timestamp);
        profile.metrics.extend(update.fields.iter().map(|(field, value)| (*field, *value)));
        if let Some((category, payload)) = update.unparsed {
            profile.unparsed.insert(category, payload);
        }

        Ok(IngestionReceipt {
            category: category_from_event_type(&event.event_type).to_string(),
            user_id: event.user_id,
            profile: profile.clone(),
        })
    }

    async fn get_profile(&self, user_id: &str) -> Result<WearableProfile, IngestionServiceError> {
        let profiles = self.profiles.read().unwrap();
        profiles
            .get(user_id)
            .cloned()
            .ok_or_else(|| IngestionServiceError::NotFound(user_id.to_string()))
    }

    async fn list_profiles(&self) -> Result<Vec<String>, IngestionServiceError> {
        if self.should_fail_storage {
            return Err(IngestionServiceError::StorageError(
                "Storage error - mock is configured to fail reads".to_string(),
            ));
        }

        let profiles = self.profiles.read().unwrap();
        let mut ids: Vec<String> = profiles.keys().cloned().collect();
        ids.sort();
        Ok(ids)
    }
}

/// Metrics provider returning fixed metrics, optionally failing for some users
#[derive(Debug, Default)]
pub struct FixtureMetricsProvider {
    fixtures: HashMap<String, WearableMetrics>,
    failing_users: HashSet<String>,
}

impl FixtureMetricsProvider {
    /// Create a provider without fixtures
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `metrics` for `user_id`
    pub fn with_metrics(mut self, user_id: &str, metrics: WearableMetrics) -> Self {
        self.fixtures.insert(user_id.to_string(), metrics);
        self
    }

    /// Fail every fetch for `user_id`
    pub fn with_failure_for(mut self, user_id: &str) -> Self {
        self.failing_users.insert(user_id.to_string());
        self
    }

    /// Fixture used for users without explicit metrics
    pub fn sample_metrics() -> WearableMetrics {
        WearableMetrics {
            steps: 8432,
            heart_rate: vec![62; 24],
            calories_burned: Some(540),
            sleep_hours: Some(7.5),
            distance: Some(6.2),
            device_type: Some("Fixture Band".to_string()),
            last_updated: Utc::now(),
        }
    }
}

#[async_trait]
impl WearableMetricsProvider for FixtureMetricsProvider {
    async fn fetch_metrics(&self, user_id: &str) -> Result<WearableMetrics, MetricsError> {
        if self.failing_users.contains(user_id) {
            return Err(MetricsError::Unavailable(format!(
                "fixture configured to fail for {}",
                user_id
            )));
        }

        Ok(self
            .fixtures
            .get(user_id)
            .cloned()
            .unwrap_or_else(Self::sample_metrics))
    }
}

/// Mock implementation of health services for testing system health
#[derive(Debug)]
pub struct MockHealthService {
    /// Database component status
    database_status: ComponentStatus,
    /// Additional components
    components: HashMap<String, HealthComponent>,
}

impl Default for MockHealthService {
    fn default() -> Self {
        Self::new()
    }
}

impl MockHealthService {
    /// Create a new mock health service with all components healthy
    pub fn new() -> Self {
        Self {
            database_status: ComponentStatus::Healthy,
            components: HashMap::new(),
        }
    }

    /// Configure the mock as running on the in-memory fallback
    pub fn with_degraded_database(mut self) -> Self {
        self.database_status = ComponentStatus::Degraded;
        self
    }

    /// Configure the mock with an unhealthy database
    pub fn with_unhealthy_database(mut self) -> Self {
        self.database_status = ComponentStatus::Unhealthy;
        self
    }

    /// Add a custom component with a specific status
    pub fn with_component(mut self, name: &str, status: ComponentStatus, details: Option<String>) -> Self {
        self.components
            .insert(name.to_string(), HealthComponent { status, details });
        self
    }
}

#[async_trait]
impl HealthServiceTrait for MockHealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let mut components = HashMap::new();

        components.insert(
            "database".to_string(),
            HealthComponent {
                status: self.database_status.clone(),
                details: match self.database_status {
                    ComponentStatus::Healthy => None,
                    ComponentStatus::Degraded => Some("Using in-memory storage".to_string()),
                    ComponentStatus::Unhealthy => Some("Database connection failed".to_string()),
                },
            },
        );

        components.insert(
            "api".to_string(),
            HealthComponent {
                status: ComponentStatus::Healthy,
                details: None,
            },
        );

        for (name, component) in &self.components {
            components.insert(name.clone(), component.clone());
        }

        SystemHealth {
            status: overall_status(components.values()),
            components,
        }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match self.database_status {
            ComponentStatus::Healthy => Ok(true),
            ComponentStatus::Degraded => Ok(false),
            ComponentStatus::Unhealthy => Err("Database connection failed".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::wearable::MetricField;
    use crate::health::SystemStatus;
    use crate::services::metrics::fetch_metrics_for_users;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_ingestion_merges_fields() {
        let service = MockIngestionService::new();
        let event = |event_type: &str, data| IncomingEvent {
            event_type: Some(event_type.to_string()),
            user_id: Some("user-1".to_string()),
            data: Some(data),
        };

        service
            .ingest_event(event("daily.data.steps.created", json!({"data": [{"value": 10}]})))
            .await
            .unwrap();
        let receipt = service
            .ingest_event(event("daily.data.glucose.created", json!({"data": [{"value": 5}]})))
            .await
            .unwrap();

        assert_eq!(receipt.profile.metric(MetricField::Steps), Some(10.0));
        assert_eq!(receipt.profile.metric(MetricField::Glucose), Some(5.0));
    }

    #[tokio::test]
    async fn test_fixture_provider_failure_is_isolated() {
        let provider = FixtureMetricsProvider::new()
            .with_metrics("steady", FixtureMetricsProvider::sample_metrics())
            .with_failure_for("flaky");
        let ids = vec!["steady".to_string(), "flaky".to_string()];

        let results = fetch_metrics_for_users(&provider, &ids).await;

        assert_eq!(results["steady"].steps, 8432);
        assert_eq!(results["flaky"].steps, 0);
    }

    #[tokio::test]
    async fn test_mock_health_reflects_components() {
        let health = MockHealthService::new()
            .with_component("cache", ComponentStatus::Degraded, None)
            .get_system_health()
            .await;

        assert_eq!(health.status, SystemStatus::Degraded);
        assert_eq!(health.components.len(), 3);
    }
}
