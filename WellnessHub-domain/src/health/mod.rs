//! Domain layer health check functionality
//! This module provides health check services for the application

use std::collections::HashMap;

use async_trait::async_trait;
use tracing::warn;
use wellness_hub_data::database::DatabasePool;

/// System health status
#[derive(Debug, Clone, PartialEq)]
pub enum SystemStatus {
    /// All components are healthy
    Healthy,
    /// Some components are degraded but the system is functional
    Degraded,
    /// System is not functioning properly
    Unhealthy,
}

/// Component health status
#[derive(Debug, Clone, PartialEq)]
pub enum ComponentStatus {
    /// Component is functioning normally
    Healthy,
    /// Component is functioning but with reduced guarantees
    Degraded,
    /// Component is not functioning
    Unhealthy,
}

/// Represents a health component with status and optional details
#[derive(Debug, Clone)]
pub struct HealthComponent {
    /// Status of the component
    pub status: ComponentStatus,
    /// Optional details about the component status
    pub details: Option<String>,
}

/// Represents the overall health of the system
#[derive(Debug, Clone)]
pub struct SystemHealth {
    /// Overall system status
    pub status: SystemStatus,
    /// Map of component names to their health status
    pub components: HashMap<String, HealthComponent>,
}

/// Trait for health services
#[async_trait]
pub trait HealthServiceTrait: Send + Sync + std::fmt::Debug {
    /// Get the overall system health
    async fn get_system_health(&self) -> SystemHealth;

    /// Check the status of the database
    /// Returns true if the database is healthy, false if profiles are only
    /// kept in memory
    /// Returns an error if the database cannot be reached
    async fn check_database_status(&self) -> Result<bool, String>;
}

/// Health service reporting on the profile store
#[derive(Debug, Clone)]
pub struct HealthService {
    /// `None` when the server fell back to in-memory storage
    pool: Option<DatabasePool>,
}

impl HealthService {
    pub fn new(pool: Option<DatabasePool>) -> Self {
        Self { pool }
    }
}

/// Worst component status decides the overall status
pub fn overall_status<'a>(components: impl IntoIterator<Item = &'a HealthComponent>) -> SystemStatus {
    let mut status = SystemStatus::Healthy;
    for component in components {
        match component.status {
            ComponentStatus::Unhealthy => return SystemStatus::Unhealthy,
            ComponentStatus::Degraded => status = SystemStatus::Degraded,
            ComponentStatus::Healthy => {}
        }
    }
    status
}

#[async_trait]
impl HealthServiceTrait for HealthService {
    async fn get_system_health(&self) -> SystemHealth {
        let db_component = match self.check_database_status().await {
            Ok(true) => HealthComponent {
                status: ComponentStatus::Healthy,
                details: self.pool.as_ref().and_then(|pool| pool.connection_info().ok()),
            },
            Ok(false) => HealthComponent {
                status: ComponentStatus::Degraded,
                details: Some("Using in-memory storage; profiles are lost on restart".to_string()),
            },
            Err(e) => HealthComponent {
                status: ComponentStatus::Unhealthy,
                details: Some(e),
            },
        };

        let api_component = HealthComponent {
            status: ComponentStatus::Healthy,
            details: None,
        };

        let components: HashMap<String, HealthComponent> = vec![
            ("database".to_string(), db_component),
            ("api".to_string(), api_component),
        ]
        .into_iter()
        .collect();

        SystemHealth {
            status: overall_status(components.values()),
            components,
        }
    }

    async fn check_database_status(&self) -> Result<bool, String> {
        match &self.pool {
            None => Ok(false),
            Some(pool) => pool.connection_info().map(|_| true).map_err(|e| {
                warn!("Database health check failed: {}", e);
                format!("Database connection error: {}", e)
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_database_pool_is_healthy() {
        let service = HealthService::new(Some(DatabasePool::in_memory().unwrap()));
        let health = service.get_system_health().await;

        assert_eq!(health.status, SystemStatus::Healthy);
        assert!(health.components.contains_key("database"));
        assert!(health.components.contains_key("api"));
        assert!(health.components["database"]
            .details
            .as_deref()
            .unwrap()
            .contains("in-memory database"));
    }

    #[tokio::test]
    async fn test_memory_fallback_is_degraded() {
        let service = HealthService::new(None);

        assert_eq!(service.check_database_status().await, Ok(false));
        let health = service.get_system_health().await;
        assert_eq!(health.status, SystemStatus::Degraded);
        assert_eq!(health.components["database"].status, ComponentStatus::Degraded);
    }

    #[test]
    fn test_overall_status_takes_worst_component() {
        let healthy = HealthComponent { status: ComponentStatus::Healthy, details: None };
        let degraded = HealthComponent { status: ComponentStatus::Degraded, details: None };
        let unhealthy = HealthComponent { status: ComponentStatus::Unhealthy, details: None };

        assert_eq!(overall_status([&healthy]), SystemStatus::Healthy);
        assert_eq!(overall_status([&healthy, &degraded]), SystemStatus::Degraded);
        assert_eq!(overall_status([&degraded, &unhealthy, &healthy]), SystemStatus::Unhealthy);
    }
}
