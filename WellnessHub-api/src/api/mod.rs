pub mod handlers;
pub mod routes;

use std::sync::Arc;

use axum::Router;
use tracing::{info, warn};
use wellness_hub_data::database::DatabasePool;
use wellness_hub_data::repository::ProfileRepository;
use wellness_hub_domain::health::HealthService;
use wellness_hub_domain::services::{create_ingestion_service, SimulatedMetricsProvider};

use crate::config::ServerConfig;
use handlers::AppState;

/// Create the application router.
///
/// Without a database pool profiles are kept in memory and the health
/// check reports the store as degraded.
pub fn create_application(pool: Option<DatabasePool>, config: &ServerConfig) -> Router {
    let repository = match &pool {
        Some(pool) => {
            info!("Storing wearable profiles in the database");
            ProfileRepository::with_pool(pool.clone())
        }
        None => {
            warn!("No database available, storing wearable profiles in memory");
            ProfileRepository::in_memory()
        }
    };

    let state = AppState {
        ingestion: Arc::new(create_ingestion_service(repository)),
        metrics: Arc::new(SimulatedMetricsProvider::new(config.metrics_latency)),
    };

    routes::create_app(
        state,
        Arc::new(HealthService::new(pool)),
        &config.environment,
    )
}
