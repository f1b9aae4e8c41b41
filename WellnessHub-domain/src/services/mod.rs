pub mod ingestion;
pub mod metrics;
pub mod normalizer;

// Domain services
// This module contains business logic implementations.

// Re-export service traits and factory functions
pub use ingestion::{
    create_ingestion_service, IngestionServiceError, WearableIngestionService,
    WearableIngestionServiceTrait,
};
pub use metrics::{
    fetch_metrics_for_users, MetricsError, SimulatedMetricsProvider, WearableMetricsProvider,
};
pub use normalizer::{category_from_event_type, normalize_event};
