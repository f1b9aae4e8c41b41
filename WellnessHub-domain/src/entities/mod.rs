// Domain entities and value objects
pub mod conversions;
pub mod wearable;

// Re-export common types for easier imports
pub use wearable::{
    FieldUpdate, IncomingEvent, IngestionReceipt, MetricField, MissingFields, ProfileUpdate,
    WearableEvent, WearableMetrics, WearableProfile,
};
