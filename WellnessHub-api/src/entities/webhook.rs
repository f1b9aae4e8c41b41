use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Event delivered by the wearable aggregator
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct WebhookEvent {
    /// Dotted event type; the third segment is the category
    #[schema(example = "daily.data.steps.created")]
    pub event_type: String,

    /// User the event belongs to
    #[schema(example = "user-123")]
    pub user_id: String,

    /// Category specific payload
    #[schema(value_type = Object, example = json!({"data": [{"value": 8000}]}))]
    pub data: serde_json::Value,
}
