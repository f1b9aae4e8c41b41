use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[cfg(feature = "with-api")]
use utoipa::ToSchema;

/// Metric columns a wearable event can update
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "snake_case")]
pub enum MetricField {
    Steps,
    HeartRate,
    SleepHours,
    BloodPressureSystolic,
    BloodPressureDiastolic,
    Glucose,
    BodyTemperature,
    Calories,
    StressLevel,
    WorkoutDuration,
    BasalBodyTemperature,
    BodyMassIndex,
}

impl MetricField {
    /// Every metric field, in column order
    pub const ALL: [MetricField; 12] = [
        MetricField::Steps,
        MetricField::HeartRate,
        MetricField::SleepHours,
        MetricField::BloodPressureSystolic,
        MetricField::BloodPressureDiastolic,
        MetricField::Glucose,
        MetricField::BodyTemperature,
        MetricField::Calories,
        MetricField::StressLevel,
        MetricField::WorkoutDuration,
        MetricField::BasalBodyTemperature,
        MetricField::BodyMassIndex,
    ];

    /// Column name of the field
    pub fn as_str(&self) -> &'static str {
        match self {
            MetricField::Steps => "steps",
            MetricField::HeartRate => "heart_rate",
            MetricField::SleepHours => "sleep_hours",
            MetricField::BloodPressureSystolic => "blood_pressure_systolic",
            MetricField::BloodPressureDiastolic => "blood_pressure_diastolic",
            MetricField::Glucose => "glucose",
            MetricField::BodyTemperature => "body_temperature",
            MetricField::Calories => "calories",
            MetricField::StressLevel => "stress_level",
            MetricField::WorkoutDuration => "workout_duration",
            MetricField::BasalBodyTemperature => "basal_body_temperature",
            MetricField::BodyMassIndex => "body_mass_index",
        }
    }
}

impl fmt::Display for MetricField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Metric values extracted from one event
pub type FieldUpdate = BTreeMap<MetricField, f64>;

/// Webhook body as received, before any validation.
///
/// A field that is absent, null or of the wrong JSON type is `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IncomingEvent {
    pub event_type: Option<String>,
    pub user_id: Option<String>,
    pub data: Option<Value>,
}

impl IncomingEvent {
    /// Pick the known fields out of an arbitrary JSON body
    pub fn from_json(body: &Value) -> Self {
        let text = |key: &str| body.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            event_type: text("event_type"),
            user_id: text("user_id"),
            data: body.get("data").filter(|data| !data.is_null()).cloned(),
        }
    }
}

/// An event that carries everything the normalizer needs
#[derive(Debug, Clone, PartialEq)]
pub struct WearableEvent {
    /// Dotted event type, e.g. `daily.data.steps.created`
    pub event_type: String,
    pub user_id: String,
    pub data: Value,
}

impl TryFrom<IncomingEvent> for WearableEvent {
    type Error = MissingFields;

    fn try_from(event: IncomingEvent) -> Result<Self, Self::Error> {
        let event_type = event.event_type.filter(|s| !s.is_empty());
        let user_id = event.user_id.filter(|s| !s.is_empty());

        match (event_type, user_id, event.data) {
            (Some(event_type), Some(user_id), Some(data)) => Ok(Self {
                event_type,
                user_id,
                data,
            }),
            _ => Err(MissingFields),
        }
    }
}

/// The event lacks `event_type`, `user_id` or `data`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingFields;

impl fmt::Display for MissingFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Missing required fields")
    }
}

impl std::error::Error for MissingFields {}

/// Partial profile update produced by the normalizer
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileUpdate {
    pub user_id: String,

    /// Original event type string
    pub last_event: String,

    /// Written to both `last_updated` and `updated_at`
    pub processed_at: DateTime<Utc>,

    /// Metric values to overwrite; anything not listed keeps its stored value
    pub fields: FieldUpdate,

    /// `(category, payload)` for a category without an extraction rule
    pub unparsed: Option<(String, Value)>,
}

/// Merged per-user wearable profile
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WearableProfile {
    pub user_id: String,
    pub last_event: Option<String>,
    pub last_updated: Option<String>,
    pub updated_at: Option<String>,
    pub metrics: BTreeMap<MetricField, f64>,
    pub unparsed: BTreeMap<String, Value>,
}

impl WearableProfile {
    /// Current value of one metric
    pub fn metric(&self, field: MetricField) -> Option<f64> {
        self.metrics.get(&field).copied()
    }
}

/// Result of ingesting one event
#[derive(Debug, Clone, PartialEq)]
pub struct IngestionReceipt {
    pub category: String,
    pub user_id: String,
    pub profile: WearableProfile,
}

/// Live activity metrics for one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "with-api", derive(ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct WearableMetrics {
    pub steps: u32,

    /// Hourly heart rate readings in bpm
    pub heart_rate: Vec<u16>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub calories_burned: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub sleep_hours: Option<f64>,

    /// Kilometres
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_type: Option<String>,

    pub last_updated: DateTime<Utc>,
}

impl WearableMetrics {
    /// Placeholder returned for a user whose metrics could not be fetched
    pub fn empty(now: DateTime<Utc>) -> Self {
        Self {
            steps: 0,
            heart_rate: Vec::new(),
            calories_burned: None,
            sleep_hours: None,
            distance: None,
            device_type: None,
            last_updated: now,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_incoming_event_ignores_wrong_types() {
        let event = IncomingEvent::from_json(&json!({
            "event_type": 42,
            "user_id": "user-1",
            "data": null
        }));

        assert_eq!(event.event_type, None);
        assert_eq!(event.user_id.as_deref(), Some("user-1"));
        assert_eq!(event.data, None);
    }

    #[test]
    fn test_empty_strings_count_as_missing() {
        let event = IncomingEvent {
            event_type: Some(String::new()),
            user_id: Some("user-1".to_string()),
            data: Some(json!({})),
        };

        assert_eq!(WearableEvent::try_from(event), Err(MissingFields));
    }

    #[test]
    fn test_complete_event_is_accepted() {
        let event = IncomingEvent::from_json(&json!({
            "event_type": "daily.data.steps.created",
            "user_id": "user-1",
            "data": {"data": [{"value": 100}]}
        }));

        let event = WearableEvent::try_from(event).unwrap();
        assert_eq!(event.event_type, "daily.data.steps.created");
        assert_eq!(event.data, json!({"data": [{"value": 100}]}));
    }

    #[test]
    fn test_metric_field_names_match_columns() {
        assert_eq!(MetricField::BloodPressureSystolic.to_string(), "blood_pressure_systolic");
        assert_eq!(
            serde_json::to_value(MetricField::BodyMassIndex).unwrap(),
            json!("body_mass_index")
        );
    }

    #[test]
    fn test_empty_metrics_omit_optional_fields() {
        let now = Utc::now();
        let value = serde_json::to_value(WearableMetrics::empty(now)).unwrap();

        assert_eq!(value["steps"], json!(0));
        assert_eq!(value["heartRate"], json!([]));
        assert!(value.get("caloriesBurned").is_none());
        assert!(value.get("lastUpdated").is_some());
    }
}
