use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Storage model for a user's wearable profile row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WearableProfileRecord {
    /// Opaque user identifier (primary key)
    pub user_id: String,

    /// Event type string of the most recently processed event
    pub last_event: Option<String>,

    /// RFC 3339 time of the last processed event
    pub last_updated: Option<String>,

    /// RFC 3339 time of the last row mutation
    pub updated_at: Option<String>,

    pub steps: Option<f64>,
    pub heart_rate: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub blood_pressure_systolic: Option<f64>,
    pub blood_pressure_diastolic: Option<f64>,
    pub glucose: Option<f64>,
    pub body_temperature: Option<f64>,
    pub calories: Option<f64>,
    pub stress_level: Option<f64>,
    pub workout_duration: Option<f64>,
    pub basal_body_temperature: Option<f64>,
    pub body_mass_index: Option<f64>,

    /// Raw payloads of unmapped categories, keyed by category name
    pub unparsed: BTreeMap<String, serde_json::Value>,
}

/// Raw payload stored for a category that has no extraction rule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnparsedPayload {
    /// Category name (third segment of the event type)
    pub category: String,

    /// The event's data payload, untouched
    pub payload: serde_json::Value,
}

/// Partial update merged into a profile row.
///
/// `None` means "leave the stored value alone"; a column is never set back
/// to NULL by an update.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfileUpdateRecord {
    pub user_id: String,
    pub last_event: String,
    pub last_updated: String,
    pub updated_at: String,

    pub steps: Option<f64>,
    pub heart_rate: Option<f64>,
    pub sleep_hours: Option<f64>,
    pub blood_pressure_systolic: Option<f64>,
    pub blood_pressure_diastolic: Option<f64>,
    pub glucose: Option<f64>,
    pub body_temperature: Option<f64>,
    pub calories: Option<f64>,
    pub stress_level: Option<f64>,
    pub workout_duration: Option<f64>,
    pub basal_body_temperature: Option<f64>,
    pub body_mass_index: Option<f64>,

    pub unparsed: Option<UnparsedPayload>,
}

impl WearableProfileRecord {
    /// Empty row for a user seen for the first time
    pub fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            ..Self::default()
        }
    }

    /// Shallow field merge: every value present in `update` wins
    pub fn apply(&mut self, update: &ProfileUpdateRecord) {
        fn merge(target: &mut Option<f64>, incoming: Option<f64>) {
            if incoming.is_some() {
                *target = incoming;
            }
        }

        self.last_event = Some(update.last_event.clone());
        self.last_updated = Some(update.last_updated.clone());
        self.updated_at = Some(update.updated_at.clone());

        merge(&mut self.steps, update.steps);
        merge(&mut self.heart_rate, update.heart_rate);
        merge(&mut self.sleep_hours, update.sleep_hours);
        merge(&mut self.blood_pressure_systolic, update.blood_pressure_systolic);
        merge(&mut self.blood_pressure_diastolic, update.blood_pressure_diastolic);
        merge(&mut self.glucose, update.glucose);
        merge(&mut self.body_temperature, update.body_temperature);
        merge(&mut self.calories, update.calories);
        merge(&mut self.stress_level, update.stress_level);
        merge(&mut self.workout_duration, update.workout_duration);
        merge(&mut self.basal_body_temperature, update.basal_body_temperature);
        merge(&mut self.body_mass_index, update.body_mass_index);

        if let Some(unparsed) = &update.unparsed {
            self.unparsed
                .insert(unparsed.category.clone(), unparsed.payload.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn update(user_id: &str) -> ProfileUpdateRecord {
        ProfileUpdateRecord {
            user_id: user_id.to_string(),
            last_event: "daily.data.steps.created".to_string(),
            last_updated: "2024-03-01T10:00:00+00:00".to_string(),
            updated_at: "2024-03-01T10:00:00+00:00".to_string(),
            ..ProfileUpdateRecord::default()
        }
    }

    #[test]
    fn test_apply_keeps_fields_missing_from_update() {
        let mut record = WearableProfileRecord::empty("user-1");
        record.glucose = Some(5.4);
        record.steps = Some(1200.0);

        let mut incoming = update("user-1");
        incoming.steps = Some(8000.0);
        record.apply(&incoming);

        assert_eq!(record.steps, Some(8000.0));
        assert_eq!(record.glucose, Some(5.4));
        assert_eq!(record.last_event.as_deref(), Some("daily.data.steps.created"));
    }

    #[test]
    fn test_apply_replaces_unparsed_payload_for_same_category() {
        let mut record = WearableProfileRecord::empty("user-1");

        let mut first = update("user-1");
        first.unparsed = Some(UnparsedPayload {
            category: "custom".to_string(),
            payload: json!({"foo": 1, "bar": 2}),
        });
        record.apply(&first);

        let mut second = update("user-1");
        second.unparsed = Some(UnparsedPayload {
            category: "custom".to_string(),
            payload: json!({"foo": 3}),
        });
        record.apply(&second);

        assert_eq!(record.unparsed.len(), 1);
        assert_eq!(record.unparsed["custom"], json!({"foo": 3}));
    }
}
