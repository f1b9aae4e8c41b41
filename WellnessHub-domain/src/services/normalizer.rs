//! Classifies wearable events by category and extracts the profile fields
//! each category updates.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde_json::Value;
use tracing::debug;

use crate::entities::wearable::{FieldUpdate, MetricField, ProfileUpdate, WearableEvent};

/// Category used when the event type has no third segment
pub const UNKNOWN_CATEGORY: &str = "unknown";

/// Pure function turning an event's data payload into metric values
pub type ExtractionRule = fn(&Value) -> FieldUpdate;

static EXTRACTION_RULES: Lazy<HashMap<&'static str, ExtractionRule>> = Lazy::new(|| {
    let mut rules: HashMap<&'static str, ExtractionRule> = HashMap::new();

    rules.insert("steps", |payload| single_value(payload, MetricField::Steps));
    rules.insert("heart_rate_alert", |payload| single_value(payload, MetricField::HeartRate));
    rules.insert("glucose", |payload| single_value(payload, MetricField::Glucose));
    rules.insert("stress_level", |payload| single_value(payload, MetricField::StressLevel));
    rules.insert("workout_duration", |payload| {
        single_value(payload, MetricField::WorkoutDuration)
    });
    rules.insert("body_temperature", |payload| {
        single_value(payload, MetricField::BodyTemperature)
    });
    rules.insert("basal_body_temperature", |payload| {
        single_value(payload, MetricField::BasalBodyTemperature)
    });
    rules.insert("body_mass_index", |payload| {
        single_value(payload, MetricField::BodyMassIndex)
    });
    rules.insert("calories", |payload| single_value(payload, MetricField::Calories));
    rules.insert("calories_active", |payload| single_value(payload, MetricField::Calories));
    rules.insert("sleep", extract_sleep);
    rules.insert("blood_pressure", extract_blood_pressure);

    rules
});

/// Third dot-separated segment of an event type, `"unknown"` when absent or empty
pub fn category_from_event_type(event_type: &str) -> &str {
    match event_type.split('.').nth(2) {
        Some(category) if !category.is_empty() => category,
        _ => UNKNOWN_CATEGORY,
    }
}

/// Extraction rule registered for a category, if any
pub fn extraction_rule(category: &str) -> Option<ExtractionRule> {
    EXTRACTION_RULES.get(category).copied()
}

/// Turn a validated event into the update to merge into the user's profile
pub fn normalize_event(event: &WearableEvent, processed_at: DateTime<Utc>) -> ProfileUpdate {
    let category = category_from_event_type(&event.event_type);

    let (fields, unparsed) = match extraction_rule(category) {
        Some(rule) => (rule(&event.data), None),
        None => {
            debug!("No extraction rule for category {}, keeping raw payload", category);
            (FieldUpdate::new(), Some((category.to_string(), event.data.clone())))
        }
    };

    ProfileUpdate {
        user_id: event.user_id.clone(),
        last_event: event.event_type.clone(),
        processed_at,
        fields,
        unparsed,
    }
}

/// Number or numeric string; anything else is treated as absent
fn numeric(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Null => return None,
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(number) if number.is_finite() => Some(number),
        _ => {
            debug!("Skipping non-numeric metric value {}", value);
            None
        }
    }
}

fn first_data_point(payload: &Value) -> Option<&Value> {
    payload.get("data").and_then(|data| data.get(0))
}

fn single_value(payload: &Value, field: MetricField) -> FieldUpdate {
    let mut update = FieldUpdate::new();
    if let Some(value) = first_data_point(payload)
        .and_then(|point| point.get("value"))
        .and_then(numeric)
    {
        update.insert(field, value);
    }
    update
}

fn extract_sleep(payload: &Value) -> FieldUpdate {
    let mut update = FieldUpdate::new();

    // Only a JSON number counts as a sleep total; numeric strings are ignored.
    if let Some(total_seconds) = payload
        .get("total")
        .and_then(Value::as_f64)
        .filter(|total| total.is_finite())
    {
        let hours = (total_seconds / 3600.0 * 10.0).round() / 10.0;
        update.insert(MetricField::SleepHours, hours);
    }
    if let Some(hr_average) = payload.get("hr_average").and_then(numeric) {
        update.insert(MetricField::HeartRate, hr_average);
    }

    update
}

/// A side that is null or missing stays out of the update, so the stored
/// reading survives.
fn extract_blood_pressure(payload: &Value) -> FieldUpdate {
    let mut update = FieldUpdate::new();

    if let Some(point) = first_data_point(payload) {
        if let Some(systolic) = point.get("systolic").and_then(numeric) {
            update.insert(MetricField::BloodPressureSystolic, systolic);
        }
        if let Some(diastolic) = point.get("diastolic").and_then(numeric) {
            update.insert(MetricField::BloodPressureDiastolic, diastolic);
        }
    }

    update
}
