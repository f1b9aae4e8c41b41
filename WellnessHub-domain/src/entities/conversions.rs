use std::collections::BTreeMap;

use chrono::SecondsFormat;
use wellness_hub_data::models::{ProfileUpdateRecord, UnparsedPayload, WearableProfileRecord};

use crate::entities::wearable::{MetricField, ProfileUpdate, WearableProfile};

/// Conversion functions between domain entities and data models
/// These functions follow the pattern convert_to_[target_layer]_[model_name]

/// Column of a storage record that holds the given metric
fn record_column(record: &mut ProfileUpdateRecord, field: MetricField) -> &mut Option<f64> {
    match field {
        MetricField::Steps => &mut record.steps,
        MetricField::HeartRate => &mut record.heart_rate,
        MetricField::SleepHours => &mut record.sleep_hours,
        MetricField::BloodPressureSystolic => &mut record.blood_pressure_systolic,
        MetricField::BloodPressureDiastolic => &mut record.blood_pressure_diastolic,
        MetricField::Glucose => &mut record.glucose,
        MetricField::BodyTemperature => &mut record.body_temperature,
        MetricField::Calories => &mut record.calories,
        MetricField::StressLevel => &mut record.stress_level,
        MetricField::WorkoutDuration => &mut record.workout_duration,
        MetricField::BasalBodyTemperature => &mut record.basal_body_temperature,
        MetricField::BodyMassIndex => &mut record.body_mass_index,
    }
}

fn stored_value(record: &WearableProfileRecord, field: MetricField) -> Option<f64> {
    match field {
        MetricField::Steps => record.steps,
        MetricField::HeartRate => record.heart_rate,
        MetricField::SleepHours => record.sleep_hours,
        MetricField::BloodPressureSystolic => record.blood_pressure_systolic,
        MetricField::BloodPressureDiastolic => record.blood_pressure_diastolic,
        MetricField::Glucose => record.glucose,
        MetricField::BodyTemperature => record.body_temperature,
        MetricField::Calories => record.calories,
        MetricField::StressLevel => record.stress_level,
        MetricField::WorkoutDuration => record.workout_duration,
        MetricField::BasalBodyTemperature => record.basal_body_temperature,
        MetricField::BodyMassIndex => record.body_mass_index,
    }
}

/// Convert from domain update to the data model merged by the repository
pub fn convert_to_data_update(update: &ProfileUpdate) -> ProfileUpdateRecord {
    let timestamp = update
        .processed_at
        .to_rfc3339_opts(SecondsFormat::Millis, true);

    let mut record = ProfileUpdateRecord {
        user_id: update.user_id.clone(),
        last_event: update.last_event.clone(),
        last_updated: timestamp.clone(),
        updated_at: timestamp,
        unparsed: update
            .unparsed
            .as_ref()
            .map(|(category, payload)| UnparsedPayload {
                category: category.clone(),
                payload: payload.clone(),
            }),
        ..ProfileUpdateRecord::default()
    };

    for (field, value) in &update.fields {
        *record_column(&mut record, *field) = Some(*value);
    }

    record
}

/// Convert from data model to domain entity for a wearable profile
pub fn convert_to_domain_profile(record: WearableProfileRecord) -> WearableProfile {
    let metrics: BTreeMap<MetricField, f64> = MetricField::ALL
        .iter()
        .filter_map(|field| stored_value(&record, *field).map(|value| (*field, value)))
        .collect();

    WearableProfile {
        user_id: record.user_id,
        last_event: record.last_event,
        last_updated: record.last_updated,
        updated_at: record.updated_at,
        metrics,
        unparsed: record.unparsed,
    }
}
