use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;
use utoipa::ToSchema;
use validator::Validate;

use wellness_hub_domain::entities::{MetricField, WearableMetrics, WearableProfile};

/// Prefix of the profile keys holding raw payloads of unmapped categories
pub const UNPARSED_PREFIX: &str = "unparsed_";

pub const USER_ID_REQUIRED: &str = "userId is required";
pub const USER_ID_NOT_STRING: &str = "userId must be a string";
pub const USER_IDS_INVALID: &str = "userIds must be a non-empty array of strings";

/// Public representation of a user's merged wearable profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PublicWearableProfile {
    pub user_id: String,

    /// Event type of the most recently processed event
    pub last_event: Option<String>,
    pub last_updated: Option<String>,
    pub updated_at: Option<String>,

    #[serde(serialize_with = "serialize_metric")]
    pub steps: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub heart_rate: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub sleep_hours: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub blood_pressure_systolic: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub blood_pressure_diastolic: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub glucose: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub body_temperature: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub calories: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub stress_level: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub workout_duration: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub basal_body_temperature: Option<f64>,
    #[serde(serialize_with = "serialize_metric")]
    pub body_mass_index: Option<f64>,

    /// Raw payloads keyed `unparsed_<category>`
    #[serde(flatten)]
    pub unparsed: BTreeMap<String, Value>,
}

impl From<WearableProfile> for PublicWearableProfile {
    fn from(profile: WearableProfile) -> Self {
        let metric = |field: MetricField| profile.metric(field);

        Self {
            steps: metric(MetricField::Steps),
            heart_rate: metric(MetricField::HeartRate),
            sleep_hours: metric(MetricField::SleepHours),
            blood_pressure_systolic: metric(MetricField::BloodPressureSystolic),
            blood_pressure_diastolic: metric(MetricField::BloodPressureDiastolic),
            glucose: metric(MetricField::Glucose),
            body_temperature: metric(MetricField::BodyTemperature),
            calories: metric(MetricField::Calories),
            stress_level: metric(MetricField::StressLevel),
            workout_duration: metric(MetricField::WorkoutDuration),
            basal_body_temperature: metric(MetricField::BasalBodyTemperature),
            body_mass_index: metric(MetricField::BodyMassIndex),
            unparsed: profile
                .unparsed
                .iter()
                .map(|(category, payload)| (format!("{}{}", UNPARSED_PREFIX, category), payload.clone()))
                .collect(),
            user_id: profile.user_id,
            last_event: profile.last_event,
            last_updated: profile.last_updated,
            updated_at: profile.updated_at,
        }
    }
}

/// Whole-number readings are written as JSON integers so `8000` reads back
/// as `8000` rather than `8000.0`.
fn serialize_metric<S: Serializer>(value: &Option<f64>, serializer: S) -> Result<S::Ok, S::Error> {
    // Largest magnitude below which every integer is exact in an f64
    const MAX_EXACT: f64 = 9_007_199_254_740_992.0;

    match value {
        Some(number) if number.fract() == 0.0 && number.abs() < MAX_EXACT => {
            serializer.serialize_i64(*number as i64)
        }
        Some(number) => serializer.serialize_f64(*number),
        None => serializer.serialize_none(),
    }
}

/// Users that have a stored profile
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ProfileListResponse {
    pub user_ids: Vec<String>,
    pub count: usize,
}

/// Body of a single-user metrics request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MetricsRequest {
    #[validate(length(min = 1, message = "userId is required"))]
    #[schema(example = "user-123")]
    pub user_id: String,
}

impl MetricsRequest {
    /// Read `userId` from a JSON body.
    ///
    /// Falsy values count as missing; any other non-string is a type error.
    pub fn from_json(body: &Value) -> Result<Self, &'static str> {
        let request = match body.get("userId") {
            Some(Value::String(user_id)) => Self {
                user_id: user_id.clone(),
            },
            None | Some(Value::Null) | Some(Value::Bool(false)) => return Err(USER_ID_REQUIRED),
            Some(Value::Number(n)) if n.as_f64() == Some(0.0) => return Err(USER_ID_REQUIRED),
            Some(_) => return Err(USER_ID_NOT_STRING),
        };

        request.validate().map_err(|_| USER_ID_REQUIRED)?;
        Ok(request)
    }
}

/// Body of a multi-user metrics request
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchMetricsRequest {
    #[validate(length(min = 1, max = 100, message = "userIds must contain 1 to 100 ids"))]
    pub user_ids: Vec<String>,
}

impl BatchMetricsRequest {
    pub fn from_json(body: Value) -> Result<Self, &'static str> {
        let request: Self = serde_json::from_value(body).map_err(|_| USER_IDS_INVALID)?;
        request.validate().map_err(|_| USER_IDS_INVALID)?;
        Ok(request)
    }
}

/// Metrics of one user
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricsResponse {
    pub success: bool,
    pub data: WearableMetrics,
    pub timestamp: DateTime<Utc>,
}

/// Metrics of several users keyed by user id
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BatchMetricsResponse {
    pub success: bool,
    pub data: BTreeMap<String, WearableMetrics>,
    pub timestamp: DateTime<Utc>,
}

/// Failure body of the metrics endpoints
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricsErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl MetricsErrorResponse {
    pub fn fetch_failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: "Failed to fetch wearable data".to_string(),
            message: message.into(),
        }
    }
}

/// Hint returned by `GET /api/v1/wearables/metrics`
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct MetricsUsageResponse {
    pub message: String,
    #[schema(value_type = Object)]
    pub example: Value,
}
