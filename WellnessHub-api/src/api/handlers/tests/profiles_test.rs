use axum::http::{Method, StatusCode};
use serde_json::json;
use wellness_hub_domain::entities::{MetricField, WearableProfile};
use wellness_hub_domain::testing::{FixtureMetricsProvider, MockIngestionService};

use super::{send, test_app};

fn profile(user_id: &str) -> WearableProfile {
    let mut profile = WearableProfile {
        user_id: user_id.to_string(),
        last_event: Some("daily.data.sleep.created".to_string()),
        ..WearableProfile::default()
    };
    profile.metrics.insert(MetricField::SleepHours, 7.5);
    profile.unparsed.insert("vo2_max".to_string(), json!({"value": 41}));
    profile
}

#[tokio::test]
async fn test_get_profile() {
    let app = test_app(
        MockIngestionService::new().with_profile(profile("user-1")),
        FixtureMetricsProvider::new(),
    );

    let (status, body) = send(app, Method::GET, "/api/v1/wearables/profiles/user-1", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user_id"], json!("user-1"));
    assert_eq!(body["sleep_hours"], json!(7.5));
    assert_eq!(body["steps"], json!(null));
    assert_eq!(body["unparsed_vo2_max"], json!({"value": 41}));
}

#[tokio::test]
async fn test_get_missing_profile() {
    let app = test_app(MockIngestionService::new(), FixtureMetricsProvider::new());

    let (status, body) = send(app, Method::GET, "/api/v1/wearables/profiles/nobody", None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({"error": "Profile not found"}));
}

#[tokio::test]
async fn test_list_profiles() {
    let app = test_app(
        MockIngestionService::new()
            .with_profile(profile("user-2"))
            .with_profile(profile("user-1")),
        FixtureMetricsProvider::new(),
    );

    let (status, body) = send(app, Method::GET, "/api/v1/wearables/profiles", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"user_ids": ["user-1", "user-2"], "count": 2}));
}

#[tokio::test]
async fn test_list_profiles_failure() {
    let app = test_app(
        MockIngestionService::new().with_storage_failure(),
        FixtureMetricsProvider::new(),
    );

    let (status, body) = send(app, Method::GET, "/api/v1/wearables/profiles", None).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body, json!({"error": "Failed to load profile"}));
}
