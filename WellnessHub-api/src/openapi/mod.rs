use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Configure Swagger UI endpoints
pub fn configure_swagger_routes() -> SwaggerUi {
    SwaggerUi::new("/api-docs")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
}

// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health endpoints
        crate::api::handlers::health::health_check,

        // Wearable endpoints
        crate::api::handlers::webhook::receive_wearable_event,
        crate::api::handlers::profiles::list_profiles,
        crate::api::handlers::profiles::get_profile,
        crate::api::handlers::metrics::get_metrics,
        crate::api::handlers::metrics::get_batch_metrics,
        crate::api::handlers::metrics::metrics_usage,
    ),
    components(
        schemas(
            // Entities
            crate::entities::common::ErrorResponse,
            crate::entities::common::MessageResponse,
            crate::entities::webhook::WebhookEvent,
            crate::entities::wearable::PublicWearableProfile,
            crate::entities::wearable::ProfileListResponse,
            crate::entities::wearable::MetricsRequest,
            crate::entities::wearable::BatchMetricsRequest,
            crate::entities::wearable::MetricsResponse,
            crate::entities::wearable::BatchMetricsResponse,
            crate::entities::wearable::MetricsErrorResponse,
            crate::entities::wearable::MetricsUsageResponse,
            wellness_hub_domain::entities::WearableMetrics,

            // Health handlers
            crate::api::handlers::health::HealthResponse,
            crate::api::handlers::health::ComponentStatus,
            crate::api::handlers::health::ComponentHealthStatus,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoint"),
        (name = "wearables", description = "Wearable event ingestion, profiles and live metrics"),
    ),
    info(
        title = "WellnessHub API",
        version = "0.1.0",
        description = "API for ingesting wearable events and reading per-user health summaries",
        license(
            name = "MIT",
            url = "https://opensource.org/licenses/MIT"
        ),
    ),
    servers(
        (url = "/", description = "Local development server")
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_doc_generation() {
        let openapi = ApiDoc::openapi();

        assert_eq!(openapi.info.title, "WellnessHub API");
        assert_eq!(openapi.info.version, "0.1.0");

        let tags = openapi.tags.as_ref().unwrap();
        assert!(tags.iter().any(|tag| tag.name == "health"));
        assert!(tags.iter().any(|tag| tag.name == "wearables"));

        let paths = &openapi.paths.paths;
        assert!(paths.contains_key("/health"));
        assert!(paths.contains_key("/api/v1/wearables/webhook"));
        assert!(paths.contains_key("/api/v1/wearables/profiles"));
        assert!(paths.contains_key("/api/v1/wearables/profiles/{user_id}"));
        assert!(paths.contains_key("/api/v1/wearables/metrics"));
        assert!(paths.contains_key("/api/v1/wearables/metrics/batch"));
    }
}
