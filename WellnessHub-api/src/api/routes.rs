use axum::{
    routing::{get, post},
    Extension, Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::debug;

use crate::api::handlers::{self, health, AppState};
use crate::openapi::configure_swagger_routes;

/// Create the application router
pub fn create_app(
    state: AppState,
    health_service: health::HealthService,
    environment: &str,
) -> Router {
    debug!("Creating application router");

    let wearable_routes = Router::new()
        .route("/webhook", post(handlers::receive_wearable_event))
        .route("/profiles", get(handlers::list_profiles))
        .route("/profiles/:user_id", get(handlers::get_profile))
        .route("/metrics/batch", post(handlers::get_batch_metrics))
        .route(
            "/metrics",
            get(handlers::metrics_usage).post(handlers::get_metrics),
        );

    debug!("Wearable routes configured");

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .layer(Extension(health_service))
        .layer(Extension(health::AppEnvironment(environment.to_string())));

    let app = Router::new()
        .merge(public_routes)
        .nest("/api/v1/wearables", wearable_routes)
        .with_state(state);

    debug!("API routes nested");

    let app = add_swagger_ui(app);

    // Initialize health check service startup time
    health::initialize_server_start_time();

    app.layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Add Swagger UI to the router
pub fn add_swagger_ui(app: Router) -> Router {
    app.merge(configure_swagger_routes())
}
