use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use super::handlers;
use super::AppState;
use crate::middleware::{make_span_with_request_id, request_id_middleware};

/// Creates the main API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health_check))
        .nest("/api/v1", api_routes())
        .layer(
            ServiceBuilder::new()
                .layer(from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http().make_span_with(make_span_with_request_id))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Engine routes under /api/v1
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/categories", get(handlers::get_categories))
        // Recommendations
        .route("/recommendations/:user_id", get(handlers::get_recommendations))
        .route(
            "/recommendations/:user_id/explain/:item_id",
            get(handlers::explain_recommendation),
        )
        .route("/emergency_services", get(handlers::get_emergency_services))
        .route("/seasonal/:season", get(handlers::get_seasonal_recommendations))
        // Profiles & interactions
        .route("/user_profile", post(handlers::create_user_profile))
        .route("/urgent_need", post(handlers::set_urgent_need))
        .route("/track_interaction", post(handlers::track_interaction))
        // Snapshots
        .route("/snapshot/save", post(handlers::save_snapshot))
        .route("/snapshot/load", post(handlers::load_snapshot))
}
