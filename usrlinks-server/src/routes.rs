use axum::{Router, http::Method, routing::get};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::handlers::{
    check_handler, dorks_handler, fuzzy_handler, health_handler,
    platforms_handler, status_handler, variants_handler,
};
use crate::state::AppState;

pub fn create_router(state: AppState) -> Router {
    let cors_layer = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET]);

    Router::new()
        .route("/check/{handle}", get(check_handler))
        .route("/fuzzy/{handle}", get(fuzzy_handler))
        .route("/status/{scan_id}", get(status_handler))
        .route("/dorks/{handle}", get(dorks_handler))
        .route("/variants/{handle}", get(variants_handler))
        .route("/platforms", get(platforms_handler))
        .route("/health", get(health_handler))
        .layer(cors_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
