use crate::handlers;
use crate::middleware::require_user;
use crate::state::AppState;
use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use tower_http::normalize_path::NormalizePathLayer;
use tower_http::trace::TraceLayer;

/// Build and configure the application router
pub fn build_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/weather", get(handlers::get_weather))
        .route("/exchange", get(handlers::get_exchange_rate))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_user));

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Registration and admin seeding stay open: a user cannot pass
        // the auth check before registering
        .route("/user", post(handlers::create_user))
        .route("/admin", post(handlers::create_popular))
        .merge(protected)
        // Middleware
        .layer(NormalizePathLayer::trim_trailing_slash())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
