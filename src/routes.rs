use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::state::AppState;

pub fn create_routes() -> Router<AppState> {
    Router::new()
        // Health check
        .route("/api/health", get(handlers::health_check))
        .route("/api/keys", get(handlers::key_status))

        // Agents
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/agents/:agent", post(handlers::run_single_agent))

        // History
        .route("/api/history/:user_id", get(handlers::get_history))

        // Auth
        .route("/api/auth/signup", post(handlers::signup))
        .route("/api/auth/login", post(handlers::login))
}

/// Full application router with middleware and state attached
pub fn app(state: AppState) -> Router {
    create_routes()
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
