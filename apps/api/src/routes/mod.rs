pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assistant::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::handle_index))
        .route("/health", get(health::health_handler))
        .route("/api/v1/actions", get(handlers::handle_list_actions))
        .route("/api/v1/actions/:action", post(handlers::handle_run_action))
        .with_state(state)
}
