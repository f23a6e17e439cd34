pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::assessment::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route(
            "/assess_visa_eligibility/",
            post(handlers::handle_assess),
        )
        .route("/assess_visa_eligibility", post(handlers::handle_assess))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}
