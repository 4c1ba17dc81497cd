pub mod health;
pub mod quiz;

use crate::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/api/quiz/generate", post(quiz::generate_quiz))
        .route("/api/quiz/explain", post(quiz::explain_answer))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
