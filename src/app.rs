use crate::handlers;
use crate::state::AppState;
use axum::{routing::{get, post}, Router};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/checkin", post(handlers::check_in_form))
        .route("/api/summary", get(handlers::get_summary))
        .route("/api/attendees", get(handlers::get_attendees))
        .route("/api/checkin", post(handlers::check_in))
        .with_state(state)
}
