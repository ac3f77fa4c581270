use axum::{
    routing::{get, post},
    Router,
};
use util::state::AppState;

pub mod common;
pub mod get;
pub mod post;

pub fn attendance_routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", post(post::create_session))
        .route("/check-in", post(post::check_in))
        .route("/sessions/validate", get(get::validate_code))
        .route("/sessions/{session_id}/records", get(get::get_records))
        .route("/my", get(get::my_attendance))
}
