use axum::{routing::get, Router};
use util::state::AppState;

pub mod get;

pub fn report_routes() -> Router<AppState> {
    Router::new().route("/progress/class/{class_id}", get(get::class_progress))
}
