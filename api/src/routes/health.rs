use axum::{http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use util::state::AppState;

use crate::response::ApiResponse;

#[derive(Serialize, Default)]
pub struct HealthStatus {
    pub status: String,
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/", get(health))
}

async fn health() -> (StatusCode, Json<ApiResponse<HealthStatus>>) {
    (
        StatusCode::OK,
        Json(ApiResponse::success(
            HealthStatus {
                status: "ok".into(),
            },
            "Service is healthy",
        )),
    )
}
