use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use db::models::class_section;
use services::access::require_elevated_access;
use services::progress::{ClassProgressReport, ProgressService};
use util::state::AppState;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::error_status;

/// GET /api/reports/progress/class/{class_id}
///
/// Aggregate progress report for a class section: per-student effective
/// averages and completion, overall completion, and a fixed grade
/// distribution. Restricted to the teacher of record or an admin.
///
/// ### Responses
/// - `200 OK` with the report (empty shape when the class has no
///   students or no assignments)
/// - `403 Forbidden` when the caller is not teacher-of-record or admin
/// - `404 Not Found` for an unknown class section
pub async fn class_progress(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(class_id): Path<i64>,
) -> impl IntoResponse {
    let section = match class_section::Model::get_by_id(state.db(), class_id).await {
        Ok(Some(section)) => section,
        Ok(None) => {
            return (
                StatusCode::NOT_FOUND,
                Json(ApiResponse::<ClassProgressReport>::error(
                    "Class section not found",
                )),
            );
        }
        Err(e) => {
            tracing::error!(error = %e, "failed to load class section");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::error("Database error")),
            );
        }
    };

    if let Err(e) = require_elevated_access(claims.role, claims.sub, &section) {
        return (
            error_status(&e),
            Json(ApiResponse::error(
                "Only the teacher of this class or an admin may view reports",
            )),
        );
    }

    match ProgressService::class_progress(state.db(), class_id).await {
        Ok(report) => (
            StatusCode::OK,
            Json(ApiResponse::success(report, "Progress report generated")),
        ),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}
