use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};

use db::models::{class_section, user::Role};
use services::access::require_elevated_access;
use services::attendance::{AttendanceQueryService, CodeProbe};
use util::state::AppState;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::error_status;

use super::common::{MyAttendanceRowResponse, SessionRecordsResponse, ValidateCodeQuery};

/// GET /api/attendance/sessions/{session_id}/records
///
/// Roster of a session: who checked in, when, and how far from the
/// session target. Restricted to the teacher of record of the session's
/// class section, or an admin.
pub async fn get_records(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Path(session_id): Path<i64>,
) -> impl IntoResponse {
    let records = match AttendanceQueryService::session_records(state.db(), session_id).await {
        Ok(records) => records,
        Err(e) => {
            return (
                error_status(&e),
                Json(ApiResponse::<SessionRecordsResponse>::error(e.to_string())),
            );
        }
    };

    let section =
        match class_section::Model::get_by_id(state.db(), records.session.class_section_id).await {
            Ok(Some(section)) => section,
            Ok(None) => {
                return (
                    StatusCode::NOT_FOUND,
                    Json(ApiResponse::error("Class section not found")),
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
                "Only the teacher of this class or an admin may view the roster",
            )),
        );
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(
            SessionRecordsResponse::from(records),
            "Attendance records retrieved",
        )),
    )
}

/// GET /api/attendance/my
///
/// The calling student's own check-in history, most recent first,
/// enriched with class and course names. Students only; empty for
/// students who never checked in.
pub async fn my_attendance(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
) -> impl IntoResponse {
    if claims.role != Role::Student {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::<Vec<MyAttendanceRowResponse>>::error(
                "Only students have an attendance history",
            )),
        );
    }

    match AttendanceQueryService::my_attendance(state.db(), claims.sub).await {
        Ok(rows) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                rows.into_iter()
                    .map(MyAttendanceRowResponse::from)
                    .collect::<Vec<_>>(),
                "Attendance history retrieved",
            )),
        ),
        Err(e) => (
            error_status(&e),
            Json(ApiResponse::<Vec<MyAttendanceRowResponse>>::error(
                e.to_string(),
            )),
        ),
    }
}

/// GET /api/attendance/sessions/validate?code=...
///
/// Read-only probe for a session code. Reports whether the window is
/// open and, for the calling user, enrollment and prior-check-in state.
/// Never writes anything.
pub async fn validate_code(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Query(query): Query<ValidateCodeQuery>,
) -> impl IntoResponse {
    match AttendanceQueryService::validate_code(state.db(), &query.code, Some(claims.sub)).await {
        Ok(probe) => (
            StatusCode::OK,
            Json(ApiResponse::success(probe, "Code resolved")),
        ),
        Err(e) => (
            error_status(&e),
            Json(ApiResponse::<CodeProbe>::error(e.to_string())),
        ),
    }
}
