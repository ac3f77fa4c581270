use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use rand::{rngs::StdRng, SeedableRng};
use validator::Validate;

use db::models::{class_section, user::Role};
use services::access::require_elevated_access;
use services::attendance::AttendanceSessionService;
use util::state::AppState;

use crate::auth::claims::AuthUser;
use crate::response::ApiResponse;
use crate::routes::common::error_status;

use super::common::{
    AttendanceSessionResponse, CheckInReq, CheckInResponse, CreateSessionReq,
};

/// POST /api/attendance/sessions
///
/// Opens an attendance session for a class section. The caller must be
/// an admin or the teacher of record for the section. The window starts
/// at the server clock and runs for `duration_minutes`.
///
/// ### Responses
/// - `201 Created` with the session, including its join code
/// - `400 Bad Request` on validation failure
/// - `403 Forbidden` when the caller is not teacher-of-record or admin
/// - `404 Not Found` for an unknown class section
pub async fn create_session(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CreateSessionReq>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<AttendanceSessionResponse>::error(
                e.to_string(),
            )),
        );
    }

    let section = match class_section::Model::get_by_id(state.db(), req.class_section_id).await {
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
                "Only the teacher of this class or an admin may open a session",
            )),
        );
    }

    let mut rng = StdRng::from_entropy();
    match AttendanceSessionService::open_session(
        state.db(),
        &mut rng,
        req.class_section_id,
        req.duration_minutes,
        req.latitude,
        req.longitude,
    )
    .await
    {
        Ok(session) => (
            StatusCode::CREATED,
            Json(ApiResponse::success(
                AttendanceSessionResponse::from(session),
                "Attendance session opened",
            )),
        ),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}

/// POST /api/attendance/check-in
///
/// Records a check-in against the session holding the supplied code.
/// Students only; the reported position is stored and its distance to
/// the session target returned, but never gates the check-in.
///
/// ### Responses
/// - `200 OK` with the recorded distance
/// - `400 Bad Request` for an unknown code, a closed window, a caller
///   who is not enrolled, or a duplicate check-in
/// - `403 Forbidden` for non-student callers
pub async fn check_in(
    State(state): State<AppState>,
    Extension(AuthUser(claims)): Extension<AuthUser>,
    Json(req): Json<CheckInReq>,
) -> impl IntoResponse {
    if let Err(e) = req.validate() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<CheckInResponse>::error(e.to_string())),
        );
    }

    if claims.role != Role::Student {
        return (
            StatusCode::FORBIDDEN,
            Json(ApiResponse::error("Only students can check in")),
        );
    }

    match AttendanceSessionService::check_in(
        state.db(),
        &req.code,
        claims.sub,
        req.latitude,
        req.longitude,
    )
    .await
    {
        Ok(check_in) => (
            StatusCode::OK,
            Json(ApiResponse::success(
                CheckInResponse {
                    distance_m: check_in.distance_m,
                    checked_in_at: check_in.record.checked_in_at.to_rfc3339(),
                },
                "Check-in success",
            )),
        ),
        Err(e) => (error_status(&e), Json(ApiResponse::error(e.to_string()))),
    }
}
