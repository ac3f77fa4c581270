use axum::http::StatusCode;
use services::ServiceError;

/// Maps the service failure taxonomy onto HTTP status codes. The
/// distinct check-in outcomes all surface as 400 with their own
/// message, matching what clients display verbatim.
pub fn error_status(err: &ServiceError) -> StatusCode {
    match err {
        ServiceError::NotFound(_) => StatusCode::NOT_FOUND,
        ServiceError::Forbidden => StatusCode::FORBIDDEN,
        ServiceError::InvalidCode
        | ServiceError::WindowClosed
        | ServiceError::NotEnrolled
        | ServiceError::AlreadyCheckedIn
        | ServiceError::Validation(_) => StatusCode::BAD_REQUEST,
        ServiceError::CodeGenerationFailed | ServiceError::Db(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
