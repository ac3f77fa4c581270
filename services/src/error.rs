use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

/// Failure taxonomy surfaced to callers as distinct, user-readable
/// outcomes. Nothing here is retried internally; store errors propagate
/// unchanged inside `Db`.
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("{0} not found")]
    NotFound(String),

    #[error("Forbidden")]
    Forbidden,

    #[error("Invalid code")]
    InvalidCode,

    #[error("Attendance time is over or not started")]
    WindowClosed,

    #[error("You are not in this class")]
    NotEnrolled,

    #[error("You have already checked in")]
    AlreadyCheckedIn,

    #[error("Could not generate a unique code")]
    CodeGenerationFailed,

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Db(#[from] DbErr),
}

/// True when the database rejected an insert on a unique index.
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
