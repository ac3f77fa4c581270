//! Shared capability predicate for teacher/admin-gated operations.

use db::models::class_section;
use db::models::user::Role;

use crate::error::ServiceError;

/// True when the caller may manage `class_section`: admins always, the
/// teacher of record for their own sections.
pub fn has_elevated_access(role: Role, user_id: i64, class_section: &class_section::Model) -> bool {
    match role {
        Role::Admin => true,
        Role::Teacher => class_section.teacher_id == user_id,
        Role::Student => false,
    }
}

/// Guard form of [`has_elevated_access`] for class-scoped operations.
pub fn require_elevated_access(
    role: Role,
    user_id: i64,
    class_section: &class_section::Model,
) -> Result<(), ServiceError> {
    if has_elevated_access(role, user_id, class_section) {
        Ok(())
    } else {
        Err(ServiceError::Forbidden)
    }
}
