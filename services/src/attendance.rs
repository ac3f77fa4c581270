//! Attendance sessions: opening, QR check-in, and the read side.
//!
//! Session lifecycle is Pending -> Active -> Expired, derived purely
//! from the clock against the stored window; nothing transitions state
//! in the background.

use std::collections::HashMap;

use chrono::{Duration, Utc};
use db::models::{attendance_record, attendance_session, class_section, course, enrollment, user};
use rand::Rng;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set};
use serde::Serialize;

use crate::code::{generate_code, MAX_CODE_ATTEMPTS, SESSION_CODE_LEN};
use crate::error::{is_unique_violation, ServiceError};
use crate::geo::{haversine_distance_m, round1};

/// Outcome of a successful check-in. `distance_m` is the rounded
/// haversine distance from the reported position to the session target;
/// it is informational only and never gates the check-in.
#[derive(Debug, Serialize)]
pub struct CheckIn {
    pub record: attendance_record::Model,
    pub session_id: i64,
    pub class_section_id: i64,
    pub distance_m: f64,
}

/// Write side: session creation and check-in.
pub struct AttendanceSessionService;

impl AttendanceSessionService {
    /// Opens a session for a class section. The window always starts at
    /// the server clock; client-supplied start times are not accepted.
    ///
    /// The 8-character code is resampled on collision, bounded by
    /// `MAX_CODE_ATTEMPTS`; losing the unique-index race on insert is
    /// treated as a collision as well.
    pub async fn open_session<R: Rng + ?Sized>(
        db: &DatabaseConnection,
        rng: &mut R,
        class_section_id: i64,
        duration_minutes: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<attendance_session::Model, ServiceError> {
        if duration_minutes < 1 {
            return Err(ServiceError::Validation(
                "duration_minutes must be at least 1".into(),
            ));
        }
        if class_section::Model::get_by_id(db, class_section_id)
            .await?
            .is_none()
        {
            return Err(ServiceError::NotFound("ClassSection".into()));
        }

        let start = Utc::now();
        let end = start + Duration::minutes(duration_minutes);

        for _ in 0..MAX_CODE_ATTEMPTS {
            let code = generate_code(rng, SESSION_CODE_LEN);
            if attendance_session::Model::find_by_code(db, &code)
                .await?
                .is_some()
            {
                continue;
            }

            let active = attendance_session::ActiveModel {
                class_section_id: Set(class_section_id),
                code: Set(code),
                start_time: Set(start),
                end_time: Set(end),
                latitude: Set(latitude),
                longitude: Set(longitude),
                created_at: Set(start),
                ..Default::default()
            };
            match active.insert(db).await {
                Ok(session) => {
                    tracing::info!(
                        session_id = session.id,
                        class_section_id,
                        duration_minutes,
                        "attendance session opened"
                    );
                    return Ok(session);
                }
                Err(e) if is_unique_violation(&e) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        Err(ServiceError::CodeGenerationFailed)
    }

    /// Records a check-in for `user_id` against the session holding
    /// `code`. Preconditions are checked in order, each with its own
    /// failure: code resolves, window contains now (inclusive bounds),
    /// caller is enrolled, caller has not already checked in. A
    /// concurrent duplicate that slips past the existence check is
    /// caught by the unique index and reported as `AlreadyCheckedIn`.
    pub async fn check_in(
        db: &DatabaseConnection,
        code: &str,
        user_id: i64,
        latitude: f64,
        longitude: f64,
    ) -> Result<CheckIn, ServiceError> {
        let now = Utc::now();

        let session = attendance_session::Model::find_by_code(db, code)
            .await?
            .ok_or(ServiceError::InvalidCode)?;

        if !session.window_contains(now) {
            return Err(ServiceError::WindowClosed);
        }

        if !enrollment::Model::is_enrolled(db, user_id, session.class_section_id).await? {
            return Err(ServiceError::NotEnrolled);
        }

        if attendance_record::Model::exists_for(db, session.id, user_id).await? {
            return Err(ServiceError::AlreadyCheckedIn);
        }

        let active = attendance_record::ActiveModel {
            attendance_session_id: Set(session.id),
            user_id: Set(user_id),
            checked_in_at: Set(now),
            latitude: Set(latitude),
            longitude: Set(longitude),
            ..Default::default()
        };
        let record = match active.insert(db).await {
            Ok(record) => record,
            Err(e) if is_unique_violation(&e) => return Err(ServiceError::AlreadyCheckedIn),
            Err(e) => return Err(e.into()),
        };

        let distance_m = round1(haversine_distance_m(
            latitude,
            longitude,
            session.latitude,
            session.longitude,
        ));

        tracing::info!(
            session_id = session.id,
            user_id,
            distance_m,
            "attendance check-in recorded"
        );

        Ok(CheckIn {
            session_id: session.id,
            class_section_id: session.class_section_id,
            record,
            distance_m,
        })
    }
}

/// One row of a session roster.
#[derive(Debug, Serialize)]
pub struct SessionRecordRow {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub checked_in_at: chrono::DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    /// Distance to the session target, recomputed at read time.
    pub distance_m: f64,
}

/// Session metadata plus its full roster.
#[derive(Debug, Serialize)]
pub struct SessionRecords {
    pub session: attendance_session::Model,
    pub total_checked: usize,
    pub records: Vec<SessionRecordRow>,
}

/// One row of a student's personal attendance history.
#[derive(Debug, Serialize)]
pub struct MyAttendanceRow {
    pub record_id: i64,
    pub session_id: i64,
    pub code: String,
    pub class_id: i64,
    pub class_name: String,
    pub course_name: String,
    pub checked_in_at: chrono::DateTime<Utc>,
}

/// Result of the read-only code probe.
#[derive(Debug, Default, Serialize)]
pub struct CodeProbe {
    pub session_id: i64,
    pub class_section_id: i64,
    /// Whether the session window contains the probe time.
    pub active: bool,
    /// Whether any check-in at all exists for the session.
    pub has_any_checkin: bool,
    /// Only populated when a caller id was supplied.
    pub enrolled: Option<bool>,
    pub already_checked_in: Option<bool>,
}

/// Read side of the attendance subsystem.
pub struct AttendanceQueryService;

impl AttendanceQueryService {
    /// Roster of a session with per-record distance to the target.
    /// Records come back in storage order.
    pub async fn session_records(
        db: &DatabaseConnection,
        session_id: i64,
    ) -> Result<SessionRecords, ServiceError> {
        let session = attendance_session::Model::get_by_id(db, session_id)
            .await?
            .ok_or_else(|| ServiceError::NotFound("AttendanceSession".into()))?;

        let records = attendance_record::Model::for_session(db, session_id).await?;
        let users = load_users(db, records.iter().map(|r| r.user_id)).await?;

        let rows = records
            .into_iter()
            .map(|r| {
                let distance_m = round1(haversine_distance_m(
                    r.latitude,
                    r.longitude,
                    session.latitude,
                    session.longitude,
                ));
                let (username, full_name) = users
                    .get(&r.user_id)
                    .map(|u| (u.username.clone(), u.full_name.clone()))
                    .unwrap_or_default();
                SessionRecordRow {
                    user_id: r.user_id,
                    username,
                    full_name,
                    checked_in_at: r.checked_in_at,
                    latitude: r.latitude,
                    longitude: r.longitude,
                    distance_m,
                }
            })
            .collect::<Vec<_>>();

        Ok(SessionRecords {
            total_checked: rows.len(),
            session,
            records: rows,
        })
    }

    /// A user's check-in history across all classes, most recent first,
    /// enriched with session, class and course names.
    pub async fn my_attendance(
        db: &DatabaseConnection,
        user_id: i64,
    ) -> Result<Vec<MyAttendanceRow>, ServiceError> {
        let records = attendance_record::Model::for_user(db, user_id).await?;
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let session_ids: Vec<i64> = records.iter().map(|r| r.attendance_session_id).collect();
        let sessions: HashMap<i64, attendance_session::Model> = attendance_session::Entity::find()
            .filter(attendance_session::Column::Id.is_in(session_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|s| (s.id, s))
            .collect();

        let class_ids: Vec<i64> = sessions.values().map(|s| s.class_section_id).collect();
        let classes: HashMap<i64, class_section::Model> = class_section::Entity::find()
            .filter(class_section::Column::Id.is_in(class_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let course_ids: Vec<i64> = classes.values().map(|c| c.course_id).collect();
        let courses: HashMap<i64, course::Model> = course::Entity::find()
            .filter(course::Column::Id.is_in(course_ids))
            .all(db)
            .await?
            .into_iter()
            .map(|c| (c.id, c))
            .collect();

        let rows = records
            .into_iter()
            .filter_map(|r| {
                let session = sessions.get(&r.attendance_session_id)?;
                let class = classes.get(&session.class_section_id)?;
                let course_name = courses
                    .get(&class.course_id)
                    .map(|c| c.name.clone())
                    .unwrap_or_default();
                Some(MyAttendanceRow {
                    record_id: r.id,
                    session_id: session.id,
                    code: session.code.clone(),
                    class_id: class.id,
                    class_name: class.name.clone(),
                    course_name,
                    checked_in_at: r.checked_in_at,
                })
            })
            .collect();

        Ok(rows)
    }

    /// Read-only probe for a session code: resolves it, reports whether
    /// the window is currently open, and with a caller id also whether
    /// that caller is enrolled or has already checked in.
    pub async fn validate_code(
        db: &DatabaseConnection,
        code: &str,
        caller: Option<i64>,
    ) -> Result<CodeProbe, ServiceError> {
        let session = attendance_session::Model::find_by_code(db, code)
            .await?
            .ok_or_else(|| ServiceError::NotFound("AttendanceSession".into()))?;

        let now = Utc::now();
        let existing = attendance_record::Model::for_session(db, session.id).await?;

        let (enrolled, already_checked_in) = match caller {
            Some(user_id) => {
                let enrolled =
                    enrollment::Model::is_enrolled(db, user_id, session.class_section_id).await?;
                let checked = existing.iter().any(|r| r.user_id == user_id);
                (Some(enrolled), Some(checked))
            }
            None => (None, None),
        };

        Ok(CodeProbe {
            session_id: session.id,
            class_section_id: session.class_section_id,
            active: session.window_contains(now),
            has_any_checkin: !existing.is_empty(),
            enrolled,
            already_checked_in,
        })
    }
}

async fn load_users(
    db: &DatabaseConnection,
    ids: impl Iterator<Item = i64>,
) -> Result<HashMap<i64, user::Model>, ServiceError> {
    let ids: Vec<i64> = ids.collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }
    let users = user::Entity::find()
        .filter(user::Column::Id.is_in(ids))
        .all(db)
        .await?;
    Ok(users.into_iter().map(|u| (u.id, u)).collect())
}
