use serde::{Deserialize, Serialize};
use services::attendance::{SessionRecordRow, SessionRecords};
use validator::Validate;

#[derive(Debug, Deserialize, Validate)]
pub struct CreateSessionReq {
    pub class_section_id: i64,
    #[validate(range(min = 1, max = 1440))]
    pub duration_minutes: i64,
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CheckInReq {
    #[validate(length(min = 1))]
    pub code: String,
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Deserialize)]
pub struct ValidateCodeQuery {
    pub code: String,
}

#[derive(Debug, Serialize, Default)]
pub struct AttendanceSessionResponse {
    pub id: i64,
    pub class_section_id: i64,
    pub code: String,
    pub start_time: String,
    pub end_time: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl From<db::models::attendance_session::Model> for AttendanceSessionResponse {
    fn from(m: db::models::attendance_session::Model) -> Self {
        Self {
            id: m.id,
            class_section_id: m.class_section_id,
            code: m.code,
            start_time: m.start_time.to_rfc3339(),
            end_time: m.end_time.to_rfc3339(),
            latitude: m.latitude,
            longitude: m.longitude,
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct CheckInResponse {
    pub distance_m: f64,
    pub checked_in_at: String,
}

#[derive(Debug, Serialize, Default)]
pub struct SessionRecordRowResponse {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub checked_in_at: String,
    pub latitude: f64,
    pub longitude: f64,
    pub distance_m: f64,
}

impl From<SessionRecordRow> for SessionRecordRowResponse {
    fn from(r: SessionRecordRow) -> Self {
        Self {
            user_id: r.user_id,
            username: r.username,
            full_name: r.full_name,
            checked_in_at: r.checked_in_at.to_rfc3339(),
            latitude: r.latitude,
            longitude: r.longitude,
            distance_m: r.distance_m,
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct SessionRecordsResponse {
    pub session: AttendanceSessionResponse,
    pub total_checked: usize,
    pub records: Vec<SessionRecordRowResponse>,
}

impl From<SessionRecords> for SessionRecordsResponse {
    fn from(r: SessionRecords) -> Self {
        Self {
            session: r.session.into(),
            total_checked: r.total_checked,
            records: r.records.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Serialize, Default)]
pub struct MyAttendanceRowResponse {
    pub record_id: i64,
    pub session_id: i64,
    pub code: String,
    pub class_id: i64,
    pub class_name: String,
    pub course_name: String,
    pub checked_in_at: String,
}

impl From<services::attendance::MyAttendanceRow> for MyAttendanceRowResponse {
    fn from(r: services::attendance::MyAttendanceRow) -> Self {
        Self {
            record_id: r.record_id,
            session_id: r.session_id,
            code: r.code,
            class_id: r.class_id,
            class_name: r.class_name,
            course_name: r.course_name,
            checked_in_at: r.checked_in_at.to_rfc3339(),
        }
    }
}
