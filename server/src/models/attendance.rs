use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "check_in_method", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CheckInMethod {
    QrScan,
    Manual,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub registration_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub method: CheckInMethod,
    pub recorded_by: Option<Uuid>,
}

#[derive(Debug, Clone)]
pub struct NewAttendance {
    pub registration_id: Uuid,
    pub checked_in_at: DateTime<Utc>,
    pub method: CheckInMethod,
    pub recorded_by: Option<Uuid>,
}

/// Attendance as seen by the door: derived from the record, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceState {
    Registered,
    CheckedIn,
    CheckedOut,
}

impl AttendanceState {
    pub fn from_record(record: Option<&AttendanceRecord>) -> Self {
        match record {
            None => AttendanceState::Registered,
            Some(r) if r.checked_out_at.is_some() => AttendanceState::CheckedOut,
            Some(_) => AttendanceState::CheckedIn,
        }
    }
}

/// Result of the store's conditional attendance insert.
#[derive(Debug, Clone)]
pub enum AttendanceInsert {
    Created(AttendanceRecord),
    AlreadyRecorded,
    NotConfirmed,
}
