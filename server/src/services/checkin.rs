//! Door-side state machine: `registered -> checked_in -> checked_out`.
//!
//! The transition into `checked_in` is a single conditional insert in the
//! store, backed by the unique index on `attendance_records.registration_id`.
//! Two scans racing on the same token produce one record and one
//! `DuplicateCheckIn`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::{
    AttendanceInsert, AttendanceRecord, AttendanceState, CheckInMethod, NewAttendance,
    Registration,
};
use crate::store::Store;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct ScanRequest {
    pub token: String,
    #[serde(default)]
    pub recorded_by: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ManualCheckInRequest {
    #[serde(default)]
    pub recorded_by: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckInResult {
    pub registration_id: Uuid,
    pub event_id: Uuid,
    pub attendee_id: Uuid,
    pub quantity: i32,
    pub state: AttendanceState,
    pub attendance: AttendanceRecord,
}

impl CheckInResult {
    fn new(registration: &Registration, attendance: AttendanceRecord) -> Self {
        Self {
            registration_id: registration.id,
            event_id: registration.event_id,
            attendee_id: registration.attendee_id,
            quantity: registration.quantity,
            state: AttendanceState::from_record(Some(&attendance)),
            attendance,
        }
    }
}

/// Checks in the holder of a scanned token at `event_id`.
pub async fn check_in_by_token(
    store: &dyn Store,
    event_id: Uuid,
    request: ScanRequest,
) -> Result<CheckInResult, AppError> {
    let token = request.token.trim();
    if token.is_empty() {
        return Err(AppError::ValidationError("QR token is required".to_string()));
    }

    let registration = store
        .find_registration_by_token(token)
        .await?
        .ok_or_else(|| AppError::NotFound("Unknown QR token".to_string()))?;

    if registration.event_id != event_id {
        warn!(
            registration_id = %registration.id,
            event_id = %event_id,
            "Token scanned at the wrong event"
        );
        return Err(AppError::InvalidRegistration(
            "Ticket belongs to a different event".to_string(),
        ));
    }

    record_check_in(store, registration, CheckInMethod::QrScan, request.recorded_by).await
}

/// Operator check-in by registration id, for attendees without a scannable code.
pub async fn check_in_manually(
    store: &dyn Store,
    registration_id: Uuid,
    request: ManualCheckInRequest,
) -> Result<CheckInResult, AppError> {
    let registration = store
        .get_registration(registration_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Registration '{registration_id}'")))?;

    record_check_in(store, registration, CheckInMethod::Manual, request.recorded_by).await
}

async fn record_check_in(
    store: &dyn Store,
    registration: Registration,
    method: CheckInMethod,
    recorded_by: Option<Uuid>,
) -> Result<CheckInResult, AppError> {
    if !registration.is_confirmed() {
        warn!(registration_id = %registration.id, "Check-in refused for cancelled registration");
        return Err(cancelled(registration.id));
    }
    if let Some(organizer_id) = recorded_by {
        if store.get_organizer(organizer_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Organizer '{organizer_id}'")));
        }
    }

    let attendance = NewAttendance {
        registration_id: registration.id,
        checked_in_at: Utc::now(),
        method,
        recorded_by,
    };

    match store.insert_attendance_if_absent(attendance).await? {
        AttendanceInsert::Created(record) => {
            info!(
                registration_id = %registration.id,
                method = ?method,
                "Attendee checked in"
            );
            Ok(CheckInResult::new(&registration, record))
        }
        AttendanceInsert::AlreadyRecorded => {
            warn!(registration_id = %registration.id, "Duplicate check-in");
            Err(AppError::DuplicateCheckIn {
                registration_id: registration.id,
            })
        }
        // Cancelled between our read and the insert.
        AttendanceInsert::NotConfirmed => Err(cancelled(registration.id)),
    }
}

pub async fn check_out(store: &dyn Store, registration_id: Uuid) -> Result<CheckInResult, AppError> {
    let registration = store
        .get_registration(registration_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Registration '{registration_id}'")))?;

    if let Some(record) = store.check_out(registration_id, Utc::now()).await? {
        info!(registration_id = %registration_id, "Attendee checked out");
        return Ok(CheckInResult::new(&registration, record));
    }

    match store.get_attendance(registration_id).await? {
        Some(_) => Err(AppError::Conflict(format!(
            "Registration '{registration_id}' is already checked out"
        ))),
        None => Err(AppError::Conflict(format!(
            "Registration '{registration_id}' has not checked in"
        ))),
    }
}

fn cancelled(registration_id: Uuid) -> AppError {
    AppError::InvalidRegistration(format!("Registration '{registration_id}' is cancelled"))
}
