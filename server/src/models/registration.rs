use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::attendance::{AttendanceRecord, AttendanceState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "payment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Completed,
    Refunded,
}

impl PaymentStatus {
    /// Refunds are final; everything else moves forward only.
    pub fn can_transition_to(self, next: PaymentStatus) -> bool {
        matches!(
            (self, next),
            (PaymentStatus::Pending, PaymentStatus::Completed)
                | (PaymentStatus::Pending, PaymentStatus::Refunded)
                | (PaymentStatus::Completed, PaymentStatus::Refunded)
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "registration_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RegistrationStatus {
    Confirmed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Registration {
    pub id: Uuid,
    pub event_id: Uuid,
    pub attendee_id: Uuid,
    pub ticket_type_id: Uuid,
    pub quantity: i32,
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub status: RegistrationStatus,
    pub qr_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Registration {
    pub fn is_confirmed(&self) -> bool {
        self.status == RegistrationStatus::Confirmed
    }
}

/// Row about to be inserted; ids and timestamps are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewRegistration {
    pub event_id: Uuid,
    pub attendee_id: Uuid,
    pub ticket_type_id: Uuid,
    pub quantity: i32,
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    /// Bound in the same write as the row itself.
    pub qr_token: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationView {
    #[serde(flatten)]
    pub registration: Registration,
    pub attendance_state: AttendanceState,
    pub attendance: Option<AttendanceRecord>,
}

impl RegistrationView {
    pub fn new(registration: Registration, attendance: Option<AttendanceRecord>) -> Self {
        Self {
            attendance_state: AttendanceState::from_record(attendance.as_ref()),
            registration,
            attendance,
        }
    }
}

/// One line of the organizer's attendee list.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AttendeeEntry {
    pub registration_id: Uuid,
    pub attendee_id: Uuid,
    pub attendee_name: String,
    pub attendee_email: String,
    pub ticket_label: String,
    pub quantity: i32,
    pub total_amount: Decimal,
    pub payment_status: PaymentStatus,
    pub status: RegistrationStatus,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub checked_out_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
