//! Persistence boundary for the check-in workflow.
//!
//! Every method that guards an invariant (capacity, single token issuance,
//! one attendance record per registration) is a single atomic operation on
//! the store, so callers never do read-then-write across two calls.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::models::{
    AttendanceCounts, AttendanceInsert, AttendanceRecord, Attendee, AttendeeEntry, AttendeeInfo,
    Event, EventStatus, NewAttendance, NewEvent, NewOrganizer, NewRegistration, NewTicketType,
    Organizer, PaymentStatus, Registration, TicketType,
};
use crate::utils::error::AppError;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

pub type StoreResult<T> = Result<T, AppError>;

#[async_trait]
pub trait Store: Send + Sync {
    async fn ping(&self) -> StoreResult<()>;

    async fn create_organizer(&self, organizer: NewOrganizer) -> StoreResult<Organizer>;

    async fn get_organizer(&self, id: Uuid) -> StoreResult<Option<Organizer>>;

    async fn create_event(&self, event: NewEvent) -> StoreResult<Event>;

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>>;

    async fn list_events(&self, organizer_id: Option<Uuid>) -> StoreResult<Vec<Event>>;

    async fn update_event_status(&self, id: Uuid, status: EventStatus) -> StoreResult<Option<Event>>;

    async fn create_ticket_type(
        &self,
        event_id: Uuid,
        ticket_type: NewTicketType,
    ) -> StoreResult<TicketType>;

    async fn get_ticket_type(&self, id: Uuid) -> StoreResult<Option<TicketType>>;

    async fn list_ticket_types(&self, event_id: Uuid) -> StoreResult<Vec<TicketType>>;

    /// Inserts the attendee, or refreshes name/phone of the one with the same email.
    async fn upsert_attendee(&self, info: AttendeeInfo) -> StoreResult<Attendee>;

    /// Inserts the registration only if the event's confirmed ticket count plus
    /// `quantity` stays within `max_attendees`. `Ok(None)` means it did not fit.
    /// A `qr_token` already bound elsewhere is a `Conflict` and nothing is stored.
    async fn insert_registration_within_capacity(
        &self,
        registration: NewRegistration,
    ) -> StoreResult<Option<Registration>>;

    /// Confirmed tickets currently held for the event.
    async fn confirmed_ticket_count(&self, event_id: Uuid) -> StoreResult<i64>;

    async fn get_registration(&self, id: Uuid) -> StoreResult<Option<Registration>>;

    async fn find_registration_by_token(&self, token: &str) -> StoreResult<Option<Registration>>;

    /// Writes the token only while the row has none. `Ok(false)` when a token
    /// was already present; a token owned by another row is a `Conflict`.
    async fn set_qr_token_if_absent(&self, registration_id: Uuid, token: &str) -> StoreResult<bool>;

    /// Flips `confirmed` to `cancelled`. `Ok(None)` if the row is missing or
    /// already cancelled.
    async fn cancel_registration(&self, id: Uuid) -> StoreResult<Option<Registration>>;

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> StoreResult<Option<Registration>>;

    /// Creates the attendance record if the registration is confirmed and has none yet.
    async fn insert_attendance_if_absent(&self, attendance: NewAttendance)
        -> StoreResult<AttendanceInsert>;

    async fn get_attendance(&self, registration_id: Uuid) -> StoreResult<Option<AttendanceRecord>>;

    /// Sets the check-out time on an open record. `Ok(None)` if there is no
    /// open record for the registration.
    async fn check_out(
        &self,
        registration_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<AttendanceRecord>>;

    async fn attendance_counts(&self, event_id: Uuid) -> StoreResult<AttendanceCounts>;

    async fn list_attendees(&self, event_id: Uuid) -> StoreResult<Vec<AttendeeEntry>>;
}
