use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Raw counters for one event, as aggregated by the store.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, FromRow)]
pub struct AttendanceCounts {
    pub total_registrations: i64,
    pub confirmed_registrations: i64,
    pub cancelled_registrations: i64,
    pub tickets_sold: i64,
    pub checked_in: i64,
    pub checked_out: i64,
    pub revenue: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttendeeStats {
    pub event_id: Uuid,
    pub max_attendees: i32,
    pub remaining_capacity: i64,
    pub currently_present: i64,
    #[serde(flatten)]
    pub counts: AttendanceCounts,
}

impl AttendeeStats {
    pub fn new(event_id: Uuid, max_attendees: i32, counts: AttendanceCounts) -> Self {
        Self {
            event_id,
            max_attendees,
            remaining_capacity: (i64::from(max_attendees) - counts.tickets_sold).max(0),
            currently_present: counts.checked_in - counts.checked_out,
            counts,
        }
    }
}
