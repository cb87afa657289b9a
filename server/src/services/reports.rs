use uuid::Uuid;

use super::events::get_event;
use crate::models::{AttendeeEntry, AttendeeStats};
use crate::store::Store;
use crate::utils::error::AppError;

pub async fn attendee_stats(store: &dyn Store, event_id: Uuid) -> Result<AttendeeStats, AppError> {
    let event = get_event(store, event_id).await?;
    let counts = store.attendance_counts(event_id).await?;
    Ok(AttendeeStats::new(event.id, event.max_attendees, counts))
}

pub async fn attendee_list(
    store: &dyn Store,
    event_id: Uuid,
) -> Result<Vec<AttendeeEntry>, AppError> {
    get_event(store, event_id).await?;
    store.list_attendees(event_id).await
}
