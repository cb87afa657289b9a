use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::models::{
    Event, EventStatus, NewEvent, NewOrganizer, NewTicketType, Organizer, TicketType,
    AMOUNT_SCALE, MAX_AMOUNT,
};
use crate::store::Store;
use crate::utils::error::AppError;

pub async fn create_organizer(
    store: &dyn Store,
    organizer: NewOrganizer,
) -> Result<Organizer, AppError> {
    if organizer.name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Organizer name is required".to_string(),
        ));
    }
    if !organizer.contact_email.contains('@') {
        return Err(AppError::ValidationError(
            "Organizer contact email is invalid".to_string(),
        ));
    }
    store.create_organizer(organizer).await
}

pub async fn create_event(store: &dyn Store, event: NewEvent) -> Result<Event, AppError> {
    if event.name.trim().is_empty() {
        return Err(AppError::ValidationError("Event name is required".to_string()));
    }
    if event.venue.trim().is_empty() {
        return Err(AppError::ValidationError("Event venue is required".to_string()));
    }
    if event.max_attendees < 1 {
        return Err(AppError::ValidationError(
            "max_attendees must be at least 1".to_string(),
        ));
    }
    if event.end_time.is_some_and(|end| end < event.start_time) {
        return Err(AppError::ValidationError(
            "Event cannot end before it starts".to_string(),
        ));
    }
    if store.get_organizer(event.organizer_id).await?.is_none() {
        return Err(AppError::NotFound(format!(
            "Organizer '{}'",
            event.organizer_id
        )));
    }

    let event = store.create_event(event).await?;
    info!(event_id = %event.id, organizer_id = %event.organizer_id, "Event created");
    Ok(event)
}

pub async fn get_event(store: &dyn Store, id: Uuid) -> Result<Event, AppError> {
    store
        .get_event(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{id}'")))
}

pub async fn set_event_status(
    store: &dyn Store,
    id: Uuid,
    status: EventStatus,
) -> Result<Event, AppError> {
    let event = get_event(store, id).await?;
    if !event.status.can_transition_to(status) {
        return Err(AppError::Conflict(format!(
            "Event '{id}' cannot move from {:?} to {:?}",
            event.status, status
        )));
    }
    let event = store
        .update_event_status(id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{id}'")))?;
    info!(event_id = %id, status = ?status, "Event status changed");
    Ok(event)
}

pub async fn create_ticket_type(
    store: &dyn Store,
    event_id: Uuid,
    ticket_type: NewTicketType,
) -> Result<TicketType, AppError> {
    if ticket_type.label.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Ticket type label is required".to_string(),
        ));
    }
    if ticket_type.price < Decimal::ZERO {
        return Err(AppError::ValidationError(
            "Ticket price cannot be negative".to_string(),
        ));
    }
    if ticket_type.price > MAX_AMOUNT {
        return Err(AppError::ValidationError(format!(
            "Ticket price cannot exceed {MAX_AMOUNT}"
        )));
    }
    if ticket_type.price.normalize().scale() > AMOUNT_SCALE {
        return Err(AppError::ValidationError(format!(
            "Ticket price has more than {AMOUNT_SCALE} decimal places"
        )));
    }
    get_event(store, event_id).await?;
    store.create_ticket_type(event_id, ticket_type).await
}

pub async fn list_ticket_types(
    store: &dyn Store,
    event_id: Uuid,
) -> Result<Vec<TicketType>, AppError> {
    get_event(store, event_id).await?;
    store.list_ticket_types(event_id).await
}
