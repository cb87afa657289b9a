use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::{EventStatus, NewEvent, NewOrganizer, NewTicketType};
use crate::services::events;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct EventFilter {
    pub organizer_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: EventStatus,
}

pub async fn create_organizer(
    State(state): State<AppState>,
    Json(body): Json<NewOrganizer>,
) -> Result<Response, AppError> {
    let organizer = events::create_organizer(state.store.as_ref(), body).await?;
    Ok(created(organizer, "Organizer created"))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(body): Json<NewEvent>,
) -> Result<Response, AppError> {
    let event = events::create_event(state.store.as_ref(), body).await?;
    Ok(created(event, "Event created"))
}

pub async fn list_events(
    State(state): State<AppState>,
    Query(filter): Query<EventFilter>,
) -> Result<Response, AppError> {
    let events = state.store.list_events(filter.organizer_id).await?;
    Ok(success(events, "Events retrieved"))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = events::get_event(state.store.as_ref(), event_id).await?;
    Ok(success(event, "Event retrieved"))
}

pub async fn update_event_status(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<StatusUpdate>,
) -> Result<Response, AppError> {
    let event = events::set_event_status(state.store.as_ref(), event_id, body.status).await?;
    Ok(success(event, "Event status updated"))
}

pub async fn create_ticket_type(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<NewTicketType>,
) -> Result<Response, AppError> {
    let ticket_type = events::create_ticket_type(state.store.as_ref(), event_id, body).await?;
    Ok(created(ticket_type, "Ticket type created"))
}

pub async fn list_ticket_types(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let ticket_types = events::list_ticket_types(state.store.as_ref(), event_id).await?;
    Ok(success(ticket_types, "Ticket types retrieved"))
}
