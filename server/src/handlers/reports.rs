use axum::extract::{Path, State};
use axum::response::Response;
use uuid::Uuid;

use crate::services::reports;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn attendee_stats(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let stats = reports::attendee_stats(state.store.as_ref(), event_id).await?;
    Ok(success(stats, "Attendee stats retrieved"))
}

pub async fn attendee_list(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let attendees = reports::attendee_list(state.store.as_ref(), event_id).await?;
    Ok(success(attendees, "Attendees retrieved"))
}
