use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::services::checkin::{self, ManualCheckInRequest, ScanRequest};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub async fn scan(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<ScanRequest>,
) -> Result<Response, AppError> {
    let result = checkin::check_in_by_token(state.store.as_ref(), event_id, body).await?;
    Ok(success(result, "Check-in successful"))
}

/// Body is optional; an empty POST records an anonymous manual check-in.
pub async fn manual(
    State(state): State<AppState>,
    Path(registration_id): Path<Uuid>,
    body: Option<Json<ManualCheckInRequest>>,
) -> Result<Response, AppError> {
    let request = body.map(|Json(b)| b).unwrap_or_default();
    let result = checkin::check_in_manually(state.store.as_ref(), registration_id, request).await?;
    Ok(success(result, "Check-in successful"))
}

pub async fn check_out(
    State(state): State<AppState>,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let result = checkin::check_out(state.store.as_ref(), registration_id).await?;
    Ok(success(result, "Check-out successful"))
}
