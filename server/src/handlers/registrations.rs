use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use serde::Deserialize;
use uuid::Uuid;

use crate::models::PaymentStatus;
use crate::services::registration::{self, RegisterRequest};
use crate::services::qr;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

#[derive(Debug, Deserialize)]
pub struct PaymentUpdate {
    pub status: PaymentStatus,
}

pub async fn register(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Json(body): Json<RegisterRequest>,
) -> Result<Response, AppError> {
    let receipt = registration::register(state.store.as_ref(), event_id, body).await?;
    Ok(created(receipt, "Registration confirmed"))
}

pub async fn get_registration(
    State(state): State<AppState>,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let view = registration::get_registration(state.store.as_ref(), registration_id).await?;
    Ok(success(view, "Registration retrieved"))
}

pub async fn cancel_registration(
    State(state): State<AppState>,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let cancelled = registration::cancel(state.store.as_ref(), registration_id).await?;
    Ok(success(cancelled, "Registration cancelled"))
}

pub async fn update_payment(
    State(state): State<AppState>,
    Path(registration_id): Path<Uuid>,
    Json(body): Json<PaymentUpdate>,
) -> Result<Response, AppError> {
    let updated =
        registration::update_payment_status(state.store.as_ref(), registration_id, body.status)
            .await?;
    Ok(success(updated, "Payment status updated"))
}

pub async fn issue_qr(
    State(state): State<AppState>,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let issued = qr::issue_token(state.store.as_ref(), registration_id).await?;
    Ok(created(issued, "QR token issued"))
}

pub async fn get_qr(
    State(state): State<AppState>,
    Path(registration_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let payload = qr::qr_payload(state.store.as_ref(), registration_id).await?;
    Ok(success(payload, "QR payload retrieved"))
}
