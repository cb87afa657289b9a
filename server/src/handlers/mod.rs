use axum::extract::State;
use axum::response::Response;
use serde::Serialize;

use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

pub mod checkin;
pub mod events;
pub mod registrations;
pub mod reports;

#[derive(Serialize)]
struct HealthPayload {
    status: &'static str,
    service: &'static str,
}

pub async fn health_check(State(state): State<AppState>) -> Result<Response, AppError> {
    state.store.ping().await?;

    let payload = HealthPayload {
        status: "ok",
        service: "eventdesk-api",
    };

    Ok(success(payload, "Health check successful"))
}
