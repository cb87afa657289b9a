use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use super::qr::{self, IssuedToken};
use crate::models::{
    AttendeeInfo, EventStatus, NewRegistration, PaymentStatus, Registration, RegistrationView,
};
use crate::store::Store;
use crate::utils::error::AppError;

#[derive(Debug, Clone, Deserialize)]
pub struct RegisterRequest {
    pub attendee: AttendeeInfo,
    pub ticket_type_id: Uuid,
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegistrationReceipt {
    pub registration: Registration,
    pub ticket: IssuedToken,
}

fn validate(request: &RegisterRequest) -> Result<(), AppError> {
    if request.quantity < 1 {
        return Err(AppError::ValidationError(
            "Quantity must be at least 1".to_string(),
        ));
    }
    if request.attendee.name.trim().is_empty() {
        return Err(AppError::ValidationError(
            "Attendee name is required".to_string(),
        ));
    }
    let email = request.attendee.normalized_email();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::ValidationError(
            "Attendee email is invalid".to_string(),
        ));
    }
    Ok(())
}

/// Registers an attendee for a published event and issues a fresh QR token.
pub async fn register(
    store: &dyn Store,
    event_id: Uuid,
    request: RegisterRequest,
) -> Result<RegistrationReceipt, AppError> {
    register_with_token(store, event_id, request, qr::generate_token()).await
}

/// Same as [`register`], binding the caller's token instead of a generated one.
/// The token is stored with the registration row, so a token already in use
/// fails the whole registration with `Conflict` and takes no capacity.
pub async fn register_with_token(
    store: &dyn Store,
    event_id: Uuid,
    request: RegisterRequest,
    token: String,
) -> Result<RegistrationReceipt, AppError> {
    validate(&request)?;
    qr::validate_token(&token)?;

    let event = store
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{event_id}'")))?;
    if event.status != EventStatus::Published {
        return Err(AppError::InvalidRegistration(format!(
            "Event '{event_id}' is not open for registration"
        )));
    }

    let ticket_type = store
        .get_ticket_type(request.ticket_type_id)
        .await?
        .filter(|t| t.event_id == event_id)
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Ticket type '{}' for event '{event_id}'",
                request.ticket_type_id
            ))
        })?;

    let total_amount = ticket_type.total_for(request.quantity).ok_or_else(|| {
        AppError::ValidationError(format!(
            "Order total for {} tickets exceeds the supported amount",
            request.quantity
        ))
    })?;
    let payment_status = if total_amount == Decimal::ZERO {
        PaymentStatus::Completed
    } else {
        PaymentStatus::Pending
    };

    let attendee = store.upsert_attendee(request.attendee).await?;

    let new_registration = NewRegistration {
        event_id,
        attendee_id: attendee.id,
        ticket_type_id: ticket_type.id,
        quantity: request.quantity,
        total_amount,
        payment_status,
        qr_token: Some(token.clone()),
    };

    let Some(registration) = store
        .insert_registration_within_capacity(new_registration)
        .await?
    else {
        let taken = store.confirmed_ticket_count(event_id).await?;
        return Err(AppError::CapacityExceeded {
            event_id,
            requested: request.quantity,
            remaining: (i64::from(event.max_attendees) - taken).max(0),
        });
    };

    info!(
        registration_id = %registration.id,
        event_id = %event_id,
        quantity = registration.quantity,
        "Registration confirmed, QR token issued"
    );

    let ticket = IssuedToken::new(registration.id, token);

    Ok(RegistrationReceipt {
        registration,
        ticket,
    })
}

pub async fn get_registration(store: &dyn Store, id: Uuid) -> Result<RegistrationView, AppError> {
    let registration = store
        .get_registration(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Registration '{id}'")))?;
    let attendance = store.get_attendance(id).await?;
    Ok(RegistrationView::new(registration, attendance))
}

/// Retires a registration. Its token stays on the row and is refused at the door.
pub async fn cancel(store: &dyn Store, id: Uuid) -> Result<Registration, AppError> {
    match store.cancel_registration(id).await? {
        Some(registration) => {
            info!(registration_id = %id, "Registration cancelled");
            Ok(registration)
        }
        None => match store.get_registration(id).await? {
            Some(_) => Err(AppError::Conflict(format!(
                "Registration '{id}' is already cancelled"
            ))),
            None => Err(AppError::NotFound(format!("Registration '{id}'"))),
        },
    }
}

pub async fn update_payment_status(
    store: &dyn Store,
    id: Uuid,
    status: PaymentStatus,
) -> Result<Registration, AppError> {
    let current = store
        .get_registration(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Registration '{id}'")))?;

    if !current.payment_status.can_transition_to(status) {
        return Err(AppError::Conflict(format!(
            "Payment for registration '{id}' cannot move from {:?} to {:?}",
            current.payment_status, status
        )));
    }

    let updated = store
        .update_payment_status(id, status)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Registration '{id}'")))?;
    info!(registration_id = %id, payment_status = ?status, "Payment status updated");
    Ok(updated)
}
