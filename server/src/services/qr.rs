//! QR ticket issuance.
//!
//! A token is random, bound to exactly one registration, and written onto the
//! registration row before anything is handed back for rendering.

use base64::Engine;
use rand::RngCore;
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::store::Store;
use crate::utils::error::AppError;

const TOKEN_BYTES: usize = 24;
const MIN_TOKEN_LEN: usize = 4;
const MAX_TOKEN_LEN: usize = 128;

#[derive(Debug, Clone, Serialize)]
pub struct IssuedToken {
    pub registration_id: Uuid,
    pub token: String,
    /// String handed to the QR renderer.
    pub payload: String,
}

impl IssuedToken {
    pub(crate) fn new(registration_id: Uuid, token: String) -> Self {
        Self {
            registration_id,
            payload: token.clone(),
            token,
        }
    }
}

/// 192 random bits, base64url without padding (32 characters).
pub fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

/// Accepts the characters a generated token can contain, so every valid token
/// survives a QR round trip unchanged.
pub fn validate_token(token: &str) -> Result<(), AppError> {
    let len = token.len();
    if !(MIN_TOKEN_LEN..=MAX_TOKEN_LEN).contains(&len) {
        return Err(AppError::ValidationError(format!(
            "QR token must be between {MIN_TOKEN_LEN} and {MAX_TOKEN_LEN} characters"
        )));
    }
    if !token
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(AppError::ValidationError(
            "QR token may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }
    Ok(())
}

pub async fn issue_token(store: &dyn Store, registration_id: Uuid) -> Result<IssuedToken, AppError> {
    assign_token(store, registration_id, generate_token()).await
}

/// Binds `token` to the registration. Single use: a registration that already
/// holds a token is a `Conflict`, as is a token already bound elsewhere.
pub async fn assign_token(
    store: &dyn Store,
    registration_id: Uuid,
    token: String,
) -> Result<IssuedToken, AppError> {
    validate_token(&token)?;

    let registration = store
        .get_registration(registration_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Registration '{registration_id}'")))?;

    if registration.qr_token.is_some() {
        return Err(AppError::Conflict(format!(
            "Registration '{registration_id}' already has a QR token"
        )));
    }
    if !registration.is_confirmed() {
        return Err(AppError::InvalidRegistration(format!(
            "Registration '{registration_id}' is cancelled"
        )));
    }

    if !store.set_qr_token_if_absent(registration_id, &token).await? {
        // Lost the race against another issuer between the read and the write.
        return Err(AppError::Conflict(format!(
            "Registration '{registration_id}' already has a QR token"
        )));
    }

    info!(registration_id = %registration_id, "QR token issued");
    Ok(IssuedToken::new(registration_id, token))
}

/// The stored token of a registration, ready for rendering.
pub async fn qr_payload(store: &dyn Store, registration_id: Uuid) -> Result<IssuedToken, AppError> {
    let registration = store
        .get_registration(registration_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Registration '{registration_id}'")))?;

    match registration.qr_token {
        Some(token) => Ok(IssuedToken::new(registration_id, token)),
        None => Err(AppError::NotFound(format!(
            "Registration '{registration_id}' has no QR token yet"
        ))),
    }
}
