use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer, Config};
use crate::handlers::{checkin, events, health_check, registrations, reports};
use crate::state::AppState;

/// Routes only, no middleware. Tests drive this directly.
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/organizers", post(events::create_organizer))
        .route("/events", get(events::list_events).post(events::create_event))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id/status", patch(events::update_event_status))
        .route(
            "/events/:id/ticket-types",
            get(events::list_ticket_types).post(events::create_ticket_type),
        )
        .route("/events/:id/register", post(registrations::register))
        .route("/events/:id/checkin", post(checkin::scan))
        .route("/events/:id/attendees", get(reports::attendee_list))
        .route("/events/:id/attendee-stats", get(reports::attendee_stats))
        .route("/registrations/:id", get(registrations::get_registration))
        .route(
            "/registrations/:id/qr",
            get(registrations::get_qr).post(registrations::issue_qr),
        )
        .route(
            "/registrations/:id/cancel",
            post(registrations::cancel_registration),
        )
        .route(
            "/registrations/:id/payment",
            patch(registrations::update_payment),
        )
        .route("/registrations/:id/checkin", post(checkin::manual))
        .route("/registrations/:id/checkout", post(checkin::check_out))
        .with_state(state)
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    apply_security_headers(api_routes(state), config.production)
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
}
