#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use uuid::Uuid;

use eventdesk_server::models::{
    AttendeeInfo, Event, EventStatus, NewEvent, NewOrganizer, NewTicketType, TicketType,
};
use eventdesk_server::services::events;
use eventdesk_server::services::registration::RegisterRequest;
use eventdesk_server::store::{MemoryStore, Store};

pub struct Fixture {
    pub store: Arc<dyn Store>,
    pub organizer_id: Uuid,
    pub event: Event,
    pub ticket: TicketType,
}

pub async fn published_event(capacity: i32, price: &str) -> Fixture {
    let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
    let organizer = events::create_organizer(
        store.as_ref(),
        NewOrganizer {
            name: "Lagos Tech Meetup".to_string(),
            contact_email: "hello@meetup.ng".to_string(),
        },
    )
    .await
    .expect("organizer");

    let event = events::create_event(
        store.as_ref(),
        NewEvent {
            organizer_id: organizer.id,
            name: "DevFest".to_string(),
            description: None,
            venue: "Landmark Centre".to_string(),
            start_time: Utc::now() + Duration::days(7),
            end_time: None,
            max_attendees: capacity,
            status: Some(EventStatus::Published),
        },
    )
    .await
    .expect("event");

    let ticket = events::create_ticket_type(
        store.as_ref(),
        event.id,
        NewTicketType {
            label: "General".to_string(),
            price: Decimal::from_str(price).expect("price"),
        },
    )
    .await
    .expect("ticket type");

    Fixture {
        store,
        organizer_id: organizer.id,
        event,
        ticket,
    }
}

pub fn request(ticket: &TicketType, n: usize, quantity: i32) -> RegisterRequest {
    RegisterRequest {
        attendee: AttendeeInfo {
            name: format!("Attendee {n}"),
            email: format!("attendee{n}@example.com"),
            phone: None,
        },
        ticket_type_id: ticket.id,
        quantity,
    }
}
