use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::models::{
    AttendanceCounts, AttendanceInsert, AttendanceRecord, Attendee, AttendeeEntry, AttendeeInfo,
    Event, EventStatus, NewAttendance, NewEvent, NewOrganizer, NewRegistration, NewTicketType,
    Organizer, PaymentStatus, Registration, RegistrationStatus, TicketType,
};
use crate::utils::error::AppError;

#[derive(Default)]
struct Tables {
    organizers: HashMap<Uuid, Organizer>,
    events: Vec<Event>,
    ticket_types: Vec<TicketType>,
    attendees: HashMap<String, Attendee>,
    registrations: Vec<Registration>,
    tokens: HashMap<String, Uuid>,
    attendance: HashMap<Uuid, AttendanceRecord>,
}

impl Tables {
    fn registration_mut(&mut self, id: Uuid) -> Option<&mut Registration> {
        self.registrations.iter_mut().find(|r| r.id == id)
    }

    fn confirmed_tickets(&self, event_id: Uuid) -> i64 {
        self.registrations
            .iter()
            .filter(|r| r.event_id == event_id && r.is_confirmed())
            .map(|r| i64::from(r.quantity))
            .sum()
    }
}

/// Process-local store. One lock guards all tables, which gives every trait
/// method the same all-or-nothing behavior as a database transaction.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn create_organizer(&self, organizer: NewOrganizer) -> StoreResult<Organizer> {
        let organizer = Organizer {
            id: Uuid::new_v4(),
            name: organizer.name,
            contact_email: organizer.contact_email,
            created_at: Utc::now(),
        };
        let mut tables = self.tables.lock().await;
        tables.organizers.insert(organizer.id, organizer.clone());
        Ok(organizer)
    }

    async fn get_organizer(&self, id: Uuid) -> StoreResult<Option<Organizer>> {
        Ok(self.tables.lock().await.organizers.get(&id).cloned())
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<Event> {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            organizer_id: event.organizer_id,
            name: event.name,
            description: event.description,
            venue: event.venue,
            start_time: event.start_time,
            end_time: event.end_time,
            max_attendees: event.max_attendees,
            status: event.status.unwrap_or(EventStatus::Draft),
            created_at: now,
            updated_at: now,
        };
        self.tables.lock().await.events.push(event.clone());
        Ok(event)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let tables = self.tables.lock().await;
        Ok(tables.events.iter().find(|e| e.id == id).cloned())
    }

    async fn list_events(&self, organizer_id: Option<Uuid>) -> StoreResult<Vec<Event>> {
        let tables = self.tables.lock().await;
        let mut events: Vec<Event> = tables
            .events
            .iter()
            .filter(|e| organizer_id.map_or(true, |id| e.organizer_id == id))
            .cloned()
            .collect();
        events.sort_by_key(|e| e.start_time);
        Ok(events)
    }

    async fn update_event_status(&self, id: Uuid, status: EventStatus) -> StoreResult<Option<Event>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.events.iter_mut().find(|e| e.id == id).map(|event| {
            event.status = status;
            event.updated_at = Utc::now();
            event.clone()
        }))
    }

    async fn create_ticket_type(
        &self,
        event_id: Uuid,
        ticket_type: NewTicketType,
    ) -> StoreResult<TicketType> {
        let ticket_type = TicketType {
            id: Uuid::new_v4(),
            event_id,
            label: ticket_type.label,
            price: ticket_type.price,
            created_at: Utc::now(),
        };
        self.tables.lock().await.ticket_types.push(ticket_type.clone());
        Ok(ticket_type)
    }

    async fn get_ticket_type(&self, id: Uuid) -> StoreResult<Option<TicketType>> {
        let tables = self.tables.lock().await;
        Ok(tables.ticket_types.iter().find(|t| t.id == id).cloned())
    }

    async fn list_ticket_types(&self, event_id: Uuid) -> StoreResult<Vec<TicketType>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .ticket_types
            .iter()
            .filter(|t| t.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn upsert_attendee(&self, info: AttendeeInfo) -> StoreResult<Attendee> {
        let email = info.normalized_email();
        let mut tables = self.tables.lock().await;
        let attendee = tables
            .attendees
            .entry(email.clone())
            .and_modify(|a| {
                a.name = info.name.clone();
                a.phone = info.phone.clone();
            })
            .or_insert_with(|| Attendee {
                id: Uuid::new_v4(),
                name: info.name.clone(),
                email,
                phone: info.phone.clone(),
                created_at: Utc::now(),
            });
        Ok(attendee.clone())
    }

    async fn insert_registration_within_capacity(
        &self,
        registration: NewRegistration,
    ) -> StoreResult<Option<Registration>> {
        let mut tables = self.tables.lock().await;
        let capacity = tables
            .events
            .iter()
            .find(|e| e.id == registration.event_id)
            .map(|e| i64::from(e.max_attendees))
            .ok_or_else(|| AppError::NotFound(format!("Event '{}'", registration.event_id)))?;

        if let Some(token) = &registration.qr_token {
            if tables.tokens.contains_key(token) {
                return Err(AppError::Conflict("QR token is already in use".to_string()));
            }
        }
        if tables.confirmed_tickets(registration.event_id) + i64::from(registration.quantity)
            > capacity
        {
            return Ok(None);
        }

        let now = Utc::now();
        let row = Registration {
            id: Uuid::new_v4(),
            event_id: registration.event_id,
            attendee_id: registration.attendee_id,
            ticket_type_id: registration.ticket_type_id,
            quantity: registration.quantity,
            total_amount: registration.total_amount,
            payment_status: registration.payment_status,
            status: RegistrationStatus::Confirmed,
            qr_token: registration.qr_token,
            created_at: now,
            updated_at: now,
        };
        if let Some(token) = &row.qr_token {
            tables.tokens.insert(token.clone(), row.id);
        }
        tables.registrations.push(row.clone());
        Ok(Some(row))
    }

    async fn confirmed_ticket_count(&self, event_id: Uuid) -> StoreResult<i64> {
        Ok(self.tables.lock().await.confirmed_tickets(event_id))
    }

    async fn get_registration(&self, id: Uuid) -> StoreResult<Option<Registration>> {
        let tables = self.tables.lock().await;
        Ok(tables.registrations.iter().find(|r| r.id == id).cloned())
    }

    async fn find_registration_by_token(&self, token: &str) -> StoreResult<Option<Registration>> {
        let tables = self.tables.lock().await;
        Ok(tables
            .tokens
            .get(token)
            .and_then(|id| tables.registrations.iter().find(|r| r.id == *id))
            .cloned())
    }

    async fn set_qr_token_if_absent(&self, registration_id: Uuid, token: &str) -> StoreResult<bool> {
        let mut tables = self.tables.lock().await;
        if tables.tokens.contains_key(token) {
            return Err(AppError::Conflict("QR token is already in use".to_string()));
        }
        let Some(registration) = tables.registration_mut(registration_id) else {
            return Ok(false);
        };
        if registration.qr_token.is_some() {
            return Ok(false);
        }
        registration.qr_token = Some(token.to_string());
        registration.updated_at = Utc::now();
        tables.tokens.insert(token.to_string(), registration_id);
        Ok(true)
    }

    async fn cancel_registration(&self, id: Uuid) -> StoreResult<Option<Registration>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .registration_mut(id)
            .filter(|r| r.is_confirmed())
            .map(|r| {
                r.status = RegistrationStatus::Cancelled;
                r.updated_at = Utc::now();
                r.clone()
            }))
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> StoreResult<Option<Registration>> {
        let mut tables = self.tables.lock().await;
        Ok(tables.registration_mut(id).map(|r| {
            r.payment_status = status;
            r.updated_at = Utc::now();
            r.clone()
        }))
    }

    async fn insert_attendance_if_absent(
        &self,
        attendance: NewAttendance,
    ) -> StoreResult<AttendanceInsert> {
        let mut tables = self.tables.lock().await;
        let confirmed = tables
            .registrations
            .iter()
            .any(|r| r.id == attendance.registration_id && r.is_confirmed());
        if !confirmed {
            return Ok(AttendanceInsert::NotConfirmed);
        }
        if tables.attendance.contains_key(&attendance.registration_id) {
            return Ok(AttendanceInsert::AlreadyRecorded);
        }
        let record = AttendanceRecord {
            id: Uuid::new_v4(),
            registration_id: attendance.registration_id,
            checked_in_at: attendance.checked_in_at,
            checked_out_at: None,
            method: attendance.method,
            recorded_by: attendance.recorded_by,
        };
        tables
            .attendance
            .insert(record.registration_id, record.clone());
        Ok(AttendanceInsert::Created(record))
    }

    async fn get_attendance(&self, registration_id: Uuid) -> StoreResult<Option<AttendanceRecord>> {
        Ok(self
            .tables
            .lock()
            .await
            .attendance
            .get(&registration_id)
            .cloned())
    }

    async fn check_out(
        &self,
        registration_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let mut tables = self.tables.lock().await;
        Ok(tables
            .attendance
            .get_mut(&registration_id)
            .filter(|r| r.checked_out_at.is_none())
            .map(|r| {
                r.checked_out_at = Some(at);
                r.clone()
            }))
    }

    async fn attendance_counts(&self, event_id: Uuid) -> StoreResult<AttendanceCounts> {
        let tables = self.tables.lock().await;
        let mut counts = AttendanceCounts::default();
        for registration in tables.registrations.iter().filter(|r| r.event_id == event_id) {
            counts.total_registrations += 1;
            match registration.status {
                RegistrationStatus::Confirmed => {
                    counts.confirmed_registrations += 1;
                    counts.tickets_sold += i64::from(registration.quantity);
                    if registration.payment_status == PaymentStatus::Completed {
                        counts.revenue += registration.total_amount;
                    }
                }
                RegistrationStatus::Cancelled => counts.cancelled_registrations += 1,
            }
            if !registration.is_confirmed() {
                continue;
            }
            if let Some(record) = tables.attendance.get(&registration.id) {
                counts.checked_in += 1;
                if record.checked_out_at.is_some() {
                    counts.checked_out += 1;
                }
            }
        }
        Ok(counts)
    }

    async fn list_attendees(&self, event_id: Uuid) -> StoreResult<Vec<AttendeeEntry>> {
        let tables = self.tables.lock().await;
        let entries = tables
            .registrations
            .iter()
            .rev()
            .filter(|r| r.event_id == event_id)
            .filter_map(|r| {
                let attendee = tables.attendees.values().find(|a| a.id == r.attendee_id)?;
                let ticket = tables.ticket_types.iter().find(|t| t.id == r.ticket_type_id)?;
                let attendance = tables.attendance.get(&r.id);
                Some(AttendeeEntry {
                    registration_id: r.id,
                    attendee_id: attendee.id,
                    attendee_name: attendee.name.clone(),
                    attendee_email: attendee.email.clone(),
                    ticket_label: ticket.label.clone(),
                    quantity: r.quantity,
                    total_amount: r.total_amount,
                    payment_status: r.payment_status,
                    status: r.status,
                    checked_in_at: attendance.map(|a| a.checked_in_at),
                    checked_out_at: attendance.and_then(|a| a.checked_out_at),
                    created_at: r.created_at,
                })
            })
            .collect();
        Ok(entries)
    }
}
