use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use std::time::Duration;
use tracing::info;
use uuid::Uuid;

use super::{Store, StoreResult};
use crate::models::{
    AttendanceCounts, AttendanceInsert, AttendanceRecord, Attendee, AttendeeEntry, AttendeeInfo,
    Event, EventStatus, NewAttendance, NewEvent, NewOrganizer, NewRegistration, NewTicketType,
    Organizer, PaymentStatus, Registration, RegistrationStatus, TicketType,
};
use crate::utils::error::AppError;

const REGISTRATION_COLUMNS: &str = "id, event_id, attendee_id, ticket_type_id, quantity, \
     total_amount, payment_status, status, qr_token, created_at, updated_at";

const EVENT_COLUMNS: &str = "id, organizer_id, name, description, venue, start_time, end_time, \
     max_attendees, status, created_at, updated_at";

const ATTENDANCE_COLUMNS: &str =
    "id, registration_id, checked_in_at, checked_out_at, method, recorded_by";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, sqlx::Error> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(database_url)
            .await?;

        info!("Successfully connected to database");
        Ok(Self::new(pool))
    }

    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await?;
        info!("Migrations run successfully");
        Ok(())
    }
}

fn unique_violation_as_conflict(err: sqlx::Error, message: &str) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::Conflict(message.to_string())
        }
        _ => AppError::Unavailable(err),
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn create_organizer(&self, organizer: NewOrganizer) -> StoreResult<Organizer> {
        let row = sqlx::query_as::<_, Organizer>(
            r#"
            INSERT INTO organizers (id, name, contact_email)
            VALUES ($1, $2, $3)
            RETURNING id, name, contact_email, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(organizer.name)
        .bind(organizer.contact_email)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_organizer(&self, id: Uuid) -> StoreResult<Option<Organizer>> {
        let row = sqlx::query_as::<_, Organizer>(
            "SELECT id, name, contact_email, created_at FROM organizers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn create_event(&self, event: NewEvent) -> StoreResult<Event> {
        let sql = format!(
            "INSERT INTO events (id, organizer_id, name, description, venue, start_time, \
             end_time, max_attendees, status) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {EVENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Event>(&sql)
            .bind(Uuid::new_v4())
            .bind(event.organizer_id)
            .bind(event.name)
            .bind(event.description)
            .bind(event.venue)
            .bind(event.start_time)
            .bind(event.end_time)
            .bind(event.max_attendees)
            .bind(event.status.unwrap_or(EventStatus::Draft))
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_event(&self, id: Uuid) -> StoreResult<Option<Event>> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let row = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn list_events(&self, organizer_id: Option<Uuid>) -> StoreResult<Vec<Event>> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE ($1::uuid IS NULL OR organizer_id = $1) ORDER BY start_time"
        );
        let rows = sqlx::query_as::<_, Event>(&sql)
            .bind(organizer_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn update_event_status(&self, id: Uuid, status: EventStatus) -> StoreResult<Option<Event>> {
        let sql = format!(
            "UPDATE events SET status = $2, updated_at = NOW() WHERE id = $1 \
             RETURNING {EVENT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn create_ticket_type(
        &self,
        event_id: Uuid,
        ticket_type: NewTicketType,
    ) -> StoreResult<TicketType> {
        let row = sqlx::query_as::<_, TicketType>(
            r#"
            INSERT INTO ticket_types (id, event_id, label, price)
            VALUES ($1, $2, $3, $4)
            RETURNING id, event_id, label, price, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(event_id)
        .bind(ticket_type.label)
        .bind(ticket_type.price)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn get_ticket_type(&self, id: Uuid) -> StoreResult<Option<TicketType>> {
        let row = sqlx::query_as::<_, TicketType>(
            "SELECT id, event_id, label, price, created_at FROM ticket_types WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row)
    }

    async fn list_ticket_types(&self, event_id: Uuid) -> StoreResult<Vec<TicketType>> {
        let rows = sqlx::query_as::<_, TicketType>(
            r#"
            SELECT id, event_id, label, price, created_at
            FROM ticket_types
            WHERE event_id = $1
            ORDER BY price, label
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    async fn upsert_attendee(&self, info: AttendeeInfo) -> StoreResult<Attendee> {
        let email = info.normalized_email();
        let row = sqlx::query_as::<_, Attendee>(
            r#"
            INSERT INTO attendees (id, name, email, phone)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (email) DO UPDATE
                SET name = EXCLUDED.name, phone = EXCLUDED.phone
            RETURNING id, name, email, phone, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(info.name)
        .bind(email)
        .bind(info.phone)
        .fetch_one(&self.pool)
        .await?;
        Ok(row)
    }

    async fn insert_registration_within_capacity(
        &self,
        registration: NewRegistration,
    ) -> StoreResult<Option<Registration>> {
        let mut tx = self.pool.begin().await?;

        // Row lock on the event serializes concurrent registrations for it.
        let capacity: Option<i32> =
            sqlx::query_scalar("SELECT max_attendees FROM events WHERE id = $1 FOR UPDATE")
                .bind(registration.event_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(capacity) = capacity else {
            return Err(AppError::NotFound(format!(
                "Event '{}'",
                registration.event_id
            )));
        };

        let taken: i64 = sqlx::query_scalar(
            r#"
            SELECT COALESCE(SUM(quantity), 0)::BIGINT
            FROM registrations
            WHERE event_id = $1 AND status = 'confirmed'
            "#,
        )
        .bind(registration.event_id)
        .fetch_one(&mut *tx)
        .await?;

        if taken + i64::from(registration.quantity) > i64::from(capacity) {
            tx.rollback().await?;
            return Ok(None);
        }

        let sql = format!(
            "INSERT INTO registrations (id, event_id, attendee_id, ticket_type_id, quantity, \
             total_amount, payment_status, status, qr_token) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) RETURNING {REGISTRATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Registration>(&sql)
            .bind(Uuid::new_v4())
            .bind(registration.event_id)
            .bind(registration.attendee_id)
            .bind(registration.ticket_type_id)
            .bind(registration.quantity)
            .bind(registration.total_amount)
            .bind(registration.payment_status)
            .bind(RegistrationStatus::Confirmed)
            .bind(registration.qr_token)
            .fetch_one(&mut *tx)
            .await
            .map_err(|err| unique_violation_as_conflict(err, "QR token is already in use"))?;

        tx.commit().await?;
        Ok(Some(row))
    }

    async fn confirmed_ticket_count(&self, event_id: Uuid) -> StoreResult<i64> {
        let taken: i64 = sqlx::query_scalar(
            "SELECT COALESCE(SUM(quantity), 0)::BIGINT FROM registrations \
             WHERE event_id = $1 AND status = 'confirmed'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(taken)
    }

    async fn get_registration(&self, id: Uuid) -> StoreResult<Option<Registration>> {
        let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE id = $1");
        let row = sqlx::query_as::<_, Registration>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn find_registration_by_token(&self, token: &str) -> StoreResult<Option<Registration>> {
        let sql = format!("SELECT {REGISTRATION_COLUMNS} FROM registrations WHERE qr_token = $1");
        let row = sqlx::query_as::<_, Registration>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn set_qr_token_if_absent(&self, registration_id: Uuid, token: &str) -> StoreResult<bool> {
        let result = sqlx::query(
            r#"
            UPDATE registrations
            SET qr_token = $2, updated_at = NOW()
            WHERE id = $1 AND qr_token IS NULL
            "#,
        )
        .bind(registration_id)
        .bind(token)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_violation_as_conflict(e, "QR token is already in use"))?;

        Ok(result.rows_affected() == 1)
    }

    async fn cancel_registration(&self, id: Uuid) -> StoreResult<Option<Registration>> {
        let sql = format!(
            "UPDATE registrations SET status = 'cancelled', updated_at = NOW() \
             WHERE id = $1 AND status = 'confirmed' RETURNING {REGISTRATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Registration>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update_payment_status(
        &self,
        id: Uuid,
        status: PaymentStatus,
    ) -> StoreResult<Option<Registration>> {
        let sql = format!(
            "UPDATE registrations SET payment_status = $2, updated_at = NOW() \
             WHERE id = $1 RETURNING {REGISTRATION_COLUMNS}"
        );
        let row = sqlx::query_as::<_, Registration>(&sql)
            .bind(id)
            .bind(status)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn insert_attendance_if_absent(
        &self,
        attendance: NewAttendance,
    ) -> StoreResult<AttendanceInsert> {
        let mut tx = self.pool.begin().await?;

        // Locks the registration so a concurrent cancel cannot slip in between.
        let status: Option<RegistrationStatus> =
            sqlx::query_scalar("SELECT status FROM registrations WHERE id = $1 FOR UPDATE")
                .bind(attendance.registration_id)
                .fetch_optional(&mut *tx)
                .await?;
        if status != Some(RegistrationStatus::Confirmed) {
            tx.rollback().await?;
            return Ok(AttendanceInsert::NotConfirmed);
        }

        let sql = format!(
            "INSERT INTO attendance_records (id, registration_id, checked_in_at, method, recorded_by) \
             VALUES ($1, $2, $3, $4, $5) \
             ON CONFLICT (registration_id) DO NOTHING \
             RETURNING {ATTENDANCE_COLUMNS}"
        );
        let record = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(Uuid::new_v4())
            .bind(attendance.registration_id)
            .bind(attendance.checked_in_at)
            .bind(attendance.method)
            .bind(attendance.recorded_by)
            .fetch_optional(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(match record {
            Some(record) => AttendanceInsert::Created(record),
            None => AttendanceInsert::AlreadyRecorded,
        })
    }

    async fn get_attendance(&self, registration_id: Uuid) -> StoreResult<Option<AttendanceRecord>> {
        let sql =
            format!("SELECT {ATTENDANCE_COLUMNS} FROM attendance_records WHERE registration_id = $1");
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(registration_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn check_out(
        &self,
        registration_id: Uuid,
        at: DateTime<Utc>,
    ) -> StoreResult<Option<AttendanceRecord>> {
        let sql = format!(
            "UPDATE attendance_records SET checked_out_at = $2 \
             WHERE registration_id = $1 AND checked_out_at IS NULL \
             RETURNING {ATTENDANCE_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AttendanceRecord>(&sql)
            .bind(registration_id)
            .bind(at)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn attendance_counts(&self, event_id: Uuid) -> StoreResult<AttendanceCounts> {
        let counts = sqlx::query_as::<_, AttendanceCounts>(
            r#"
            SELECT
                COUNT(*) AS total_registrations,
                COUNT(*) FILTER (WHERE r.status = 'confirmed') AS confirmed_registrations,
                COUNT(*) FILTER (WHERE r.status = 'cancelled') AS cancelled_registrations,
                COALESCE(SUM(r.quantity) FILTER (WHERE r.status = 'confirmed'), 0)::BIGINT
                    AS tickets_sold,
                COUNT(a.id) FILTER (WHERE r.status = 'confirmed') AS checked_in,
                COUNT(a.checked_out_at) FILTER (WHERE r.status = 'confirmed') AS checked_out,
                COALESCE(SUM(r.total_amount) FILTER (
                    WHERE r.status = 'confirmed' AND r.payment_status = 'completed'
                ), 0) AS revenue
            FROM registrations r
            LEFT JOIN attendance_records a ON a.registration_id = r.id
            WHERE r.event_id = $1
            "#,
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(counts)
    }

    async fn list_attendees(&self, event_id: Uuid) -> StoreResult<Vec<AttendeeEntry>> {
        let rows = sqlx::query_as::<_, AttendeeEntry>(
            r#"
            SELECT
                r.id AS registration_id,
                p.id AS attendee_id,
                p.name AS attendee_name,
                p.email AS attendee_email,
                t.label AS ticket_label,
                r.quantity,
                r.total_amount,
                r.payment_status,
                r.status,
                a.checked_in_at,
                a.checked_out_at,
                r.created_at
            FROM registrations r
            JOIN attendees p ON p.id = r.attendee_id
            JOIN ticket_types t ON t.id = r.ticket_type_id
            LEFT JOIN attendance_records a ON a.registration_id = r.id
            WHERE r.event_id = $1
            ORDER BY r.created_at DESC
            "#,
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }
}
