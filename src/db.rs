use crate::error::AppError;
use crate::models::{Attendee, Event, NewAttendee, NewEvent};
use crate::pagination::PageRequest;
use chrono::{DateTime, SubsecRound, Utc};
use sqlx::SqlitePool;

pub async fn init_schema(pool: &SqlitePool) -> Result<(), AppError> {
    sqlx::query(
        "CREATE TABLE IF NOT EXISTS events (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            location TEXT NOT NULL,
            start_time TEXT NOT NULL,
            end_time TEXT NOT NULL,
            max_capacity INTEGER NOT NULL CHECK (max_capacity >= 1),
            created_at TEXT NOT NULL
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS attendees (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            event_id INTEGER NOT NULL,
            name TEXT NOT NULL,
            email TEXT NOT NULL COLLATE NOCASE,
            created_at TEXT NOT NULL,
            FOREIGN KEY (event_id) REFERENCES events (id) ON DELETE CASCADE,
            UNIQUE(event_id, email)
        );",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_events_start_time ON events (start_time)")
        .execute(pool)
        .await?;
    Ok(())
}

// Instants are stored as whole-second UTC text so string order matches time order.
fn stored(instant: DateTime<Utc>) -> DateTime<Utc> {
    instant.trunc_subsecs(0)
}

pub async fn create_event(
    pool: &SqlitePool,
    event: &NewEvent,
    now: DateTime<Utc>,
) -> Result<Event, AppError> {
    let event = sqlx::query_as(
        "INSERT INTO events (name, location, start_time, end_time, max_capacity, created_at)
         VALUES (?, ?, ?, ?, ?, ?) RETURNING *",
    )
    .bind(&event.name)
    .bind(&event.location)
    .bind(stored(event.start_time))
    .bind(stored(event.end_time))
    .bind(event.max_capacity)
    .bind(stored(now))
    .fetch_one(pool)
    .await?;
    Ok(event)
}

pub async fn find_event(pool: &SqlitePool, event_id: i64) -> Result<Option<Event>, AppError> {
    sqlx::query_as("SELECT * FROM events WHERE id = ?")
        .bind(event_id)
        .fetch_optional(pool)
        .await
        .map_err(AppError::from)
}

pub async fn list_upcoming_events(
    pool: &SqlitePool,
    now: DateTime<Utc>,
) -> Result<Vec<Event>, AppError> {
    sqlx::query_as("SELECT * FROM events WHERE start_time > ? ORDER BY start_time ASC, id ASC")
        .bind(stored(now))
        .fetch_all(pool)
        .await
        .map_err(AppError::from)
}

pub async fn count_attendees(pool: &SqlitePool, event_id: i64) -> Result<i64, AppError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM attendees WHERE event_id = ?")
        .bind(event_id)
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}

/// Email comparison ignores ASCII case, as does the unique index.
pub async fn attendee_exists(
    pool: &SqlitePool,
    event_id: i64,
    email: &str,
) -> Result<bool, AppError> {
    let found: Option<(i64,)> =
        sqlx::query_as("SELECT id FROM attendees WHERE event_id = ? AND email = ? LIMIT 1")
            .bind(event_id)
            .bind(email)
            .fetch_optional(pool)
            .await?;
    Ok(found.is_some())
}

/// Inserts the attendee only while the event is below `max_capacity`.
///
/// Count and insert happen in one statement, and SQLite serialises writers,
/// so concurrent registrations cannot overfill an event. The unique
/// `(event_id, email)` constraint does the same for duplicates.
pub async fn insert_attendee_within_capacity(
    pool: &SqlitePool,
    attendee: &NewAttendee,
    max_capacity: i64,
    now: DateTime<Utc>,
) -> Result<Attendee, AppError> {
    let inserted: Option<Attendee> = sqlx::query_as(
        "INSERT INTO attendees (event_id, name, email, created_at)
         SELECT ?, ?, ?, ?
         WHERE (SELECT COUNT(*) FROM attendees WHERE event_id = ?) < ?
         RETURNING *",
    )
    .bind(attendee.event_id)
    .bind(&attendee.name)
    .bind(&attendee.email)
    .bind(stored(now))
    .bind(attendee.event_id)
    .bind(max_capacity)
    .fetch_optional(pool)
    .await
    .map_err(|e| match e {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::DuplicateRegistration
        }
        other => AppError::from(other),
    })?;

    inserted.ok_or(AppError::CapacityExceeded)
}

pub async fn count_and_list_attendees(
    pool: &SqlitePool,
    event_id: i64,
    page: PageRequest,
) -> Result<(i64, Vec<Attendee>), AppError> {
    let total = count_attendees(pool, event_id).await?;
    let Some(offset) = page.offset().filter(|offset| *offset < total) else {
        return Ok((total, Vec::new()));
    };

    let attendees = sqlx::query_as(
        "SELECT * FROM attendees WHERE event_id = ? ORDER BY id ASC LIMIT ? OFFSET ?",
    )
    .bind(event_id)
    .bind(page.per_page)
    .bind(offset)
    .fetch_all(pool)
    .await?;
    Ok((total, attendees))
}
