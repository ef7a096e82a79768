use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::timezone::DisplayTimezone;

/// An event row. Instants are UTC.
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Event {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_capacity: i64,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn view(&self, tz: &DisplayTimezone) -> EventView {
        EventView {
            id: self.id,
            name: self.name.clone(),
            location: self.location.clone(),
            start_time: tz.display(self.start_time),
            end_time: tz.display(self.end_time),
            max_capacity: self.max_capacity,
            created_at: self.created_at,
        }
    }
}

/// What clients see: start and end rendered in the display timezone.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EventView {
    pub id: i64,
    pub name: String,
    pub location: String,
    #[schema(value_type = String, format = DateTime, example = "2026-10-17T10:00:00+05:30")]
    pub start_time: DateTime<FixedOffset>,
    #[schema(value_type = String, format = DateTime, example = "2026-10-17T12:00:00+05:30")]
    pub end_time: DateTime<FixedOffset>,
    pub max_capacity: i64,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow, ToSchema)]
pub struct Attendee {
    pub id: i64,
    pub event_id: i64,
    pub name: String,
    pub email: String,
    #[schema(value_type = String, format = DateTime)]
    pub created_at: DateTime<Utc>,
}

/// Validated event fields, ready to insert.
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub name: String,
    pub location: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub max_capacity: i64,
}

#[derive(Debug, Clone)]
pub struct NewAttendee {
    pub event_id: i64,
    pub name: String,
    pub email: String,
}

// Request bodies keep every field optional so a missing or mistyped field
// surfaces as a field error instead of a JSON rejection.

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct CreateEventPayload {
    #[schema(value_type = String, max_length = 255, example = "Rust meetup")]
    pub name: Option<Value>,
    #[schema(value_type = String, max_length = 255, example = "Online")]
    pub location: Option<Value>,
    /// Wall-clock time in the display timezone, or RFC 3339 with an explicit offset.
    #[schema(value_type = String, example = "2026-10-17 10:00:00")]
    pub start_time: Option<Value>,
    #[schema(value_type = String, example = "2026-10-17 12:00:00")]
    pub end_time: Option<Value>,
    #[schema(value_type = i64, minimum = 1, example = 50)]
    pub max_capacity: Option<Value>,
}

#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct RegisterPayload {
    #[schema(value_type = String, max_length = 255, example = "John Doe")]
    pub name: Option<Value>,
    #[schema(value_type = String, format = Email, example = "john@example.com")]
    pub email: Option<Value>,
}
