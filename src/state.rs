use std::sync::Arc;

use sqlx::SqlitePool;

use crate::clock::{Clock, SystemClock};
use crate::services::{AttendeeQueryService, EventService, RegistrationService};
use crate::timezone::DisplayTimezone;

#[derive(Clone)]
pub struct AppState {
    pub events: Arc<EventService>,
    pub registrations: Arc<RegistrationService>,
    pub attendees: Arc<AttendeeQueryService>,
}

impl AppState {
    pub fn new(pool: SqlitePool, timezone: DisplayTimezone) -> Self {
        Self::with_clock(pool, timezone, Arc::new(SystemClock))
    }

    pub fn with_clock(pool: SqlitePool, timezone: DisplayTimezone, clock: Arc<dyn Clock>) -> Self {
        Self {
            events: Arc::new(EventService::new(pool.clone(), timezone, clock.clone())),
            registrations: Arc::new(RegistrationService::new(pool.clone(), clock)),
            attendees: Arc::new(AttendeeQueryService::new(pool)),
        }
    }
}
