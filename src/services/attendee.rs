use sqlx::SqlitePool;

use crate::db;
use crate::error::AppError;
use crate::models::Attendee;
use crate::pagination::{Page, PageMeta, PageQuery};

pub const EMPTY_HINT: &str = "No attendees yet";

pub struct AttendeeQueryService {
    pool: SqlitePool,
}

impl AttendeeQueryService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// One page of an event's attendees in registration order.
    pub async fn list_by_event(
        &self,
        event_id: i64,
        query: &PageQuery,
    ) -> Result<Page<Attendee>, AppError> {
        if db::find_event(&self.pool, event_id).await?.is_none() {
            tracing::warn!(event_id, "attendee list for unknown event");
            return Err(AppError::event_not_found());
        }

        let request = query.validate().inspect_err(|e| {
            tracing::warn!(event_id, error = %e, "invalid pagination");
        })?;

        let (total, attendees) = db::count_and_list_attendees(&self.pool, event_id, request).await?;
        tracing::debug!(
            event_id,
            page = request.page,
            returned = attendees.len(),
            total,
            "attendees page"
        );
        Ok(Page::new(attendees, PageMeta::new(request, total), EMPTY_HINT))
    }
}
