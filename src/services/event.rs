// Event creation and listing. Input and output times are wall-clock in the
// display timezone, storage is UTC.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::SqlitePool;

use crate::clock::Clock;
use crate::db;
use crate::error::AppError;
use crate::models::{CreateEventPayload, EventView, NewEvent};
use crate::timezone::DisplayTimezone;
use crate::validation::{required, required_integer, required_string};

pub struct EventService {
    pool: SqlitePool,
    timezone: DisplayTimezone,
    clock: Arc<dyn Clock>,
}

impl EventService {
    pub fn new(pool: SqlitePool, timezone: DisplayTimezone, clock: Arc<dyn Clock>) -> Self {
        Self {
            pool,
            timezone,
            clock,
        }
    }

    pub async fn create(&self, payload: CreateEventPayload) -> Result<EventView, AppError> {
        let now = self.clock.now();
        let event = self.validate(&payload, now)?;

        let created = db::create_event(&self.pool, &event, now).await?;
        tracing::info!(
            event_id = created.id,
            start_time = %created.start_time,
            max_capacity = created.max_capacity,
            "event created"
        );
        Ok(created.view(&self.timezone))
    }

    pub async fn list_upcoming(&self) -> Result<Vec<EventView>, AppError> {
        let events = db::list_upcoming_events(&self.pool, self.clock.now()).await?;
        Ok(events.iter().map(|e| e.view(&self.timezone)).collect())
    }

    /// Checks fields in order and stops at the first violation.
    fn validate(
        &self,
        payload: &CreateEventPayload,
        now: DateTime<Utc>,
    ) -> Result<NewEvent, AppError> {
        let name = required_string("name", payload.name.as_ref())?;
        let location = required_string("location", payload.location.as_ref())?;

        let start_time = self.instant("start_time", payload.start_time.as_ref())?;
        if start_time <= now {
            return Err(AppError::validation(
                "start_time",
                "The start time field must be a date after now.",
            ));
        }

        let end_time = self.instant("end_time", payload.end_time.as_ref())?;
        if end_time <= start_time {
            return Err(AppError::validation(
                "end_time",
                "The end time field must be a date after start time.",
            ));
        }

        let max_capacity = required_integer("max_capacity", payload.max_capacity.as_ref())?;
        if max_capacity < 1 {
            return Err(AppError::validation(
                "max_capacity",
                "The max capacity field must be at least 1.",
            ));
        }

        Ok(NewEvent {
            name,
            location,
            start_time,
            end_time,
            max_capacity,
        })
    }

    fn instant(
        &self,
        field: &'static str,
        value: Option<&Value>,
    ) -> Result<DateTime<Utc>, AppError> {
        let text = match value {
            None | Some(Value::Null) => return Err(required(field)),
            Some(Value::String(text)) if text.trim().is_empty() => return Err(required(field)),
            Some(Value::String(text)) => text,
            Some(_) => return Err(invalid_date(field)),
        };
        self.timezone
            .parse_wall_clock(text)
            .ok_or_else(|| invalid_date(field))
    }
}

fn invalid_date(field: &'static str) -> AppError {
    AppError::validation(
        field,
        format!("The {} field must be a valid date.", field.replace('_', " ")),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::tests::memory_pool;
    use chrono::{Duration, TimeZone};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        // 17:30 in UTC+05:30
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    async fn service() -> EventService {
        EventService::new(
            memory_pool().await,
            DisplayTimezone::default(),
            Arc::new(FixedClock(now())),
        )
    }

    fn payload(start: &str, end: &str, capacity: Value) -> CreateEventPayload {
        CreateEventPayload {
            name: Some(json!("Rust meetup")),
            location: Some(json!("Online")),
            start_time: Some(json!(start)),
            end_time: Some(json!(end)),
            max_capacity: Some(capacity),
        }
    }

    fn field_of(err: AppError) -> &'static str {
        match err {
            AppError::Validation { field, .. } => field,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn create_stores_utc_and_displays_local() {
        let svc = service().await;
        let view = svc
            .create(payload("2026-10-17 10:00:00", "2026-10-17 12:00:00", json!(10)))
            .await
            .unwrap();

        assert_eq!(view.start_time.to_rfc3339(), "2026-10-17T10:00:00+05:30");
        assert_eq!(view.end_time.to_rfc3339(), "2026-10-17T12:00:00+05:30");

        let stored = db::find_event(&svc.pool, view.id).await.unwrap().unwrap();
        assert_eq!(stored.start_time, Utc.with_ymd_and_hms(2026, 10, 17, 4, 30, 0).unwrap());
    }

    #[tokio::test]
    async fn start_must_be_after_now_in_display_zone() {
        let svc = service().await;
        // 17:00 local is 11:30 UTC, half an hour before the pinned clock.
        let err = svc
            .create(payload("2026-10-16 17:00:00", "2026-10-16 19:00:00", json!(5)))
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "start_time");

        // 18:00 local is after now.
        assert!(svc
            .create(payload("2026-10-16 18:00:00", "2026-10-16 19:00:00", json!(5)))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn start_within_the_current_second_is_not_in_the_future() {
        let pinned = now() + Duration::milliseconds(200);
        let svc = EventService::new(
            memory_pool().await,
            DisplayTimezone::default(),
            Arc::new(FixedClock(pinned)),
        );

        // 12:00:00.500 UTC would be stored as 12:00:00, before the clock.
        let err = svc
            .create(payload("2026-10-16 17:30:00.500", "2026-10-16 19:00:00", json!(5)))
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "start_time");

        let view = svc
            .create(payload("2026-10-16 17:30:01.500", "2026-10-16 19:00:00", json!(5)))
            .await
            .unwrap();
        assert_eq!(view.start_time.to_rfc3339(), "2026-10-16T17:30:01+05:30");

        let stored = db::find_event(&svc.pool, view.id).await.unwrap().unwrap();
        assert!(stored.start_time > pinned);
        let upcoming = svc.list_upcoming().await.unwrap();
        assert_eq!(upcoming.len(), 1);
    }

    #[tokio::test]
    async fn end_must_follow_start() {
        let svc = service().await;
        let err = svc
            .create(payload("2026-10-18 10:00", "2026-10-18 10:00", json!(5)))
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "end_time");
    }

    #[tokio::test]
    async fn capacity_must_be_positive_integer() {
        let svc = service().await;
        for bad in [json!(0), json!(-1), json!("many"), json!(1.5)] {
            let err = svc
                .create(payload("2026-10-18 10:00", "2026-10-18 11:00", bad))
                .await
                .unwrap_err();
            assert_eq!(field_of(err), "max_capacity");
        }
    }

    #[tokio::test]
    async fn first_violation_wins() {
        let svc = service().await;
        let err = svc
            .create(CreateEventPayload {
                name: Some(json!("")),
                location: None,
                start_time: Some(json!("garbage")),
                end_time: None,
                max_capacity: Some(json!(0)),
            })
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "name");

        let err = svc
            .create(payload("garbage", "also garbage", json!(0)))
            .await
            .unwrap_err();
        assert_eq!(field_of(err), "start_time");
    }

    #[tokio::test]
    async fn list_upcoming_hides_started_events() {
        let svc = service().await;
        svc.create(payload("2026-10-20 09:00", "2026-10-20 10:00", json!(3)))
            .await
            .unwrap();
        svc.create(payload("2026-10-18 09:00", "2026-10-18 10:00", json!(3)))
            .await
            .unwrap();
        let past = NewEvent {
            name: "Yesterday".into(),
            location: "Delhi".into(),
            start_time: now() - Duration::days(1),
            end_time: now() - Duration::hours(20),
            max_capacity: 3,
        };
        db::create_event(&svc.pool, &past, now() - Duration::days(2))
            .await
            .unwrap();

        let upcoming = svc.list_upcoming().await.unwrap();
        let starts: Vec<_> = upcoming.iter().map(|e| e.start_time.to_rfc3339()).collect();
        assert_eq!(
            starts,
            ["2026-10-18T09:00:00+05:30", "2026-10-20T09:00:00+05:30"]
        );
    }
}
