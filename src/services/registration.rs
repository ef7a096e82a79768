use std::sync::Arc;

use sqlx::SqlitePool;

use crate::clock::Clock;
use crate::db;
use crate::error::AppError;
use crate::models::{Attendee, NewAttendee, RegisterPayload};
use crate::validation::{required_email, required_string};

/// Admits attendees to events.
///
/// Gates run in a fixed order so that a caller hitting several conditions at
/// once always sees the same error:
///
/// 1. the event exists ([`AppError::NotFound`])
/// 2. name and email are valid ([`AppError::Validation`])
/// 3. the event has room ([`AppError::CapacityExceeded`])
/// 4. the email is not yet registered ([`AppError::DuplicateRegistration`])
/// 5. the event has not started ([`AppError::EventExpired`])
///
/// The final insert re-checks capacity and uniqueness atomically, so a
/// registration that loses a race still gets a gate error and never a row.
pub struct RegistrationService {
    pool: SqlitePool,
    clock: Arc<dyn Clock>,
}

impl RegistrationService {
    pub fn new(pool: SqlitePool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    pub async fn register(
        &self,
        event_id: i64,
        payload: RegisterPayload,
    ) -> Result<Attendee, AppError> {
        tracing::info!(event_id, "register attempt");

        let event = db::find_event(&self.pool, event_id).await?.ok_or_else(|| {
            tracing::warn!(event_id, "event not found");
            AppError::event_not_found()
        })?;

        let name = required_string("name", payload.name.as_ref())?;
        let email = required_email("email", payload.email.as_ref())?;

        let attendee_count = db::count_attendees(&self.pool, event_id).await?;
        tracing::debug!(
            event_id,
            attendee_count,
            max_capacity = event.max_capacity,
            "capacity check"
        );
        if attendee_count >= event.max_capacity {
            tracing::warn!(event_id, "event full");
            return Err(AppError::CapacityExceeded);
        }

        if db::attendee_exists(&self.pool, event_id, &email).await? {
            tracing::warn!(event_id, %email, "duplicate email");
            return Err(AppError::DuplicateRegistration);
        }

        let now = self.clock.now();
        if event.start_time < now {
            tracing::warn!(event_id, start_time = %event.start_time, %now, "past event");
            return Err(AppError::EventExpired);
        }

        let attendee = NewAttendee {
            event_id,
            name,
            email,
        };
        let created =
            db::insert_attendee_within_capacity(&self.pool, &attendee, event.max_capacity, now)
                .await?;
        tracing::info!(event_id, attendee_id = created.id, "attendee registered");
        Ok(created)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::db::tests::memory_pool;
    use crate::models::NewEvent;
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    async fn setup() -> (SqlitePool, RegistrationService) {
        let pool = memory_pool().await;
        let svc = RegistrationService::new(pool.clone(), Arc::new(FixedClock(now())));
        (pool, svc)
    }

    async fn event(pool: &SqlitePool, starts_in: Duration, max_capacity: i64) -> i64 {
        let new = NewEvent {
            name: "Launch party".into(),
            location: "Mumbai".into(),
            start_time: now() + starts_in,
            end_time: now() + starts_in + Duration::hours(2),
            max_capacity,
        };
        db::create_event(pool, &new, now() - Duration::days(7))
            .await
            .unwrap()
            .id
    }

    fn guest(name: &str, email: &str) -> RegisterPayload {
        RegisterPayload {
            name: Some(json!(name)),
            email: Some(json!(email)),
        }
    }

    #[tokio::test]
    async fn registers_and_returns_attendee() {
        let (pool, svc) = setup().await;
        let event_id = event(&pool, Duration::hours(1), 10).await;

        let attendee = svc.register(event_id, guest("John Doe", "john@example.com")).await.unwrap();
        assert_eq!(attendee.event_id, event_id);
        assert_eq!(attendee.email, "john@example.com");
        assert_eq!(attendee.created_at, now());
    }

    #[tokio::test]
    async fn unknown_event_wins_over_bad_input() {
        let (_pool, svc) = setup().await;
        let err = svc
            .register(999, RegisterPayload::default())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn nth_succeeds_and_next_is_over_capacity() {
        let (pool, svc) = setup().await;
        let event_id = event(&pool, Duration::hours(1), 1).await;

        svc.register(event_id, guest("A", "a@x.com")).await.unwrap();
        let err = svc.register(event_id, guest("B", "b@x.com")).await.unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded));
    }

    #[tokio::test]
    async fn same_email_twice_is_duplicate() {
        let (pool, svc) = setup().await;
        let event_id = event(&pool, Duration::hours(1), 5).await;

        svc.register(event_id, guest("Dup", "dup@example.com")).await.unwrap();
        let err = svc
            .register(event_id, guest("Dup again", "dup@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateRegistration));
        assert_eq!(db::count_attendees(&pool, event_id).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn email_case_does_not_make_a_new_registration() {
        let (pool, svc) = setup().await;
        let event_id = event(&pool, Duration::hours(1), 5).await;

        svc.register(event_id, guest("Ann", "Ann@Example.com")).await.unwrap();
        let err = svc
            .register(event_id, guest("Ann", "ann@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::DuplicateRegistration));
    }

    #[tokio::test]
    async fn registers_when_start_equals_now() {
        let (pool, svc) = setup().await;
        let event_id = event(&pool, Duration::zero(), 5).await;

        let attendee = svc
            .register(event_id, guest("On time", "ontime@example.com"))
            .await
            .unwrap();
        assert_eq!(attendee.event_id, event_id);

        // One second later the event has started.
        let late = RegistrationService::new(pool.clone(), Arc::new(FixedClock(now() + Duration::seconds(1))));
        let err = late
            .register(event_id, guest("Late", "late@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::EventExpired));
    }

    #[tokio::test]
    async fn padded_fields_are_stored_trimmed() {
        let (pool, svc) = setup().await;
        let event_id = event(&pool, Duration::hours(1), 5).await;

        let attendee = svc
            .register(event_id, guest("  Jo  ", " jo@example.com "))
            .await
            .unwrap();
        assert_eq!(attendee.name, "Jo");
        assert_eq!(attendee.email, "jo@example.com");
        assert!(db::attendee_exists(&pool, event_id, "jo@example.com").await.unwrap());
    }

    #[tokio::test]
    async fn started_event_is_expired_even_with_room() {
        let (pool, svc) = setup().await;
        let event_id = event(&pool, -Duration::days(1), 100).await;

        let err = svc.register(event_id, guest("Past", "past@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::EventExpired));
        assert_eq!(db::count_attendees(&pool, event_id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn capacity_is_reported_before_duplicate_and_expiry() {
        let (pool, svc) = setup().await;
        let event_id = event(&pool, Duration::hours(1), 1).await;
        svc.register(event_id, guest("A", "a@x.com")).await.unwrap();

        // Full and duplicate at once: capacity wins.
        let err = svc.register(event_id, guest("A", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded));

        // Full and started: capacity still wins.
        let late = RegistrationService::new(pool.clone(), Arc::new(FixedClock(now() + Duration::hours(3))));
        let err = late.register(event_id, guest("B", "b@x.com")).await.unwrap_err();
        assert!(matches!(err, AppError::CapacityExceeded));
    }

    #[tokio::test]
    async fn duplicate_is_reported_before_expiry() {
        let (pool, svc) = setup().await;
        let event_id = event(&pool, Duration::hours(1), 5).await;
        svc.register(event_id, guest("A", "a@x.com")).await.unwrap();

        let late = RegistrationService::new(pool.clone(), Arc::new(FixedClock(now() + Duration::hours(3))));
        let err = late.register(event_id, guest("A", "a@x.com")).await.unwrap_err();
        assert!(matches!(err, AppError::DuplicateRegistration));
    }

    #[tokio::test]
    async fn invalid_email_is_validation_error() {
        let (pool, svc) = setup().await;
        let event_id = event(&pool, Duration::hours(1), 5).await;

        let err = svc.register(event_id, guest("Bad", "not-an-email")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "email", .. }));
        let err = svc.register(event_id, guest("", "ok@example.com")).await.unwrap_err();
        assert!(matches!(err, AppError::Validation { field: "name", .. }));
    }
}
