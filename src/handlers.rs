use crate::{
    error::{AppError, ErrorBody},
    models::{Attendee, CreateEventPayload, EventView, RegisterPayload},
    pagination::{Page, PageQuery},
    state::AppState,
};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        OriginalUri, Path, Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::{de::DeserializeOwned, Serialize};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthPayload {
    #[schema(value_type = String, example = "ok")]
    status: &'static str,
    #[schema(value_type = String, example = "eventdesk")]
    service: &'static str,
}

#[utoipa::path(
    get,
    path = "/health",
    responses((status = 200, description = "Service is up", body = HealthPayload)),
    tag = "health"
)]
pub async fn health_check() -> Json<HealthPayload> {
    Json(HealthPayload {
        status: "ok",
        service: "eventdesk",
    })
}

// A body that is not valid JSON is treated as an empty form, so the caller
// gets the usual "field is required" errors.
fn body_or_default<T: DeserializeOwned + Default>(body: Result<Json<T>, JsonRejection>) -> T {
    match body {
        Ok(Json(payload)) => payload,
        Err(rejection) => {
            tracing::debug!(%rejection, "unreadable request body");
            T::default()
        }
    }
}

// Ids that are not integers cannot name an event.
fn parse_event_id(raw: &str) -> Result<i64, AppError> {
    raw.parse().map_err(|_| AppError::event_not_found())
}

/// Create an event.
///
/// Naive start and end times are read in the display timezone.
#[utoipa::path(
    post,
    path = "/events",
    request_body = CreateEventPayload,
    responses(
        (status = 201, description = "Event created", body = EventView),
        (status = 422, description = "A field failed validation", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "events"
)]
pub async fn create_event(
    State(app_state): State<AppState>,
    body: Result<Json<CreateEventPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<EventView>), AppError> {
    let event = app_state.events.create(body_or_default(body)).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

/// List events that have not started yet, soonest first.
#[utoipa::path(
    get,
    path = "/events",
    responses(
        (status = 200, description = "Upcoming events", body = Vec<EventView>),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "events"
)]
pub async fn list_events(
    State(app_state): State<AppState>,
) -> Result<Json<Vec<EventView>>, AppError> {
    app_state.events.list_upcoming().await.map(Json)
}

/// Register an attendee for an event.
#[utoipa::path(
    post,
    path = "/events/{event_id}/register",
    params(("event_id" = i64, Path, description = "Event ID")),
    request_body = RegisterPayload,
    responses(
        (status = 201, description = "Attendee registered", body = Attendee),
        (status = 404, description = "Event not found", body = ErrorBody),
        (status = 422, description = "Invalid input, event full, email already registered or event started", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "attendees"
)]
pub async fn register_attendee(
    State(app_state): State<AppState>,
    Path(raw_event_id): Path<String>,
    body: Result<Json<RegisterPayload>, JsonRejection>,
) -> Result<(StatusCode, Json<Attendee>), AppError> {
    let event_id = parse_event_id(&raw_event_id)?;
    let attendee = app_state
        .registrations
        .register(event_id, body_or_default(body))
        .await?;
    Ok((StatusCode::CREATED, Json(attendee)))
}

/// List an event's attendees, one page at a time, in registration order.
#[utoipa::path(
    get,
    path = "/events/{event_id}/attendees",
    params(("event_id" = i64, Path, description = "Event ID"), PageQuery),
    responses(
        (status = 200, description = "One page of attendees", body = Page<Attendee>),
        (status = 400, description = "Invalid page or per_page", body = ErrorBody),
        (status = 404, description = "Event not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    ),
    tag = "attendees"
)]
pub async fn list_attendees(
    State(app_state): State<AppState>,
    Path(raw_event_id): Path<String>,
    OriginalUri(uri): OriginalUri,
    query: Result<Query<PageQuery>, QueryRejection>,
) -> Result<Json<Page<Attendee>>, AppError> {
    // Repeated or otherwise unreadable keys never reach PageQuery::validate.
    let Query(query) = query.map_err(|rejection| {
        tracing::debug!(%rejection, "unreadable query string");
        AppError::InvalidPagination("Invalid pagination parameters".to_string())
    })?;
    let event_id = parse_event_id(&raw_event_id)?;
    let page = app_state.attendees.list_by_event(event_id, &query).await?;
    Ok(Json(page.with_links(uri.path())))
}
