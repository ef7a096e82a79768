use axum::Json;
use utoipa::OpenApi;

use crate::{
    error::ErrorBody,
    handlers::{self, HealthPayload},
    models::{Attendee, CreateEventPayload, EventView, RegisterPayload},
    pagination::{Page, PageLinks, PageMeta},
};

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health_check,
        handlers::create_event,
        handlers::list_events,
        handlers::register_attendee,
        handlers::list_attendees,
    ),
    components(
        schemas(
            EventView, Attendee,
            CreateEventPayload, RegisterPayload,
            Page<Attendee>, PageMeta, PageLinks,
            ErrorBody, HealthPayload,
        )
    ),
    tags(
        (name = "events", description = "Event creation and upcoming listing"),
        (name = "attendees", description = "Registration and attendee listing"),
        (name = "health", description = "Liveness")
    ),
    info(
        title = "Event Management API",
        version = "1.0.0",
        description = "Create capacity-limited events and register attendees"
    )
)]
pub struct ApiDoc;

/// The generated OpenAPI document, served as JSON.
pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}
