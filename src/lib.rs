pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod openapi;
pub mod pagination;
pub mod services;
pub mod state;
pub mod timezone;
pub mod validation;

use axum::{
    routing::{get, post},
    Router,
};
use state::AppState;

/// All API routes, mounted under `prefix` (empty for the root).
pub fn router(app_state: AppState, prefix: &str) -> Router {
    let api = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/api-doc/openapi.json", get(openapi::openapi_json))
        .route(
            "/events",
            get(handlers::list_events).post(handlers::create_event),
        )
        .route(
            "/events/{event_id}/register",
            post(handlers::register_attendee),
        )
        .route(
            "/events/{event_id}/attendees",
            get(handlers::list_attendees),
        )
        .with_state(app_state);

    if prefix.is_empty() {
        api
    } else {
        Router::new().nest(prefix, api)
    }
}
