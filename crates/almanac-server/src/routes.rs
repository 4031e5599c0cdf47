//! REST endpoints for user and academic events

use almanac_shared::api::{ACADEMIC_EVENTS_PATH, DeleteResponse, EVENTS_PATH, NewEvent};
use almanac_shared::event::Event;
use axum::{
    Json, Router,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
    routing::{delete, get},
};
use tracing::{info, warn};

use crate::AppState;
use crate::error::ApiError;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(EVENTS_PATH, get(list_events).post(create_event))
        .route(&format!("{EVENTS_PATH}/{{id}}"), delete(delete_event))
        .route(ACADEMIC_EVENTS_PATH, get(academic_events))
        .route("/healthz", get(healthz))
}

/// GET /api/events
async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.blocking(|store| store.list()).await?;
    Ok(Json(events))
}

/// POST /api/events
async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<NewEvent>, JsonRejection>,
) -> Result<(StatusCode, Json<Event>), ApiError> {
    let Json(body) = payload.map_err(|rejection| {
        warn!(error = %rejection.body_text(), "rejected event body");
        ApiError::bad_request(rejection.body_text())
    })?;
    let valid = body.validate()?;

    let event = state.blocking(move |store| store.create(valid)).await?;
    info!(id = ?event.id, title = %event.title, "event created");
    Ok((StatusCode::CREATED, Json(event)))
}

/// DELETE /api/events/{id}
async fn delete_event(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let id: i64 = raw_id
        .trim()
        .parse()
        .map_err(|_| ApiError::bad_request(format!("invalid event id: {raw_id}")))?;

    if state.blocking(move |store| store.delete(id)).await? {
        info!(id, "event deleted");
        Ok(Json(DeleteResponse { success: true }))
    } else {
        Err(ApiError::not_found("Event not found"))
    }
}

/// GET /api/academic-events
async fn academic_events(State(state): State<AppState>) -> Result<Json<Vec<Event>>, ApiError> {
    let events = state.blocking(|store| store.academic_events()).await?;
    Ok(Json(events))
}

async fn healthz() -> &'static str {
    "ok"
}
