use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use crate::{
    app::AppState,
    error::AppResult,
    model::{CreatedEventOut, DuplicateCheckPayload, EventListQuery, EventOut, NewEventPayload},
    service,
    util::name_field::FieldState,
};

pub async fn list_events(
    State(state): State<AppState>,
    Query(query): Query<EventListQuery>,
) -> AppResult<Json<Vec<EventOut>>> {
    let items = service::events::list(&state.catalog, query)?;
    Ok(Json(items))
}

pub async fn check_duplicate(
    State(state): State<AppState>,
    Json(payload): Json<DuplicateCheckPayload>,
) -> Json<FieldState> {
    Json(service::events::check_name(&state.catalog, &payload.name))
}

pub async fn create_event(
    State(state): State<AppState>,
    Json(payload): Json<NewEventPayload>,
) -> AppResult<(StatusCode, Json<CreatedEventOut>)> {
    let created = service::events::create(&state.catalog, payload)?;
    Ok((StatusCode::CREATED, Json(created)))
}
