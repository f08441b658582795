use crate::middleware::caller::StaffCaller;
use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{AppState, build_live};
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use wb_core::types::io::EventFilter;
use wb_events::types::EventRecord;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/events", get(list_events))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventFilter),
    responses((status = 200, body = Vec<EventRecord>))
)]
pub(crate) async fn list_events(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    _caller: StaffCaller,
    Query(filter): Query<EventFilter>,
) -> Response {
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    match live.events().list(&filter) {
        Ok(events) => Json(events).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}
