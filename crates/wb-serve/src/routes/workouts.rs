use crate::middleware::caller::AnyCaller;
use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::routes::parse_workout_id;
use crate::{AppState, build_live};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use wb_core::types::workout::WorkoutSteps;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/workout/{workout_id}/steps", get(steps))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/workout/{workout_id}/steps",
    params(("workout_id" = i64, Path, description = "Workout ID")),
    responses((status = 200, body = WorkoutSteps))
)]
pub(crate) async fn steps(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    _caller: AnyCaller,
    Path(workout_id): Path<String>,
) -> Response {
    let workout_id = match parse_workout_id(&workout_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    match live.workouts().plan(workout_id) {
        Ok(plan) => Json(plan).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}
