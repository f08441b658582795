use crate::middleware::caller::AnyCaller;
use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::routes::parse_class_id;
use crate::{AppState, build_live};
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use wb_core::types::leaderboard::Leaderboard;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/leaderboard/{class_id}", get(class_leaderboard))
        .with_state(state)
}

/// Final scores once the class has been finalized, the live board before.
#[utoipa::path(
    get,
    path = "/api/leaderboard/{class_id}",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses((status = 200, body = Leaderboard))
)]
pub(crate) async fn class_leaderboard(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    _caller: AnyCaller,
    Path(class_id): Path<String>,
) -> Response {
    let class_id = match parse_class_id(&class_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    match live.leaderboard().class_leaderboard(class_id) {
        Ok(board) => Json(board).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}
