use crate::middleware::caller::AnyCaller;
use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::{AppState, build_live};
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Extension, Json, Router};
use wb_core::RequestContext;
use wb_core::types::attendance::SubmitScoreOutcome;
use wb_core::types::io::SubmitScoreInput;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/submitScore", post(submit_score))
        .with_state(state)
}

#[utoipa::path(
    post,
    path = "/api/submitScore",
    request_body = SubmitScoreInput,
    responses((status = 200, body = SubmitScoreOutcome))
)]
pub(crate) async fn submit_score(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    AnyCaller(caller): AnyCaller,
    Json(input): Json<SubmitScoreInput>,
) -> Response {
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::for_caller(caller, Some(correlation.0));
    match live.scores().submit(&ctx, caller, input) {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
