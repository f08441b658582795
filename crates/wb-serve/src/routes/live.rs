use crate::middleware::caller::{AnyCaller, MemberCaller};
use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::routes::parse_class_id;
use crate::{AppState, build_live};
use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use wb_core::RequestContext;
use wb_core::types::class::CurrentClass;
use wb_core::types::io::{AdvanceInput, IntervalScoreInput, PartialRepsInput};
use wb_core::types::leaderboard::Leaderboard;
use wb_core::types::progress::MyProgress;
use wb_core::types::session::SessionView;
use wb_events::types::EventSource;

#[derive(Debug, Default, Deserialize, ToSchema, IntoParams)]
pub struct StreamQuery {
    /// Replay stored events with a higher sequence number first.
    pub after: Option<i64>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/live/class", get(current_class))
        .route("/live/{class_id}/session", get(session))
        .route("/live/{class_id}/advance", post(advance))
        .route("/live/{class_id}/partial", post(partial))
        .route("/live/{class_id}/leaderboard", get(leaderboard))
        .route("/live/{class_id}/me", get(my_progress))
        .route("/live/{class_id}/interval/score", post(interval_score))
        .route("/live/{class_id}/interval/leaderboard", get(interval_leaderboard))
        .route("/live/{class_id}/events", get(events))
        .with_state(state)
}

#[utoipa::path(
    get,
    path = "/api/live/class",
    responses((status = 200, body = CurrentClass))
)]
pub(crate) async fn current_class(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    AnyCaller(caller): AnyCaller,
) -> Response {
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    match live.sessions().current_for(caller) {
        Ok(current) => Json(current).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/live/{class_id}/session",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses((status = 200, body = SessionView))
)]
pub(crate) async fn session(
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
    match live.sessions().view(class_id) {
        Ok(view) => Json(view).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/live/{class_id}/advance",
    params(("class_id" = i64, Path, description = "Class ID")),
    request_body = AdvanceInput,
    responses((status = 200, body = MyProgress))
)]
pub(crate) async fn advance(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    MemberCaller(user_id): MemberCaller,
    Path(class_id): Path<String>,
    Json(input): Json<AdvanceInput>,
) -> Response {
    let class_id = match parse_class_id(&class_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::new(EventSource::Member, Some(correlation.0));
    match live
        .progress()
        .advance(&ctx, class_id, user_id, input.direction)
    {
        Ok(progress) => Json(progress).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/live/{class_id}/partial",
    params(("class_id" = i64, Path, description = "Class ID")),
    request_body = PartialRepsInput,
    responses((status = 200, body = MyProgress))
)]
pub(crate) async fn partial(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    MemberCaller(user_id): MemberCaller,
    Path(class_id): Path<String>,
    Json(input): Json<PartialRepsInput>,
) -> Response {
    let class_id = match parse_class_id(&class_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::new(EventSource::Member, Some(correlation.0));
    match live
        .progress()
        .submit_partial(&ctx, class_id, user_id, input.reps)
    {
        Ok(progress) => Json(progress).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/live/{class_id}/leaderboard",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses((status = 200, body = Leaderboard))
)]
pub(crate) async fn leaderboard(
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
    match live.leaderboard().realtime(class_id) {
        Ok(board) => Json(board).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/live/{class_id}/me",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses((status = 200, body = MyProgress))
)]
pub(crate) async fn my_progress(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    MemberCaller(user_id): MemberCaller,
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
    match live.progress().my_progress(class_id, user_id) {
        Ok(progress) => Json(progress).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/live/{class_id}/interval/score",
    params(("class_id" = i64, Path, description = "Class ID")),
    request_body = IntervalScoreInput,
    responses((status = 200, body = MyProgress))
)]
pub(crate) async fn interval_score(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    MemberCaller(user_id): MemberCaller,
    Path(class_id): Path<String>,
    Json(input): Json<IntervalScoreInput>,
) -> Response {
    let class_id = match parse_class_id(&class_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::new(EventSource::Member, Some(correlation.0));
    match live.progress().submit_interval_score(
        &ctx,
        class_id,
        user_id,
        input.step_index,
        input.reps,
    ) {
        Ok(progress) => Json(progress).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/live/{class_id}/interval/leaderboard",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses((status = 200, body = Leaderboard))
)]
pub(crate) async fn interval_leaderboard(
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
    match live.leaderboard().interval(class_id) {
        Ok(board) => Json(board).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/live/{class_id}/events",
    params(("class_id" = i64, Path, description = "Class ID"), StreamQuery),
    responses((status = 200, description = "Server-sent events for one class"))
)]
pub(crate) async fn events(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    _caller: AnyCaller,
    Path(class_id): Path<String>,
    Query(query): Query<StreamQuery>,
) -> Response {
    let class_id = match parse_class_id(&class_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    crate::sse::subscribe(state, class_id, query.after, correlation.0).await
}
