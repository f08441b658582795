use crate::middleware::caller::StaffCaller;
use crate::middleware::correlation::CorrelationId;
use crate::routes::error::{invalid_input, map_error};
use crate::routes::parse_class_id;
use crate::{AppState, build_live};
use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Extension, Json, Router};
use wb_core::RequestContext;
use wb_core::types::attendance::{ClassAttendance, FinalizationReport, StopOutcome};
use wb_core::types::io::{
    AmrapTotalInput, CoachIntervalScoreInput, ForTimeFinishInput, IntervalFinalInput, NoteInput,
    StartSessionInput,
};
use wb_core::types::progress::MyProgress;
use wb_core::types::session::{CoachNote, SessionView};

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/coach/live/{class_id}/start", post(start))
        .route("/coach/live/{class_id}/stop", post(stop))
        .route("/coach/live/{class_id}/pause", post(pause))
        .route("/coach/live/{class_id}/resume", post(resume))
        .route("/coach/live/{class_id}/finalize", post(finalize))
        .route("/coach/live/{class_id}/note", get(get_note).post(set_note))
        .route("/coach/live/{class_id}/interval/score", post(interval_score))
        .route("/coach/live/{class_id}/interval/final", post(interval_final))
        .route("/coach/live/{class_id}/amrap/set-total", post(amrap_total))
        .route("/coach/live/{class_id}/for-time/finish", post(for_time_finish))
        .with_state(state)
}

/// The body is optional; an empty one means a plain start.
#[utoipa::path(
    post,
    path = "/api/coach/live/{class_id}/start",
    params(("class_id" = i64, Path, description = "Class ID")),
    request_body(content = StartSessionInput, description = "Optional; an empty body starts without restart"),
    responses((status = 200, body = SessionView))
)]
pub(crate) async fn start(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    StaffCaller(caller): StaffCaller,
    Path(class_id): Path<String>,
    body: Bytes,
) -> Response {
    let class_id = match parse_class_id(&class_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let input = if body.iter().all(u8::is_ascii_whitespace) {
        StartSessionInput::default()
    } else {
        match serde_json::from_slice::<StartSessionInput>(&body) {
            Ok(input) => input,
            Err(err) => return invalid_input(err.to_string(), Some(correlation.0)),
        }
    };
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::for_caller(caller, Some(correlation.0));
    match live
        .sessions()
        .start(&ctx, class_id, input.restart, Some(caller.user_id()))
    {
        Ok(view) => Json(view).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/coach/live/{class_id}/stop",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses((status = 200, body = StopOutcome))
)]
pub(crate) async fn stop(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    StaffCaller(caller): StaffCaller,
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
    let ctx = RequestContext::for_caller(caller, Some(correlation.0));
    match live.sessions().stop(&ctx, class_id) {
        Ok(outcome) => Json(outcome).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/coach/live/{class_id}/pause",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses((status = 200, body = SessionView))
)]
pub(crate) async fn pause(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    StaffCaller(caller): StaffCaller,
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
    let ctx = RequestContext::for_caller(caller, Some(correlation.0));
    match live.sessions().pause(&ctx, class_id) {
        Ok(view) => Json(view).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/coach/live/{class_id}/resume",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses((status = 200, body = SessionView))
)]
pub(crate) async fn resume(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    StaffCaller(caller): StaffCaller,
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
    let ctx = RequestContext::for_caller(caller, Some(correlation.0));
    match live.sessions().resume(&ctx, class_id) {
        Ok(view) => Json(view).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

/// Retry hook for a finalization that failed during stop.
#[utoipa::path(
    post,
    path = "/api/coach/live/{class_id}/finalize",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses((status = 200, body = FinalizationReport))
)]
pub(crate) async fn finalize(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    StaffCaller(caller): StaffCaller,
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
    let ctx = RequestContext::for_caller(caller, Some(correlation.0));
    match live.finalization().finalize(&ctx, class_id) {
        Ok(report) => Json(report).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    get,
    path = "/api/coach/live/{class_id}/note",
    params(("class_id" = i64, Path, description = "Class ID")),
    responses((status = 200, body = CoachNote))
)]
pub(crate) async fn get_note(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    _caller: StaffCaller,
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
    match live.sessions().note(class_id) {
        Ok(note) => Json(note).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/coach/live/{class_id}/note",
    params(("class_id" = i64, Path, description = "Class ID")),
    request_body = NoteInput,
    responses((status = 200, body = CoachNote))
)]
pub(crate) async fn set_note(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    StaffCaller(caller): StaffCaller,
    Path(class_id): Path<String>,
    Json(input): Json<NoteInput>,
) -> Response {
    let class_id = match parse_class_id(&class_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::for_caller(caller, Some(correlation.0));
    match live.sessions().set_note(&ctx, caller, class_id, input.note) {
        Ok(note) => Json(note).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/coach/live/{class_id}/interval/score",
    params(("class_id" = i64, Path, description = "Class ID")),
    request_body = CoachIntervalScoreInput,
    responses((status = 200, body = MyProgress))
)]
pub(crate) async fn interval_score(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    StaffCaller(caller): StaffCaller,
    Path(class_id): Path<String>,
    Json(input): Json<CoachIntervalScoreInput>,
) -> Response {
    let class_id = match parse_class_id(&class_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::for_caller(caller, Some(correlation.0));
    match live.progress().coach_interval_score(
        &ctx,
        caller,
        class_id,
        input.user_id,
        input.step_index,
        input.reps,
    ) {
        Ok(progress) => Json(progress).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/coach/live/{class_id}/interval/final",
    params(("class_id" = i64, Path, description = "Class ID")),
    request_body = IntervalFinalInput,
    responses((status = 200, body = ClassAttendance))
)]
pub(crate) async fn interval_final(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    StaffCaller(caller): StaffCaller,
    Path(class_id): Path<String>,
    Json(input): Json<IntervalFinalInput>,
) -> Response {
    let class_id = match parse_class_id(&class_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::for_caller(caller, Some(correlation.0));
    match live.finalization().edit_interval_final_reps(
        &ctx,
        caller,
        class_id,
        input.member_id,
        input.total_reps,
    ) {
        Ok(row) => Json(row).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/coach/live/{class_id}/amrap/set-total",
    params(("class_id" = i64, Path, description = "Class ID")),
    request_body = AmrapTotalInput,
    responses((status = 200, body = MyProgress))
)]
pub(crate) async fn amrap_total(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    StaffCaller(caller): StaffCaller,
    Path(class_id): Path<String>,
    Json(input): Json<AmrapTotalInput>,
) -> Response {
    let class_id = match parse_class_id(&class_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::for_caller(caller, Some(correlation.0));
    match live
        .progress()
        .coach_set_amrap_total(&ctx, caller, class_id, input.user_id, input.total_reps)
    {
        Ok(progress) => Json(progress).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}

#[utoipa::path(
    post,
    path = "/api/coach/live/{class_id}/for-time/finish",
    params(("class_id" = i64, Path, description = "Class ID")),
    request_body = ForTimeFinishInput,
    responses((status = 200, body = MyProgress))
)]
pub(crate) async fn for_time_finish(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
    StaffCaller(caller): StaffCaller,
    Path(class_id): Path<String>,
    Json(input): Json<ForTimeFinishInput>,
) -> Response {
    let class_id = match parse_class_id(&class_id, Some(&correlation.0)) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation.0)).into_response(),
    };
    let ctx = RequestContext::for_caller(caller, Some(correlation.0));
    match live.progress().coach_set_for_time_finish(
        &ctx,
        caller,
        class_id,
        input.user_id,
        input.finish_seconds,
    ) {
        Ok(progress) => Json(progress).into_response(),
        Err(err) => map_error(&err, ctx.correlation_id).into_response(),
    }
}
