use crate::routes::error::ErrorEnvelope;
use crate::routes::health::Health;
use crate::routes::live::StreamQuery;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use utoipa::OpenApi;
use wb_core::types::attendance::{
    ClassAttendance, FinalizationReport, FinalizationStatus, StopOutcome, SubmitScoreOutcome,
};
use wb_core::types::caller::Caller;
use wb_core::types::class::{ClassInfo, CurrentClass};
use wb_core::types::enums::{
    Direction, LeaderboardSource, QuantityType, Role, ScoringFamily, SessionStatus, WorkoutType,
};
use wb_core::types::ids::{ClassId, UserId, WorkoutId};
use wb_core::types::io::{
    AdvanceInput, AmrapTotalInput, CoachIntervalScoreInput, EventFilter, ForTimeFinishInput,
    IntervalFinalInput, IntervalScoreInput, NoteInput, PartialRepsInput, ScoreEntryInput,
    StartSessionInput, SubmitScoreInput,
};
use wb_core::types::leaderboard::{IntervalStepScore, Leaderboard, LeaderboardEntry};
use wb_core::types::progress::MyProgress;
use wb_core::types::session::{CoachNote, SessionView};
use wb_core::types::workout::{Step, WorkoutMetadata, WorkoutSteps};
use wb_events::types::{EventRecord, EventSource};

#[derive(OpenApi)]
#[openapi(
    info(title = "wodboard", description = "Live class sessions and leaderboards"),
    paths(
        crate::routes::live::current_class,
        crate::routes::live::session,
        crate::routes::live::advance,
        crate::routes::live::partial,
        crate::routes::live::leaderboard,
        crate::routes::live::my_progress,
        crate::routes::live::interval_score,
        crate::routes::live::interval_leaderboard,
        crate::routes::live::events,
        crate::routes::coach::start,
        crate::routes::coach::stop,
        crate::routes::coach::pause,
        crate::routes::coach::resume,
        crate::routes::coach::finalize,
        crate::routes::coach::get_note,
        crate::routes::coach::set_note,
        crate::routes::coach::interval_score,
        crate::routes::coach::interval_final,
        crate::routes::coach::amrap_total,
        crate::routes::coach::for_time_finish,
        crate::routes::leaderboard::class_leaderboard,
        crate::routes::workouts::steps,
        crate::routes::scores::submit_score,
        crate::routes::events::list_events,
        crate::routes::health::health
    ),
    components(schemas(
        ErrorEnvelope,
        Health,
        StreamQuery,
        ClassId,
        UserId,
        WorkoutId,
        WorkoutType,
        ScoringFamily,
        SessionStatus,
        Direction,
        QuantityType,
        Role,
        LeaderboardSource,
        Caller,
        ClassInfo,
        CurrentClass,
        SessionView,
        CoachNote,
        MyProgress,
        Step,
        WorkoutMetadata,
        WorkoutSteps,
        Leaderboard,
        LeaderboardEntry,
        IntervalStepScore,
        ClassAttendance,
        FinalizationReport,
        FinalizationStatus,
        StopOutcome,
        SubmitScoreOutcome,
        StartSessionInput,
        AdvanceInput,
        PartialRepsInput,
        IntervalScoreInput,
        CoachIntervalScoreInput,
        IntervalFinalInput,
        AmrapTotalInput,
        ForTimeFinishInput,
        NoteInput,
        SubmitScoreInput,
        ScoreEntryInput,
        EventFilter,
        EventRecord,
        EventSource
    ))
)]
struct ApiDoc;

pub fn generate_spec() -> String {
    ApiDoc::openapi()
        .to_pretty_json()
        .unwrap_or_else(|_| "{}".to_string())
}

pub fn router() -> Router {
    Router::new()
        .route("/openapi.json", get(openapi_json))
        .route("/docs", get(docs))
}

async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

async fn docs() -> impl IntoResponse {
    let html = r#"<!doctype html>
<html lang="en">
  <head>
    <meta charset="utf-8">
    <title>wodboard API</title>
    <link rel="stylesheet" href="https://unpkg.com/swagger-ui-dist@5/swagger-ui.css">
  </head>
  <body>
    <div id="swagger-ui"></div>
    <script src="https://unpkg.com/swagger-ui-dist@5/swagger-ui-bundle.js"></script>
    <script>
      window.ui = SwaggerUIBundle({ url: '/api/openapi.json', dom_id: '#swagger-ui' });
    </script>
  </body>
</html>
"#;
    axum::response::Html(html)
}
