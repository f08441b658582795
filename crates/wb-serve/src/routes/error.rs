use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use utoipa::ToSchema;
use wb_core::WodboardError;
use wb_core::error::{ProgressError, ScoreError, SessionError, WorkoutError};

#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorEnvelope {
    pub error: &'static str,
    pub message: String,
    pub correlation_id: Option<String>,
}

pub fn map_error(
    err: &WodboardError,
    correlation_id: Option<String>,
) -> (StatusCode, Json<ErrorEnvelope>) {
    let status = match err {
        WodboardError::Session(session) => session_status(session),
        WodboardError::Progress(progress) => progress_status(progress),
        WodboardError::Score(score) => score_status(score),
        WodboardError::Workout(workout) => workout_status(workout),
        WodboardError::StorageTimeout { .. } => StatusCode::SERVICE_UNAVAILABLE,
        WodboardError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(
            code = err.code(),
            error = %err,
            correlation_id = correlation_id.as_deref(),
            "request failed"
        );
    }

    (
        status,
        Json(ErrorEnvelope {
            error: err.code(),
            message: err.to_string(),
            correlation_id,
        }),
    )
}

/// 400 for malformed path segments and bodies the core never sees.
pub fn invalid_input(message: impl Into<String>, correlation_id: Option<String>) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorEnvelope {
            error: "INVALID_INPUT",
            message: message.into(),
            correlation_id,
        }),
    )
        .into_response()
}

fn session_status(err: &SessionError) -> StatusCode {
    match err {
        SessionError::NotFound => StatusCode::NOT_FOUND,
        SessionError::AlreadyRunning
        | SessionError::AlreadyEnded
        | SessionError::NotRunning { .. }
        | SessionError::NotPaused { .. }
        | SessionError::NotEnded { .. } => StatusCode::CONFLICT,
    }
}

fn progress_status(err: &ProgressError) -> StatusCode {
    match err {
        ProgressError::AlreadyFinished
        | ProgressError::TimeCapNotReached
        | ProgressError::TimeCapReached => StatusCode::CONFLICT,
        ProgressError::UnsupportedFormat { .. }
        | ProgressError::StepOutOfRange { .. }
        | ProgressError::EmptyWorkout
        | ProgressError::InvalidInput { .. } => StatusCode::BAD_REQUEST,
    }
}

fn score_status(err: &ScoreError) -> StatusCode {
    match err {
        ScoreError::NotInterval { .. } | ScoreError::SessionActive => StatusCode::CONFLICT,
        ScoreError::NotClassCoach | ScoreError::NotBooked => StatusCode::FORBIDDEN,
        ScoreError::MissingScore { .. } | ScoreError::InvalidInput { .. } => {
            StatusCode::BAD_REQUEST
        }
    }
}

fn workout_status(err: &WorkoutError) -> StatusCode {
    match err {
        WorkoutError::WorkoutNotFound | WorkoutError::ClassNotFound => StatusCode::NOT_FOUND,
        WorkoutError::NoWorkoutAssigned | WorkoutError::InvalidStructure { .. } => {
            StatusCode::BAD_REQUEST
        }
        WorkoutError::InUse => StatusCode::CONFLICT,
    }
}
