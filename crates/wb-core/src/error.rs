use crate::types::enums::{SessionStatus, WorkoutType};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no session for this class")]
    NotFound,
    #[error("session already running")]
    AlreadyRunning,
    #[error("session already ended; restart to run it again")]
    AlreadyEnded,
    #[error("session is {status:?}, expected running")]
    NotRunning { status: SessionStatus },
    #[error("session is {status:?}, expected paused")]
    NotPaused { status: SessionStatus },
    #[error("session is {status:?}, expected ended")]
    NotEnded { status: SessionStatus },
}

#[derive(Debug, Error)]
pub enum ProgressError {
    #[error("member already finished")]
    AlreadyFinished,
    #[error("time cap not reached")]
    TimeCapNotReached,
    #[error("time cap reached")]
    TimeCapReached,
    #[error("{workout_type:?} does not support this operation")]
    UnsupportedFormat { workout_type: WorkoutType },
    #[error("step index {index} out of range (steps: {count})")]
    StepOutOfRange { index: i64, count: usize },
    #[error("workout has no steps")]
    EmptyWorkout,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum ScoreError {
    #[error("{workout_type:?} is not an interval workout")]
    NotInterval { workout_type: WorkoutType },
    #[error("caller does not coach this class")]
    NotClassCoach,
    #[error("member is not booked into this class")]
    NotBooked,
    #[error("class has a live session")]
    SessionActive,
    #[error("missing score: {message}")]
    MissingScore { message: String },
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
}

#[derive(Debug, Error)]
pub enum WorkoutError {
    #[error("workout not found")]
    WorkoutNotFound,
    #[error("class not found")]
    ClassNotFound,
    #[error("class has no workout assigned")]
    NoWorkoutAssigned,
    #[error("workout is referenced by a session")]
    InUse,
    #[error("invalid workout structure: {message}")]
    InvalidStructure { message: String },
}

#[derive(Debug, Error)]
pub enum WodboardError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Progress(#[from] ProgressError),
    #[error(transparent)]
    Score(#[from] ScoreError),
    #[error(transparent)]
    Workout(#[from] WorkoutError),
    #[error("storage busy: {message}")]
    StorageTimeout { message: String },
    #[error("internal error: {message}")]
    Internal { message: String },
}

impl WodboardError {
    /// Stable machine-readable code shared by the HTTP envelope and logs.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Session(err) => match err {
                SessionError::NotFound => "SESSION_NOT_FOUND",
                SessionError::AlreadyRunning => "ALREADY_RUNNING",
                SessionError::AlreadyEnded => "ALREADY_ENDED",
                SessionError::NotRunning { .. } => "NOT_RUNNING",
                SessionError::NotPaused { .. } => "NOT_PAUSED",
                SessionError::NotEnded { .. } => "NOT_ENDED",
            },
            Self::Progress(err) => match err {
                ProgressError::AlreadyFinished => "ALREADY_FINISHED",
                ProgressError::TimeCapNotReached => "TIME_CAP_NOT_REACHED",
                ProgressError::TimeCapReached => "TIME_CAP_REACHED",
                ProgressError::UnsupportedFormat { .. } => "UNSUPPORTED_FORMAT",
                ProgressError::StepOutOfRange { .. } => "STEP_INDEX_OUT_OF_RANGE",
                ProgressError::EmptyWorkout => "EMPTY_WORKOUT",
                ProgressError::InvalidInput { .. } => "INVALID_INPUT",
            },
            Self::Score(err) => match err {
                ScoreError::NotInterval { .. } => "NOT_INTERVAL",
                ScoreError::NotClassCoach => "NOT_CLASS_COACH",
                ScoreError::NotBooked => "NOT_BOOKED",
                ScoreError::SessionActive => "SESSION_ACTIVE",
                ScoreError::MissingScore { .. } => "MISSING_SCORE",
                ScoreError::InvalidInput { .. } => "INVALID_INPUT",
            },
            Self::Workout(err) => match err {
                WorkoutError::WorkoutNotFound => "WORKOUT_NOT_FOUND",
                WorkoutError::ClassNotFound => "CLASS_NOT_FOUND",
                WorkoutError::NoWorkoutAssigned => "NO_WORKOUT_ASSIGNED",
                WorkoutError::InUse => "WORKOUT_IN_USE",
                WorkoutError::InvalidStructure { .. } => "INVALID_INPUT",
            },
            Self::StorageTimeout { .. } => "STORAGE_TIMEOUT",
            Self::Internal { .. } => "INTERNAL_ERROR",
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_follow_the_wrapped_variant() {
        let err = WodboardError::from(SessionError::AlreadyRunning);
        assert_eq!(err.code(), "ALREADY_RUNNING");
        let err = WodboardError::from(ProgressError::StepOutOfRange { index: 9, count: 3 });
        assert_eq!(err.code(), "STEP_INDEX_OUT_OF_RANGE");
        assert_eq!(err.to_string(), "step index 9 out of range (steps: 3)");
        assert_eq!(WodboardError::internal("boom").code(), "INTERNAL_ERROR");
    }
}
