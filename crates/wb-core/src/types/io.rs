use crate::types::enums::Direction;
use crate::types::ids::{ClassId, UserId};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StartSessionInput {
    #[serde(default)]
    pub restart: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AdvanceInput {
    pub direction: Direction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct PartialRepsInput {
    pub reps: i64,
}

/// Signed so that a negative index is reported as out of range, not as bad JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IntervalScoreInput {
    pub step_index: i64,
    pub reps: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CoachIntervalScoreInput {
    pub user_id: UserId,
    pub step_index: i64,
    pub reps: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IntervalFinalInput {
    pub member_id: UserId,
    pub total_reps: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct AmrapTotalInput {
    pub user_id: UserId,
    pub total_reps: i64,
}

/// A null `finish_seconds` clears the finish.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ForTimeFinishInput {
    pub user_id: UserId,
    #[serde(default)]
    pub finish_seconds: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct NoteInput {
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmitScoreInput {
    pub class_id: ClassId,
    pub scores: Vec<ScoreEntryInput>,
}

/// A member submitting for themselves may omit `member_id`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ScoreEntryInput {
    #[serde(default)]
    pub member_id: Option<UserId>,
    #[serde(default)]
    pub time_seconds: Option<i64>,
    #[serde(default)]
    pub total_reps: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema, IntoParams)]
pub struct EventFilter {
    pub class_id: Option<ClassId>,
    pub after: Option<i64>,
    pub limit: Option<u32>,
}
