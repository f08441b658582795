use crate::types::enums::WorkoutType;
use crate::types::ids::{ClassId, UserId};
use crate::types::leaderboard::IntervalStepScore;
use crate::types::workout::Step;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LiveProgress {
    pub class_id: ClassId,
    pub user_id: UserId,
    pub current_step_index: usize,
    pub rounds_completed: u32,
    pub finished_at: Option<DateTime<Utc>>,
    /// Session elapsed time at the moment of finishing, pauses excluded.
    pub finish_elapsed_seconds: Option<i64>,
    pub dnf_partial_reps: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

impl LiveProgress {
    pub fn fresh(class_id: ClassId, user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            class_id,
            user_id,
            current_step_index: 0,
            rounds_completed: 0,
            finished_at: None,
            finish_elapsed_seconds: None,
            dnf_partial_reps: None,
            updated_at: now,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IntervalScore {
    pub class_id: ClassId,
    pub user_id: UserId,
    pub step_index: usize,
    pub reps: i64,
    pub updated_at: DateTime<Utc>,
}

/// A member's own view of where they are in the workout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct MyProgress {
    pub class_id: ClassId,
    pub user_id: UserId,
    pub workout_type: WorkoutType,
    pub current_step_index: usize,
    pub rounds_completed: u32,
    pub finished: bool,
    pub finished_at: Option<DateTime<Utc>>,
    pub finish_elapsed_seconds: Option<i64>,
    pub dnf_partial_reps: Option<i64>,
    pub reps_equivalent: i64,
    pub step_count: usize,
    pub current_step: Option<Step>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interval_steps: Vec<IntervalStepScore>,
    pub updated_at: Option<DateTime<Utc>>,
}
