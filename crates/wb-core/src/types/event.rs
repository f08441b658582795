use crate::types::enums::{Direction, WorkoutType};
use crate::types::ids::{ClassId, UserId, WorkoutId};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "type", content = "payload")]
pub enum EventBody {
    SessionStarted {
        class_id: ClassId,
        workout_id: WorkoutId,
        workout_type: WorkoutType,
        restart: bool,
        time_cap_seconds: Option<i64>,
    },
    SessionPaused {
        class_id: ClassId,
    },
    SessionResumed {
        class_id: ClassId,
        paused_duration_seconds: i64,
    },
    SessionEnded {
        class_id: ClassId,
        elapsed_seconds: i64,
    },
    NoteUpdated {
        class_id: ClassId,
    },

    ProgressAdvanced {
        class_id: ClassId,
        user_id: UserId,
        direction: Direction,
        current_step_index: usize,
        rounds_completed: u32,
        finished: bool,
    },
    PartialSubmitted {
        class_id: ClassId,
        user_id: UserId,
        reps: i64,
    },
    IntervalScoreSubmitted {
        class_id: ClassId,
        user_id: UserId,
        step_index: usize,
        reps: i64,
    },
    AmrapTotalSet {
        class_id: ClassId,
        user_id: UserId,
        total_reps: i64,
    },
    ForTimeFinishSet {
        class_id: ClassId,
        user_id: UserId,
        finish_seconds: Option<i64>,
    },

    ClassFinalized {
        class_id: ClassId,
        entries: usize,
        changed: usize,
    },
    IntervalFinalEdited {
        class_id: ClassId,
        member_id: UserId,
        total_reps: i64,
    },
    ScoresSubmitted {
        class_id: ClassId,
        member_ids: Vec<UserId>,
    },

    FixturesImported {
        workouts: usize,
        classes: usize,
    },
}

impl EventBody {
    /// Class scope used to filter per-class streams.
    pub fn class_id(&self) -> Option<ClassId> {
        match self {
            Self::SessionStarted { class_id, .. }
            | Self::SessionPaused { class_id }
            | Self::SessionResumed { class_id, .. }
            | Self::SessionEnded { class_id, .. }
            | Self::NoteUpdated { class_id }
            | Self::ProgressAdvanced { class_id, .. }
            | Self::PartialSubmitted { class_id, .. }
            | Self::IntervalScoreSubmitted { class_id, .. }
            | Self::AmrapTotalSet { class_id, .. }
            | Self::ForTimeFinishSet { class_id, .. }
            | Self::ClassFinalized { class_id, .. }
            | Self::IntervalFinalEdited { class_id, .. }
            | Self::ScoresSubmitted { class_id, .. } => Some(*class_id),
            Self::FixturesImported { .. } => None,
        }
    }
}
