use crate::types::enums::WorkoutType;
use crate::types::ids::{ClassId, UserId};
use crate::types::session::SessionView;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Final per-member result. Source of truth once written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassAttendance {
    pub class_id: ClassId,
    pub member_id: UserId,
    pub final_time_seconds: Option<i64>,
    pub final_total_reps: Option<i64>,
    pub updated_at: DateTime<Utc>,
}

/// One value to merge into attendance; `None` fields keep what is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinalScore {
    pub member_id: UserId,
    pub final_time_seconds: Option<i64>,
    pub final_total_reps: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FinalizationReport {
    pub class_id: ClassId,
    pub workout_type: WorkoutType,
    pub entries: usize,
    /// Rows inserted or whose stored values moved.
    pub changed: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FinalizationStatus {
    Completed {
        entries: usize,
        changed: usize,
    },
    Failed {
        error: String,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct StopOutcome {
    pub session: SessionView,
    pub finalization: FinalizationStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SubmitScoreOutcome {
    pub class_id: ClassId,
    pub updated: Vec<ClassAttendance>,
}
