use crate::types::enums::{SessionStatus, WorkoutType};
use crate::types::ids::{ClassId, UserId, WorkoutId};
use crate::types::workout::WorkoutPlan;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored session row. A class without a row has not been started.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassSession {
    pub class_id: ClassId,
    pub workout_id: WorkoutId,
    pub workout_type: WorkoutType,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub paused_at: Option<DateTime<Utc>>,
    pub paused_duration_seconds: i64,
    pub ended_at: Option<DateTime<Utc>>,
    pub time_cap_seconds: Option<i64>,
    /// Plan snapshot taken at start; later workout edits do not reach a running class.
    pub plan: WorkoutPlan,
    pub coach_note: Option<String>,
    pub started_by: Option<UserId>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct SessionView {
    pub class_id: ClassId,
    pub workout_id: WorkoutId,
    pub workout_type: WorkoutType,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub paused_at: Option<DateTime<Utc>>,
    pub ended_at: Option<DateTime<Utc>>,
    pub paused_duration_seconds: i64,
    pub elapsed_seconds: i64,
    pub time_cap_seconds: Option<i64>,
    pub remaining_seconds: Option<i64>,
    pub time_cap_reached: bool,
    pub step_count: usize,
    pub coach_note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CoachNote {
    pub class_id: ClassId,
    pub note: Option<String>,
}
