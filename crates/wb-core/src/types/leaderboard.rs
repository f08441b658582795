use crate::types::enums::{LeaderboardSource, ScoringFamily, SessionStatus, WorkoutType};
use crate::types::ids::{ClassId, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct IntervalStepScore {
    pub step_index: usize,
    pub label: String,
    pub reps: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: UserId,
    pub finished: bool,
    pub elapsed_seconds: Option<i64>,
    pub total_reps: Option<i64>,
    pub display_score: String,
    pub last_update_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interval_steps: Vec<IntervalStepScore>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Leaderboard {
    pub class_id: ClassId,
    pub workout_type: WorkoutType,
    pub family: ScoringFamily,
    pub source: LeaderboardSource,
    /// `None` when the board is built from final scores without a session row.
    pub status: Option<SessionStatus>,
    pub entries: Vec<LeaderboardEntry>,
}
