use crate::types::ids::{ClassId, UserId, WorkoutId};
use crate::types::session::SessionView;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Scheduled class as seen by the live core. Maintained by the scheduling side.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassInfo {
    pub id: ClassId,
    pub name: String,
    pub workout_id: Option<WorkoutId>,
    pub coach_id: Option<UserId>,
    pub duration_minutes: Option<u32>,
}

/// A class plus its bookings, as imported from fixtures.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ClassSeed {
    pub class: ClassInfo,
    pub members: Vec<UserId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct ImportSummary {
    pub workouts: usize,
    pub workouts_unchanged: usize,
    pub classes: usize,
    pub bookings: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct CurrentClass {
    pub ongoing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<ClassInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<SessionView>,
}

impl CurrentClass {
    pub fn none() -> Self {
        Self {
            ongoing: false,
            class: None,
            session: None,
        }
    }
}
