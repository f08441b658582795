use crate::types::enums::{QuantityType, WorkoutType};
use crate::types::ids::WorkoutId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Workout {
    pub id: WorkoutId,
    pub name: String,
    pub workout_type: WorkoutType,
    pub metadata: WorkoutMetadata,
    pub rounds: Vec<Round>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkoutMetadata {
    /// Time cap in minutes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_limit: Option<u32>,
    /// Repeat a single-round template this many times.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_of_rounds: Option<u32>,
    /// Minutes per EMOM block, e.g. `[1, 3, 2]`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub emom_repeats: Vec<u32>,
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Round {
    pub number: u32,
    pub subrounds: Vec<Subround>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Subround {
    pub number: u32,
    pub exercises: Vec<Exercise>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Exercise {
    pub position: u32,
    pub name: String,
    pub quantity_type: QuantityType,
    /// Reps or seconds depending on `quantity_type`.
    pub quantity: u32,
    /// EMOM per-minute target.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_reps: Option<u32>,
}

/// One flattened unit of work a member moves through.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Step {
    pub index: usize,
    pub label: String,
    pub round: u32,
    pub subround: u32,
    pub quantity_type: QuantityType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_seconds: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_reps: Option<u32>,
}

/// Flattened steps plus the cumulative rep table.
///
/// `cum_reps[i]` is the number of reps required to reach step `i`, so the
/// table has one more entry than there are steps and ends with the reps of a
/// full pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct WorkoutPlan {
    pub steps: Vec<Step>,
    pub cum_reps: Vec<i64>,
}

impl WorkoutPlan {
    pub fn step_count(&self) -> usize {
        self.steps.len()
    }

    pub fn last_step_index(&self) -> Option<usize> {
        self.steps.len().checked_sub(1)
    }

    /// Reps for one complete pass through the plan.
    pub fn reps_per_pass(&self) -> i64 {
        self.cum_reps.last().copied().unwrap_or(0)
    }

    pub fn reps_to_reach(&self, step_index: usize) -> i64 {
        self.cum_reps
            .get(step_index)
            .copied()
            .unwrap_or_else(|| self.reps_per_pass())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct WorkoutSteps {
    pub workout_id: WorkoutId,
    pub workout_type: WorkoutType,
    pub steps: Vec<Step>,
    pub cum_reps: Vec<i64>,
    pub time_cap_seconds: Option<i64>,
    pub metadata: WorkoutMetadata,
}
