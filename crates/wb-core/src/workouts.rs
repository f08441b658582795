use crate::error::WodboardError;
use crate::types::ids::WorkoutId;
use crate::types::workout::Workout;

pub trait WorkoutRepository {
    fn get(&self, id: WorkoutId) -> Result<Option<Workout>, WodboardError>;
    /// Replaces the workout and its whole exercise tree.
    fn upsert(&self, workout: &Workout) -> Result<(), WodboardError>;
    fn is_referenced(&self, id: WorkoutId) -> Result<bool, WodboardError>;
}
