use crate::error::WodboardError;
use crate::types::ids::{ClassId, UserId};
use crate::types::progress::{IntervalScore, LiveProgress};

pub trait ProgressRepository {
    fn get(&self, class_id: ClassId, user_id: UserId)
    -> Result<Option<LiveProgress>, WodboardError>;
    fn upsert(&self, progress: &LiveProgress) -> Result<(), WodboardError>;
    fn list(&self, class_id: ClassId) -> Result<Vec<LiveProgress>, WodboardError>;
    fn clear(&self, class_id: ClassId) -> Result<usize, WodboardError>;
}

pub trait IntervalScoreRepository {
    fn upsert(&self, score: &IntervalScore) -> Result<(), WodboardError>;
    fn list(&self, class_id: ClassId) -> Result<Vec<IntervalScore>, WodboardError>;
    fn list_for_user(
        &self,
        class_id: ClassId,
        user_id: UserId,
    ) -> Result<Vec<IntervalScore>, WodboardError>;
    fn clear(&self, class_id: ClassId) -> Result<usize, WodboardError>;
}
