use crate::error::WodboardError;
use crate::types::attendance::{ClassAttendance, FinalScore};
use crate::types::ids::{ClassId, UserId};
use chrono::{DateTime, Utc};

pub trait AttendanceRepository {
    /// Merges non-null fields into the member's row. Returns the stored row
    /// and whether it was inserted or any value moved.
    fn merge(
        &self,
        class_id: ClassId,
        score: &FinalScore,
        now: DateTime<Utc>,
    ) -> Result<(ClassAttendance, bool), WodboardError>;
    fn overwrite_total_reps(
        &self,
        class_id: ClassId,
        member_id: UserId,
        total_reps: i64,
        now: DateTime<Utc>,
    ) -> Result<ClassAttendance, WodboardError>;
    fn list(&self, class_id: ClassId) -> Result<Vec<ClassAttendance>, WodboardError>;
    fn clear(&self, class_id: ClassId) -> Result<usize, WodboardError>;
}
