use crate::error::WodboardError;
use crate::types::class::ClassInfo;
use crate::types::ids::{ClassId, UserId};

pub trait ClassRepository {
    fn get(&self, id: ClassId) -> Result<Option<ClassInfo>, WodboardError>;
    fn upsert(&self, class: &ClassInfo) -> Result<(), WodboardError>;
    fn add_booking(&self, class_id: ClassId, member_id: UserId) -> Result<(), WodboardError>;
    fn is_booked(&self, class_id: ClassId, member_id: UserId) -> Result<bool, WodboardError>;
    /// Most recently started running or paused class coached by `coach_id`.
    fn live_for_coach(&self, coach_id: UserId) -> Result<Option<ClassInfo>, WodboardError>;
    /// Most recently started running or paused class `member_id` is booked into.
    fn live_for_member(&self, member_id: UserId) -> Result<Option<ClassInfo>, WodboardError>;
}
