use crate::error::WodboardError;
use crate::types::ids::ClassId;
use crate::types::session::ClassSession;

pub trait SessionRepository {
    fn get(&self, class_id: ClassId) -> Result<Option<ClassSession>, WodboardError>;
    /// Writes a fresh session row. Without `restart` an existing live row is
    /// left alone and `false` is returned.
    fn start(&self, session: &ClassSession, restart: bool) -> Result<bool, WodboardError>;
    fn save(&self, session: &ClassSession) -> Result<(), WodboardError>;
}
