use crate::error::WodboardError;
use crate::types::io::EventFilter;
use wb_events::types::EventRecord;

pub trait EventRepository {
    fn append(&self, event: EventRecord) -> Result<EventRecord, WodboardError>;
    fn list(&self, filter: &EventFilter) -> Result<Vec<EventRecord>, WodboardError>;
}
