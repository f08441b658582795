use crate::util::{decode_enum, decode_json, encode_enum, encode_json, from_rfc3339, storage, to_rfc3339};
use rusqlite::{Connection, Row, params_from_iter};
use ulid::Ulid;
use wb_core::WodboardError;
use wb_core::events::EventRepository;
use wb_core::types::io::EventFilter;
use wb_events::types::EventRecord;

const DEFAULT_LIMIT: u32 = 200;
const MAX_LIMIT: u32 = 1_000;

pub struct EventRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> EventRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl EventRepository for EventRepo<'_> {
    fn append(&self, mut event: EventRecord) -> Result<EventRecord, WodboardError> {
        event.seq = next_seq(self.conn)?;
        event.id = format!("evt_{}", Ulid::new());
        self.conn
            .execute(
                "INSERT INTO events (id, seq, at, class_id, correlation_id, source, body_json) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![
                    event.id,
                    event.seq,
                    to_rfc3339(&event.at),
                    event.class_id,
                    event.correlation_id,
                    encode_enum(&event.source)?,
                    encode_json(&event.body)?,
                ],
            )
            .map_err(storage)?;
        Ok(event)
    }

    fn list(&self, filter: &EventFilter) -> Result<Vec<EventRecord>, WodboardError> {
        let mut sql =
            "SELECT id, seq, at, class_id, correlation_id, source, body_json FROM events WHERE 1 = 1"
                .to_string();
        let mut args: Vec<i64> = Vec::new();
        if let Some(class_id) = filter.class_id {
            args.push(class_id.get());
            sql.push_str(&format!(" AND class_id = ?{}", args.len()));
        }
        if let Some(after) = filter.after {
            args.push(after);
            sql.push_str(&format!(" AND seq > ?{}", args.len()));
        }
        args.push(i64::from(filter.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)));
        sql.push_str(&format!(" ORDER BY seq ASC LIMIT ?{}", args.len()));

        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt.query(params_from_iter(args.iter())).map_err(storage)?;
        let mut events = Vec::new();
        while let Some(row) = rows.next().map_err(storage)? {
            events.push(map_event_row(row)?);
        }
        Ok(events)
    }
}

fn map_event_row(row: &Row<'_>) -> Result<EventRecord, WodboardError> {
    let at: String = row.get(2).map_err(storage)?;
    let source: String = row.get(5).map_err(storage)?;
    let body_json: String = row.get(6).map_err(storage)?;
    Ok(EventRecord {
        id: row.get(0).map_err(storage)?,
        seq: row.get(1).map_err(storage)?,
        at: from_rfc3339(&at)?,
        class_id: row.get(3).map_err(storage)?,
        correlation_id: row.get(4).map_err(storage)?,
        source: decode_enum(&source)?,
        body: decode_json(&body_json)?,
    })
}

fn next_seq(conn: &Connection) -> Result<i64, WodboardError> {
    let seq: i64 = conn
        .query_row("SELECT COALESCE(MAX(seq), 0) FROM events", [], |row| row.get(0))
        .map_err(storage)?;
    Ok(seq + 1)
}
