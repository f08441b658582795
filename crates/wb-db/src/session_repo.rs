use crate::util::{
    DbError, decode_enum, decode_json, encode_enum, encode_json, from_rfc3339, opt_from_rfc3339,
    storage, to_rfc3339,
};
use rusqlite::{Connection, Row, params};
use wb_core::WodboardError;
use wb_core::sessions::SessionRepository;
use wb_core::types::ids::{ClassId, UserId, WorkoutId};
use wb_core::types::session::ClassSession;
use wb_core::types::workout::WorkoutPlan;

const SESSION_COLUMNS: &str = "class_id, workout_id, workout_type, status, started_at, paused_at, paused_duration_seconds, ended_at, time_cap_seconds, steps_json, cum_reps_json, coach_note, started_by, updated_at";

pub struct SessionRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> SessionRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }
}

impl SessionRepository for SessionRepo<'_> {
    fn get(&self, class_id: ClassId) -> Result<Option<ClassSession>, WodboardError> {
        let mut stmt = self
            .conn
            .prepare(&format!(
                "SELECT {SESSION_COLUMNS} FROM class_sessions WHERE class_id = ?1"
            ))
            .map_err(storage)?;
        let mut rows = stmt.query([class_id.get()]).map_err(storage)?;
        let Some(row) = rows.next().map_err(storage)? else {
            return Ok(None);
        };
        map_session_row(row).map(Some)
    }

    fn start(&self, session: &ClassSession, restart: bool) -> Result<bool, WodboardError> {
        // The WHERE clause makes a concurrent second start a no-op instead of a reset.
        let sql = format!(
            "INSERT INTO class_sessions ({SESSION_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)
             ON CONFLICT(class_id) DO UPDATE SET
                workout_id = excluded.workout_id,
                workout_type = excluded.workout_type,
                status = excluded.status,
                started_at = excluded.started_at,
                paused_at = excluded.paused_at,
                paused_duration_seconds = excluded.paused_duration_seconds,
                ended_at = excluded.ended_at,
                time_cap_seconds = excluded.time_cap_seconds,
                steps_json = excluded.steps_json,
                cum_reps_json = excluded.cum_reps_json,
                coach_note = excluded.coach_note,
                started_by = excluded.started_by,
                updated_at = excluded.updated_at
             WHERE ?15 OR class_sessions.status = 'ended'"
        );
        let changed = self
            .conn
            .execute(
                &sql,
                params![
                    session.class_id.get(),
                    session.workout_id.get(),
                    encode_enum(&session.workout_type)?,
                    encode_enum(&session.status)?,
                    to_rfc3339(&session.started_at),
                    session.paused_at.as_ref().map(to_rfc3339),
                    session.paused_duration_seconds,
                    session.ended_at.as_ref().map(to_rfc3339),
                    session.time_cap_seconds,
                    encode_json(&session.plan.steps)?,
                    encode_json(&session.plan.cum_reps)?,
                    session.coach_note,
                    session.started_by.map(UserId::get),
                    to_rfc3339(&session.updated_at),
                    restart,
                ],
            )
            .map_err(storage)?;
        Ok(changed == 1)
    }

    fn save(&self, session: &ClassSession) -> Result<(), WodboardError> {
        self.conn
            .execute(
                "UPDATE class_sessions SET status = ?1, paused_at = ?2, paused_duration_seconds = ?3,
                 ended_at = ?4, coach_note = ?5, updated_at = ?6 WHERE class_id = ?7",
                params![
                    encode_enum(&session.status)?,
                    session.paused_at.as_ref().map(to_rfc3339),
                    session.paused_duration_seconds,
                    session.ended_at.as_ref().map(to_rfc3339),
                    session.coach_note,
                    to_rfc3339(&session.updated_at),
                    session.class_id.get(),
                ],
            )
            .map_err(storage)?;
        Ok(())
    }
}

fn map_session_row(row: &Row<'_>) -> Result<ClassSession, WodboardError> {
    let class_id: i64 = row.get(0).map_err(storage)?;
    let workout_id: i64 = row.get(1).map_err(storage)?;
    let workout_type: String = row.get(2).map_err(storage)?;
    let status: String = row.get(3).map_err(storage)?;
    let started_at: String = row.get(4).map_err(storage)?;
    let paused_at: Option<String> = row.get(5).map_err(storage)?;
    let ended_at: Option<String> = row.get(7).map_err(storage)?;
    let steps_json: String = row.get(9).map_err(storage)?;
    let cum_reps_json: String = row.get(10).map_err(storage)?;
    let started_by: Option<i64> = row.get(12).map_err(storage)?;
    let updated_at: String = row.get(13).map_err(storage)?;

    Ok(ClassSession {
        class_id: ClassId::new(class_id).map_err(DbError::from)?,
        workout_id: WorkoutId::new(workout_id).map_err(DbError::from)?,
        workout_type: decode_enum(&workout_type)?,
        status: decode_enum(&status)?,
        started_at: from_rfc3339(&started_at)?,
        paused_at: opt_from_rfc3339(paused_at)?,
        paused_duration_seconds: row.get(6).map_err(storage)?,
        ended_at: opt_from_rfc3339(ended_at)?,
        time_cap_seconds: row.get(8).map_err(storage)?,
        plan: WorkoutPlan {
            steps: decode_json(&steps_json)?,
            cum_reps: decode_json(&cum_reps_json)?,
        },
        coach_note: row.get(11).map_err(storage)?,
        started_by: started_by
            .map(UserId::new)
            .transpose()
            .map_err(DbError::from)?,
        updated_at: from_rfc3339(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::with_test_db;
    use chrono::{TimeZone, Utc};
    use wb_core::types::enums::{SessionStatus, WorkoutType};

    fn session(status: SessionStatus) -> ClassSession {
        let t = Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap();
        ClassSession {
            class_id: ClassId::new(11).unwrap(),
            workout_id: WorkoutId::new(2).unwrap(),
            workout_type: WorkoutType::ForTime,
            status,
            started_at: t,
            paused_at: None,
            paused_duration_seconds: 0,
            ended_at: None,
            time_cap_seconds: Some(600),
            plan: WorkoutPlan {
                steps: Vec::new(),
                cum_reps: vec![0],
            },
            coach_note: None,
            started_by: Some(UserId::new(5).unwrap()),
            updated_at: t,
        }
    }

    #[test]
    fn second_start_without_restart_touches_nothing() {
        let conn = with_test_db().unwrap();
        let repo = SessionRepo::new(&conn);
        let first = session(SessionStatus::Running);
        assert!(repo.start(&first, false).unwrap());

        let mut second = first.clone();
        second.time_cap_seconds = None;
        assert!(!repo.start(&second, false).unwrap());
        assert_eq!(repo.get(first.class_id).unwrap(), Some(first.clone()));

        assert!(repo.start(&second, true).unwrap());
        assert_eq!(repo.get(first.class_id).unwrap(), Some(second));
    }

    #[test]
    fn ended_rows_may_be_replaced() {
        let conn = with_test_db().unwrap();
        let repo = SessionRepo::new(&conn);
        let ended = session(SessionStatus::Ended);
        assert!(repo.start(&ended, false).unwrap());
        assert!(repo.start(&session(SessionStatus::Running), false).unwrap());
    }

    #[test]
    fn save_persists_lifecycle_fields() {
        let conn = with_test_db().unwrap();
        let repo = SessionRepo::new(&conn);
        let mut s = session(SessionStatus::Running);
        repo.start(&s, false).unwrap();
        s.status = SessionStatus::Paused;
        s.paused_at = Some(s.started_at + chrono::Duration::seconds(30));
        s.coach_note = Some("scale to 65 lb".to_string());
        repo.save(&s).unwrap();
        assert_eq!(repo.get(s.class_id).unwrap(), Some(s));
    }
}
