use crate::util::{DbError, from_rfc3339, narrow, opt_from_rfc3339, storage, to_rfc3339, widen};
use rusqlite::{Connection, Row, params};
use wb_core::WodboardError;
use wb_core::progress::{IntervalScoreRepository, ProgressRepository};
use wb_core::types::ids::{ClassId, UserId};
use wb_core::types::progress::{IntervalScore, LiveProgress};

const PROGRESS_COLUMNS: &str = "class_id, user_id, current_step_index, rounds_completed, finished_at, finish_elapsed_seconds, dnf_partial_reps, updated_at";
const INTERVAL_COLUMNS: &str = "class_id, user_id, step_index, reps, updated_at";

/// Per-member live rows: the step pointer and the interval score sheet.
pub struct ProgressRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> ProgressRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn query_progress(&self, sql: &str, args: &[i64]) -> Result<Vec<LiveProgress>, WodboardError> {
        let mut stmt = self.conn.prepare(sql).map_err(storage)?;
        let mut rows = stmt
            .query(rusqlite::params_from_iter(args.iter()))
            .map_err(storage)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(storage)? {
            out.push(map_progress_row(row)?);
        }
        Ok(out)
    }

    fn query_intervals(&self, sql: &str, args: &[i64]) -> Result<Vec<IntervalScore>, WodboardError> {
        let mut stmt = self.conn.prepare(sql).map_err(storage)?;
        let mut rows = stmt
            .query(rusqlite::params_from_iter(args.iter()))
            .map_err(storage)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(storage)? {
            out.push(map_interval_row(row)?);
        }
        Ok(out)
    }
}

impl ProgressRepository for ProgressRepo<'_> {
    fn get(
        &self,
        class_id: ClassId,
        user_id: UserId,
    ) -> Result<Option<LiveProgress>, WodboardError> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM live_progress WHERE class_id = ?1 AND user_id = ?2"
        );
        Ok(self
            .query_progress(&sql, &[class_id.get(), user_id.get()])?
            .into_iter()
            .next())
    }

    fn upsert(&self, progress: &LiveProgress) -> Result<(), WodboardError> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO live_progress ({PROGRESS_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                     ON CONFLICT(class_id, user_id) DO UPDATE SET
                        current_step_index = excluded.current_step_index,
                        rounds_completed = excluded.rounds_completed,
                        finished_at = excluded.finished_at,
                        finish_elapsed_seconds = excluded.finish_elapsed_seconds,
                        dnf_partial_reps = excluded.dnf_partial_reps,
                        updated_at = excluded.updated_at"
                ),
                params![
                    progress.class_id.get(),
                    progress.user_id.get(),
                    widen(progress.current_step_index)?,
                    progress.rounds_completed,
                    progress.finished_at.as_ref().map(to_rfc3339),
                    progress.finish_elapsed_seconds,
                    progress.dnf_partial_reps,
                    to_rfc3339(&progress.updated_at),
                ],
            )
            .map_err(storage)?;
        Ok(())
    }

    fn list(&self, class_id: ClassId) -> Result<Vec<LiveProgress>, WodboardError> {
        let sql = format!(
            "SELECT {PROGRESS_COLUMNS} FROM live_progress WHERE class_id = ?1 ORDER BY user_id"
        );
        self.query_progress(&sql, &[class_id.get()])
    }

    fn clear(&self, class_id: ClassId) -> Result<usize, WodboardError> {
        self.conn
            .execute("DELETE FROM live_progress WHERE class_id = ?1", [class_id.get()])
            .map_err(storage)
    }
}

impl IntervalScoreRepository for ProgressRepo<'_> {
    fn upsert(&self, score: &IntervalScore) -> Result<(), WodboardError> {
        self.conn
            .execute(
                &format!(
                    "INSERT INTO live_interval_scores ({INTERVAL_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5)
                     ON CONFLICT(class_id, user_id, step_index) DO UPDATE SET
                        reps = excluded.reps, updated_at = excluded.updated_at"
                ),
                params![
                    score.class_id.get(),
                    score.user_id.get(),
                    widen(score.step_index)?,
                    score.reps,
                    to_rfc3339(&score.updated_at),
                ],
            )
            .map_err(storage)?;
        Ok(())
    }

    fn list(&self, class_id: ClassId) -> Result<Vec<IntervalScore>, WodboardError> {
        let sql = format!(
            "SELECT {INTERVAL_COLUMNS} FROM live_interval_scores WHERE class_id = ?1 ORDER BY user_id, step_index"
        );
        self.query_intervals(&sql, &[class_id.get()])
    }

    fn list_for_user(
        &self,
        class_id: ClassId,
        user_id: UserId,
    ) -> Result<Vec<IntervalScore>, WodboardError> {
        let sql = format!(
            "SELECT {INTERVAL_COLUMNS} FROM live_interval_scores WHERE class_id = ?1 AND user_id = ?2 ORDER BY step_index"
        );
        self.query_intervals(&sql, &[class_id.get(), user_id.get()])
    }

    fn clear(&self, class_id: ClassId) -> Result<usize, WodboardError> {
        self.conn
            .execute(
                "DELETE FROM live_interval_scores WHERE class_id = ?1",
                [class_id.get()],
            )
            .map_err(storage)
    }
}

fn map_progress_row(row: &Row<'_>) -> Result<LiveProgress, WodboardError> {
    let class_id: i64 = row.get(0).map_err(storage)?;
    let user_id: i64 = row.get(1).map_err(storage)?;
    let step: i64 = row.get(2).map_err(storage)?;
    let rounds: i64 = row.get(3).map_err(storage)?;
    let finished_at: Option<String> = row.get(4).map_err(storage)?;
    let updated_at: String = row.get(7).map_err(storage)?;
    Ok(LiveProgress {
        class_id: ClassId::new(class_id).map_err(DbError::from)?,
        user_id: UserId::new(user_id).map_err(DbError::from)?,
        current_step_index: narrow(step, "current_step_index")?,
        rounds_completed: narrow(rounds, "rounds_completed")?,
        finished_at: opt_from_rfc3339(finished_at)?,
        finish_elapsed_seconds: row.get(5).map_err(storage)?,
        dnf_partial_reps: row.get(6).map_err(storage)?,
        updated_at: from_rfc3339(&updated_at)?,
    })
}

fn map_interval_row(row: &Row<'_>) -> Result<IntervalScore, WodboardError> {
    let class_id: i64 = row.get(0).map_err(storage)?;
    let user_id: i64 = row.get(1).map_err(storage)?;
    let step: i64 = row.get(2).map_err(storage)?;
    let updated_at: String = row.get(4).map_err(storage)?;
    Ok(IntervalScore {
        class_id: ClassId::new(class_id).map_err(DbError::from)?,
        user_id: UserId::new(user_id).map_err(DbError::from)?,
        step_index: narrow(step, "step_index")?,
        reps: row.get(3).map_err(storage)?,
        updated_at: from_rfc3339(&updated_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::with_test_db;
    use chrono::{Duration, TimeZone, Utc};

    #[test]
    fn interval_rows_upsert_per_step() {
        let conn = with_test_db().unwrap();
        let repo = ProgressRepo::new(&conn);
        let t = Utc.with_ymd_and_hms(2026, 6, 1, 17, 0, 0).unwrap();
        let class_id = ClassId::new(1).unwrap();
        let user_id = UserId::new(2).unwrap();
        let score = |step_index, reps, seconds| IntervalScore {
            class_id,
            user_id,
            step_index,
            reps,
            updated_at: t + Duration::seconds(seconds),
        };
        IntervalScoreRepository::upsert(&repo, &score(0, 10, 0)).unwrap();
        IntervalScoreRepository::upsert(&repo, &score(1, 8, 5)).unwrap();
        IntervalScoreRepository::upsert(&repo, &score(0, 12, 9)).unwrap();
        let rows = repo.list_for_user(class_id, user_id).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].reps, 12);
        assert_eq!(IntervalScoreRepository::clear(&repo, class_id).unwrap(), 2);
    }

    #[test]
    fn progress_round_trips() {
        let conn = with_test_db().unwrap();
        let repo = ProgressRepo::new(&conn);
        let t = Utc.with_ymd_and_hms(2026, 6, 1, 17, 0, 0).unwrap();
        let mut row = LiveProgress::fresh(ClassId::new(1).unwrap(), UserId::new(3).unwrap(), t);
        ProgressRepository::upsert(&repo, &row).unwrap();
        row.current_step_index = 4;
        row.finished_at = Some(t + Duration::seconds(300));
        row.finish_elapsed_seconds = Some(290);
        ProgressRepository::upsert(&repo, &row).unwrap();
        assert_eq!(
            ProgressRepository::get(&repo, row.class_id, row.user_id).unwrap(),
            Some(row.clone())
        );
        assert_eq!(ProgressRepository::list(&repo, row.class_id).unwrap(), vec![row]);
    }
}
