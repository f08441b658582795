use crate::util::{DbError, from_rfc3339, storage, to_rfc3339};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use wb_core::WodboardError;
use wb_core::attendance::AttendanceRepository;
use wb_core::types::attendance::{ClassAttendance, FinalScore};
use wb_core::types::ids::{ClassId, UserId};

pub struct AttendanceRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> AttendanceRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn get(&self, class_id: ClassId, member_id: UserId) -> Result<ClassAttendance, WodboardError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT class_id, member_id, final_time_seconds, final_total_reps, updated_at
                 FROM class_attendance WHERE class_id = ?1 AND member_id = ?2",
            )
            .map_err(storage)?;
        let mut rows = stmt
            .query([class_id.get(), member_id.get()])
            .map_err(storage)?;
        let Some(row) = rows.next().map_err(storage)? else {
            return Err(WodboardError::internal(format!(
                "attendance row for class {class_id} member {member_id} vanished"
            )));
        };
        map_attendance_row(row)
    }
}

impl AttendanceRepository for AttendanceRepo<'_> {
    fn merge(
        &self,
        class_id: ClassId,
        score: &FinalScore,
        now: DateTime<Utc>,
    ) -> Result<(ClassAttendance, bool), WodboardError> {
        // Null inputs keep the stored value, and an update that would not
        // move either value is skipped so `updated_at` stays put.
        let changed = self
            .conn
            .execute(
                "INSERT INTO class_attendance (class_id, member_id, final_time_seconds, final_total_reps, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(class_id, member_id) DO UPDATE SET
                    final_time_seconds = COALESCE(excluded.final_time_seconds, class_attendance.final_time_seconds),
                    final_total_reps = COALESCE(excluded.final_total_reps, class_attendance.final_total_reps),
                    updated_at = excluded.updated_at
                 WHERE COALESCE(excluded.final_time_seconds, class_attendance.final_time_seconds)
                         IS NOT class_attendance.final_time_seconds
                    OR COALESCE(excluded.final_total_reps, class_attendance.final_total_reps)
                         IS NOT class_attendance.final_total_reps",
                params![
                    class_id.get(),
                    score.member_id.get(),
                    score.final_time_seconds,
                    score.final_total_reps,
                    to_rfc3339(&now),
                ],
            )
            .map_err(storage)?;
        Ok((self.get(class_id, score.member_id)?, changed > 0))
    }

    fn overwrite_total_reps(
        &self,
        class_id: ClassId,
        member_id: UserId,
        total_reps: i64,
        now: DateTime<Utc>,
    ) -> Result<ClassAttendance, WodboardError> {
        self.conn
            .execute(
                "INSERT INTO class_attendance (class_id, member_id, final_time_seconds, final_total_reps, updated_at)
                 VALUES (?1, ?2, NULL, ?3, ?4)
                 ON CONFLICT(class_id, member_id) DO UPDATE SET
                    final_total_reps = excluded.final_total_reps,
                    updated_at = excluded.updated_at
                 WHERE class_attendance.final_total_reps IS NOT excluded.final_total_reps",
                params![class_id.get(), member_id.get(), total_reps, to_rfc3339(&now)],
            )
            .map_err(storage)?;
        self.get(class_id, member_id)
    }

    fn list(&self, class_id: ClassId) -> Result<Vec<ClassAttendance>, WodboardError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT class_id, member_id, final_time_seconds, final_total_reps, updated_at
                 FROM class_attendance WHERE class_id = ?1 ORDER BY member_id",
            )
            .map_err(storage)?;
        let mut rows = stmt.query([class_id.get()]).map_err(storage)?;
        let mut out = Vec::new();
        while let Some(row) = rows.next().map_err(storage)? {
            out.push(map_attendance_row(row)?);
        }
        Ok(out)
    }

    fn clear(&self, class_id: ClassId) -> Result<usize, WodboardError> {
        self.conn
            .execute(
                "DELETE FROM class_attendance WHERE class_id = ?1",
                [class_id.get()],
            )
            .map_err(storage)
    }
}

fn map_attendance_row(row: &Row<'_>) -> Result<ClassAttendance, WodboardError> {
    let class_id: i64 = row.get(0).map_err(storage)?;
    let member_id: i64 = row.get(1).map_err(storage)?;
    let updated_at: String = row.get(4).map_err(storage)?;
    Ok(ClassAttendance {
        class_id: ClassId::new(class_id).map_err(DbError::from)?,
        member_id: UserId::new(member_id).map_err(DbError::from)?,
        final_time_seconds: row.get(2).map_err(storage)?,
        final_total_reps: row.get(3).map_err(storage)?,
        updated_at: from_rfc3339(&updated_at)?,
    })
}
