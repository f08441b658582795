use crate::util::{DbError, narrow, storage};
use rusqlite::{Connection, OptionalExtension, Row, params};
use wb_core::WodboardError;
use wb_core::classes::ClassRepository;
use wb_core::types::class::ClassInfo;
use wb_core::types::ids::{ClassId, UserId, WorkoutId};

const CLASS_COLUMNS: &str = "c.id, c.name, c.workout_id, c.coach_id, c.duration_minutes";

pub struct ClassRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> ClassRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn first_live(&self, filter: &str, user_id: UserId) -> Result<Option<ClassInfo>, WodboardError> {
        let sql = format!(
            "SELECT {CLASS_COLUMNS} FROM classes c
             JOIN class_sessions s ON s.class_id = c.id
             WHERE {filter} AND s.status IN ('running', 'paused')
             ORDER BY s.started_at DESC, c.id DESC LIMIT 1"
        );
        let mut stmt = self.conn.prepare(&sql).map_err(storage)?;
        let mut rows = stmt.query([user_id.get()]).map_err(storage)?;
        let Some(row) = rows.next().map_err(storage)? else {
            return Ok(None);
        };
        map_class_row(row).map(Some)
    }
}

impl ClassRepository for ClassRepo<'_> {
    fn get(&self, id: ClassId) -> Result<Option<ClassInfo>, WodboardError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CLASS_COLUMNS} FROM classes c WHERE c.id = ?1"))
            .map_err(storage)?;
        let mut rows = stmt.query([id.get()]).map_err(storage)?;
        let Some(row) = rows.next().map_err(storage)? else {
            return Ok(None);
        };
        map_class_row(row).map(Some)
    }

    fn upsert(&self, class: &ClassInfo) -> Result<(), WodboardError> {
        self.conn
            .execute(
                "INSERT INTO classes (id, name, workout_id, coach_id, duration_minutes) VALUES (?1, ?2, ?3, ?4, ?5)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name, workout_id = excluded.workout_id,
                 coach_id = excluded.coach_id, duration_minutes = excluded.duration_minutes",
                params![
                    class.id.get(),
                    class.name,
                    class.workout_id.map(WorkoutId::get),
                    class.coach_id.map(UserId::get),
                    class.duration_minutes,
                ],
            )
            .map_err(storage)?;
        Ok(())
    }

    fn add_booking(&self, class_id: ClassId, member_id: UserId) -> Result<(), WodboardError> {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO class_bookings (class_id, member_id) VALUES (?1, ?2)",
                [class_id.get(), member_id.get()],
            )
            .map_err(storage)?;
        Ok(())
    }

    fn is_booked(&self, class_id: ClassId, member_id: UserId) -> Result<bool, WodboardError> {
        self.conn
            .query_row(
                "SELECT 1 FROM class_bookings WHERE class_id = ?1 AND member_id = ?2",
                [class_id.get(), member_id.get()],
                |_| Ok(()),
            )
            .optional()
            .map(|found| found.is_some())
            .map_err(storage)
    }

    fn live_for_coach(&self, coach_id: UserId) -> Result<Option<ClassInfo>, WodboardError> {
        self.first_live("c.coach_id = ?1", coach_id)
    }

    fn live_for_member(&self, member_id: UserId) -> Result<Option<ClassInfo>, WodboardError> {
        self.first_live(
            "EXISTS (SELECT 1 FROM class_bookings b WHERE b.class_id = c.id AND b.member_id = ?1)",
            member_id,
        )
    }
}

fn map_class_row(row: &Row<'_>) -> Result<ClassInfo, WodboardError> {
    let id: i64 = row.get(0).map_err(storage)?;
    let workout_id: Option<i64> = row.get(2).map_err(storage)?;
    let coach_id: Option<i64> = row.get(3).map_err(storage)?;
    let duration: Option<i64> = row.get(4).map_err(storage)?;
    Ok(ClassInfo {
        id: ClassId::new(id).map_err(DbError::from)?,
        name: row.get(1).map_err(storage)?,
        workout_id: workout_id
            .map(WorkoutId::new)
            .transpose()
            .map_err(DbError::from)?,
        coach_id: coach_id
            .map(UserId::new)
            .transpose()
            .map_err(DbError::from)?,
        duration_minutes: duration
            .map(|minutes| narrow(minutes, "duration_minutes"))
            .transpose()?,
    })
}
