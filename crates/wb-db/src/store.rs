use crate::attendance_repo::AttendanceRepo;
use crate::class_repo::ClassRepo;
use crate::event_repo::EventRepo;
use crate::progress_repo::ProgressRepo;
use crate::session_repo::SessionRepo;
use crate::util::storage;
use crate::workout_repo::WorkoutRepo;
use rusqlite::Connection;
use wb_core::WodboardError;
use wb_core::store::Store;

pub struct DbStore {
    conn: Connection,
}

impl DbStore {
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }
}

impl Store for DbStore {
    type Workouts<'a>
        = WorkoutRepo<'a>
    where
        Self: 'a;
    type Classes<'a>
        = ClassRepo<'a>
    where
        Self: 'a;
    type Sessions<'a>
        = SessionRepo<'a>
    where
        Self: 'a;
    type Progress<'a>
        = ProgressRepo<'a>
    where
        Self: 'a;
    type IntervalScores<'a>
        = ProgressRepo<'a>
    where
        Self: 'a;
    type Attendance<'a>
        = AttendanceRepo<'a>
    where
        Self: 'a;
    type Events<'a>
        = EventRepo<'a>
    where
        Self: 'a;

    fn workouts(&self) -> Self::Workouts<'_> {
        WorkoutRepo::new(&self.conn)
    }

    fn classes(&self) -> Self::Classes<'_> {
        ClassRepo::new(&self.conn)
    }

    fn sessions(&self) -> Self::Sessions<'_> {
        SessionRepo::new(&self.conn)
    }

    fn progress(&self) -> Self::Progress<'_> {
        ProgressRepo::new(&self.conn)
    }

    fn interval_scores(&self) -> Self::IntervalScores<'_> {
        ProgressRepo::new(&self.conn)
    }

    fn attendance(&self) -> Self::Attendance<'_> {
        AttendanceRepo::new(&self.conn)
    }

    fn events(&self) -> Self::Events<'_> {
        EventRepo::new(&self.conn)
    }

    /// `BEGIN IMMEDIATE` takes the write lock up front, which serializes
    /// concurrent starts of the same class across connections.
    fn with_tx<F, T>(&self, f: F) -> Result<T, WodboardError>
    where
        F: FnOnce(&Self) -> Result<T, WodboardError>,
    {
        self.conn.execute_batch("BEGIN IMMEDIATE").map_err(storage)?;
        match f(self) {
            Ok(value) => {
                if let Err(err) = self.conn.execute_batch("COMMIT") {
                    let _ = self.conn.execute_batch("ROLLBACK");
                    return Err(storage(err));
                }
                Ok(value)
            }
            Err(err) => {
                self.conn.execute_batch("ROLLBACK").map_err(storage)?;
                Err(err)
            }
        }
    }
}
