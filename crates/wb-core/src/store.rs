use crate::WodboardError;
use crate::attendance::AttendanceRepository;
use crate::classes::ClassRepository;
use crate::events::EventRepository;
use crate::progress::{IntervalScoreRepository, ProgressRepository};
use crate::sessions::SessionRepository;
use crate::workouts::WorkoutRepository;

pub trait Store {
    type Workouts<'a>: WorkoutRepository
    where
        Self: 'a;
    type Classes<'a>: ClassRepository
    where
        Self: 'a;
    type Sessions<'a>: SessionRepository
    where
        Self: 'a;
    type Progress<'a>: ProgressRepository
    where
        Self: 'a;
    type IntervalScores<'a>: IntervalScoreRepository
    where
        Self: 'a;
    type Attendance<'a>: AttendanceRepository
    where
        Self: 'a;
    type Events<'a>: EventRepository
    where
        Self: 'a;

    fn workouts(&self) -> Self::Workouts<'_>;
    fn classes(&self) -> Self::Classes<'_>;
    fn sessions(&self) -> Self::Sessions<'_>;
    fn progress(&self) -> Self::Progress<'_>;
    fn interval_scores(&self) -> Self::IntervalScores<'_>;
    fn attendance(&self) -> Self::Attendance<'_>;
    fn events(&self) -> Self::Events<'_>;

    fn with_tx<F, T>(&self, f: F) -> Result<T, WodboardError>
    where
        F: FnOnce(&Self) -> Result<T, WodboardError>;
}
