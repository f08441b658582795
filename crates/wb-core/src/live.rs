use crate::attendance::AttendanceRepository;
use crate::classes::ClassRepository;
use crate::clock::{Clock, SystemClock};
use crate::error::{ProgressError, ScoreError, SessionError, WodboardError, WorkoutError};
use crate::events::EventRepository;
use crate::lifecycle;
use crate::progress::{IntervalScoreRepository, ProgressRepository};
use crate::scoring;
use crate::sessions::SessionRepository;
use crate::store::Store;
use crate::structure::{build_plan, time_cap_seconds, validate};
use crate::tracker::{amrap_position, apply_advance, ensure_self_paced, reps_equivalent};
use crate::types::attendance::{
    ClassAttendance, FinalScore, FinalizationReport, FinalizationStatus, StopOutcome,
    SubmitScoreOutcome,
};
use crate::types::caller::Caller;
use crate::types::class::{ClassSeed, CurrentClass, ImportSummary};
use crate::types::enums::{
    Direction, LeaderboardSource, ScoringFamily, SessionStatus, WorkoutType,
};
use crate::types::event::EventBody;
use crate::types::ids::{ClassId, UserId, WorkoutId};
use crate::types::io::{EventFilter, ScoreEntryInput, SubmitScoreInput};
use crate::types::leaderboard::Leaderboard;
use crate::types::progress::{IntervalScore, LiveProgress, MyProgress};
use crate::types::session::{ClassSession, CoachNote, SessionView};
use crate::types::workout::{Workout, WorkoutSteps};
use crate::workouts::WorkoutRepository;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use wb_events::bus::EventBus;
use wb_events::types::{EventRecord, EventSource};

#[derive(Debug, Clone)]
pub struct RequestContext {
    pub source: EventSource,
    pub correlation_id: Option<String>,
}

impl RequestContext {
    pub fn new(source: EventSource, correlation_id: Option<String>) -> Self {
        Self {
            source,
            correlation_id,
        }
    }

    pub fn for_caller(caller: Caller, correlation_id: Option<String>) -> Self {
        Self::new(caller.event_source(), correlation_id)
    }
}

/// Entry point for every live-class operation. Each mutating call runs in one
/// store transaction and publishes its events after commit.
pub struct LiveClass<S: Store> {
    store: S,
    event_bus: EventBus,
    clock: Arc<dyn Clock>,
}

impl<S: Store> LiveClass<S> {
    pub fn new(store: S, event_bus: EventBus) -> Self {
        Self::with_clock(store, event_bus, Arc::new(SystemClock))
    }

    pub fn with_clock(store: S, event_bus: EventBus, clock: Arc<dyn Clock>) -> Self {
        Self {
            store,
            event_bus,
            clock,
        }
    }

    pub fn sessions(&self) -> SessionsApi<'_, S> {
        SessionsApi { core: self }
    }

    pub fn progress(&self) -> ProgressApi<'_, S> {
        ProgressApi { core: self }
    }

    pub fn leaderboard(&self) -> LeaderboardApi<'_, S> {
        LeaderboardApi { core: self }
    }

    pub fn finalization(&self) -> FinalizationApi<'_, S> {
        FinalizationApi { core: self }
    }

    pub fn workouts(&self) -> WorkoutsApi<'_, S> {
        WorkoutsApi { core: self }
    }

    pub fn scores(&self) -> ScoresApi<'_, S> {
        ScoresApi { core: self }
    }

    pub fn events(&self) -> EventsApi<'_, S> {
        EventsApi { core: self }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    fn with_events<T, F>(&self, ctx: &RequestContext, f: F) -> Result<T, WodboardError>
    where
        F: FnOnce(&S) -> Result<(T, Vec<EventBody>), WodboardError>,
    {
        let at = self.now();
        let (value, records) = self.store.with_tx(|store| {
            let (value, bodies) = f(store)?;
            let mut records = Vec::with_capacity(bodies.len());
            for body in bodies {
                let record = build_event_record(ctx, at, body)?;
                records.push(store.events().append(record)?);
            }
            Ok((value, records))
        })?;
        for record in records {
            let _ = self.event_bus.publish(record);
        }
        Ok(value)
    }
}

pub struct SessionsApi<'a, S: Store> {
    core: &'a LiveClass<S>,
}

impl<S: Store> SessionsApi<'_, S> {
    pub fn start(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
        restart: bool,
        started_by: Option<UserId>,
    ) -> Result<SessionView, WodboardError> {
        let now = self.core.now();
        let session = self.core.with_events(ctx, |store| {
            let class = store
                .classes()
                .get(class_id)?
                .ok_or(WorkoutError::ClassNotFound)?;
            let workout_id = class.workout_id.ok_or(WorkoutError::NoWorkoutAssigned)?;
            let workout = store
                .workouts()
                .get(workout_id)?
                .ok_or(WorkoutError::WorkoutNotFound)?;

            let existing = store.sessions().get(class_id)?;
            lifecycle::check_start(existing.as_ref(), restart)?;

            let plan = build_plan(&workout);
            let time_cap = time_cap_seconds(
                workout.workout_type,
                &workout.metadata,
                &plan,
                class.duration_minutes,
            );
            let session = ClassSession {
                class_id,
                workout_id,
                workout_type: workout.workout_type,
                status: SessionStatus::Running,
                started_at: now,
                paused_at: None,
                paused_duration_seconds: 0,
                ended_at: None,
                time_cap_seconds: time_cap,
                plan,
                coach_note: None,
                started_by,
                updated_at: now,
            };
            if !store.sessions().start(&session, restart)? {
                return Err(SessionError::AlreadyRunning.into());
            }
            if restart {
                let cleared = store.progress().clear(class_id)?
                    + store.interval_scores().clear(class_id)?
                    + store.attendance().clear(class_id)?;
                tracing::info!(class_id = class_id.get(), cleared, "cleared class rows for restart");
            }
            let event = EventBody::SessionStarted {
                class_id,
                workout_id,
                workout_type: workout.workout_type,
                restart,
                time_cap_seconds: time_cap,
            };
            Ok((session, vec![event]))
        })?;
        tracing::info!(
            class_id = class_id.get(),
            workout_type = session.workout_type.as_str(),
            restart,
            "session started"
        );
        Ok(lifecycle::view(&session, now))
    }

    pub fn pause(&self, ctx: &RequestContext, class_id: ClassId) -> Result<SessionView, WodboardError> {
        let now = self.core.now();
        self.core.with_events(ctx, |store| {
            let mut session = load_session(store, class_id)?;
            lifecycle::pause(&mut session, now)?;
            store.sessions().save(&session)?;
            Ok((
                lifecycle::view(&session, now),
                vec![EventBody::SessionPaused { class_id }],
            ))
        })
    }

    pub fn resume(&self, ctx: &RequestContext, class_id: ClassId) -> Result<SessionView, WodboardError> {
        let now = self.core.now();
        self.core.with_events(ctx, |store| {
            let mut session = load_session(store, class_id)?;
            lifecycle::resume(&mut session, now)?;
            store.sessions().save(&session)?;
            let event = EventBody::SessionResumed {
                class_id,
                paused_duration_seconds: session.paused_duration_seconds,
            };
            Ok((lifecycle::view(&session, now), vec![event]))
        })
    }

    /// Ends the session, then finalizes in a separate transaction. A failed
    /// finalization is reported, never rolled into the stop.
    pub fn stop(&self, ctx: &RequestContext, class_id: ClassId) -> Result<StopOutcome, WodboardError> {
        let now = self.core.now();
        let view = self.core.with_events(ctx, |store| {
            let mut session = load_session(store, class_id)?;
            lifecycle::stop(&mut session, now)?;
            store.sessions().save(&session)?;
            let view = lifecycle::view(&session, now);
            let event = EventBody::SessionEnded {
                class_id,
                elapsed_seconds: view.elapsed_seconds,
            };
            Ok((view, vec![event]))
        })?;
        tracing::info!(class_id = class_id.get(), elapsed = view.elapsed_seconds, "session ended");

        let finalization = match self.core.finalization().finalize(ctx, class_id) {
            Ok(report) => FinalizationStatus::Completed {
                entries: report.entries,
                changed: report.changed,
            },
            Err(err) => {
                tracing::error!(
                    class_id = class_id.get(),
                    operation = "finalize",
                    code = err.code(),
                    error = %err,
                    "finalization after stop failed"
                );
                FinalizationStatus::Failed {
                    error: err.code().to_string(),
                    message: err.to_string(),
                }
            }
        };
        Ok(StopOutcome {
            session: view,
            finalization,
        })
    }

    pub fn view(&self, class_id: ClassId) -> Result<SessionView, WodboardError> {
        let session = load_session(&self.core.store, class_id)?;
        Ok(lifecycle::view(&session, self.core.now()))
    }

    pub fn note(&self, class_id: ClassId) -> Result<CoachNote, WodboardError> {
        let session = load_session(&self.core.store, class_id)?;
        Ok(CoachNote {
            class_id,
            note: session.coach_note,
        })
    }

    pub fn set_note(
        &self,
        ctx: &RequestContext,
        caller: Caller,
        class_id: ClassId,
        note: Option<String>,
    ) -> Result<CoachNote, WodboardError> {
        let now = self.core.now();
        let note = note
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty());
        self.core.with_events(ctx, |store| {
            ensure_class_coach(store, caller, class_id)?;
            let mut session = load_session(store, class_id)?;
            session.coach_note = note;
            session.updated_at = now;
            store.sessions().save(&session)?;
            Ok((
                CoachNote {
                    class_id,
                    note: session.coach_note,
                },
                vec![EventBody::NoteUpdated { class_id }],
            ))
        })
    }

    /// The running or paused class the caller coaches or is booked into.
    pub fn current_for(&self, caller: Caller) -> Result<CurrentClass, WodboardError> {
        let classes = self.core.store.classes();
        let class = match caller {
            Caller::Coach { user_id } => classes.live_for_coach(user_id)?,
            Caller::Member { user_id } => classes.live_for_member(user_id)?,
            Caller::Admin { user_id } => match classes.live_for_coach(user_id)? {
                Some(class) => Some(class),
                None => classes.live_for_member(user_id)?,
            },
        };
        let Some(class) = class else {
            return Ok(CurrentClass::none());
        };
        let Some(session) = self.core.store.sessions().get(class.id)? else {
            return Ok(CurrentClass::none());
        };
        Ok(CurrentClass {
            ongoing: session.status.is_live(),
            session: Some(lifecycle::view(&session, self.core.now())),
            class: Some(class),
        })
    }
}

pub struct ProgressApi<'a, S: Store> {
    core: &'a LiveClass<S>,
}

impl<S: Store> ProgressApi<'_, S> {
    pub fn advance(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
        user_id: UserId,
        direction: Direction,
    ) -> Result<MyProgress, WodboardError> {
        let now = self.core.now();
        self.core.with_events(ctx, |store| {
            let session = load_session(store, class_id)?;
            lifecycle::ensure_running(&session)?;
            ensure_self_paced(session.workout_type)?;
            if session.plan.step_count() == 0 {
                return Err(ProgressError::EmptyWorkout.into());
            }
            if lifecycle::time_cap_reached(&session, now) {
                return Err(ProgressError::TimeCapReached.into());
            }

            let stored = store.progress().get(class_id, user_id)?;
            let created = stored.is_none();
            let mut progress =
                stored.unwrap_or_else(|| LiveProgress::fresh(class_id, user_id, now));
            let elapsed = lifecycle::elapsed_seconds(&session, now);
            let changed = apply_advance(
                &mut progress,
                &session.plan,
                session.workout_type,
                direction,
                now,
                elapsed,
            );
            let mut events = Vec::new();
            if changed || created {
                store.progress().upsert(&progress)?;
            }
            if changed {
                tracing::debug!(
                    class_id = class_id.get(),
                    user_id = user_id.get(),
                    step = progress.current_step_index,
                    finished = progress.is_finished(),
                    "progress advanced"
                );
                events.push(EventBody::ProgressAdvanced {
                    class_id,
                    user_id,
                    direction,
                    current_step_index: progress.current_step_index,
                    rounds_completed: progress.rounds_completed,
                    finished: progress.is_finished(),
                });
            }
            Ok((my_progress(&session, user_id, Some(&progress), &[]), events))
        })
    }

    /// Reps done on the current step when the cap cut the member off.
    pub fn submit_partial(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
        user_id: UserId,
        reps: i64,
    ) -> Result<MyProgress, WodboardError> {
        let now = self.core.now();
        self.core.with_events(ctx, |store| {
            let session = load_session(store, class_id)?;
            lifecycle::ensure_running(&session)?;
            if !session.workout_type.accepts_partial() {
                return Err(ProgressError::UnsupportedFormat {
                    workout_type: session.workout_type,
                }
                .into());
            }
            let mut progress = store
                .progress()
                .get(class_id, user_id)?
                .unwrap_or_else(|| LiveProgress::fresh(class_id, user_id, now));
            if progress.is_finished() {
                return Err(ProgressError::AlreadyFinished.into());
            }
            if !lifecycle::time_cap_reached(&session, now) {
                return Err(ProgressError::TimeCapNotReached.into());
            }
            let reps = reps.max(0);
            progress.dnf_partial_reps = Some(reps);
            progress.updated_at = now;
            store.progress().upsert(&progress)?;
            let event = EventBody::PartialSubmitted {
                class_id,
                user_id,
                reps,
            };
            Ok((
                my_progress(&session, user_id, Some(&progress), &[]),
                vec![event],
            ))
        })
    }

    pub fn my_progress(&self, class_id: ClassId, user_id: UserId) -> Result<MyProgress, WodboardError> {
        let store = &self.core.store;
        let session = load_session(store, class_id)?;
        if session.workout_type.is_interval() {
            let scores = store.interval_scores().list_for_user(class_id, user_id)?;
            return Ok(my_progress(&session, user_id, None, &scores));
        }
        let progress = store.progress().get(class_id, user_id)?;
        Ok(my_progress(&session, user_id, progress.as_ref(), &[]))
    }

    /// A booked member's reps for one interval.
    pub fn submit_interval_score(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
        user_id: UserId,
        step_index: i64,
        reps: i64,
    ) -> Result<MyProgress, WodboardError> {
        self.record_interval_score(ctx, class_id, user_id, step_index, reps, |store| {
            ensure_booked(store, class_id, user_id)
        })
    }

    /// Coach correction of any member's interval row while the class runs.
    pub fn coach_interval_score(
        &self,
        ctx: &RequestContext,
        caller: Caller,
        class_id: ClassId,
        user_id: UserId,
        step_index: i64,
        reps: i64,
    ) -> Result<MyProgress, WodboardError> {
        self.record_interval_score(ctx, class_id, user_id, step_index, reps, |store| {
            ensure_class_coach(store, caller, class_id)
        })
    }

    fn record_interval_score<F>(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
        user_id: UserId,
        step_index: i64,
        reps: i64,
        authorize: F,
    ) -> Result<MyProgress, WodboardError>
    where
        F: FnOnce(&S) -> Result<(), WodboardError>,
    {
        let now = self.core.now();
        self.core.with_events(ctx, |store| {
            authorize(store)?;
            let session = load_session(store, class_id)?;
            lifecycle::ensure_running(&session)?;
            if !session.workout_type.is_interval() {
                return Err(ScoreError::NotInterval {
                    workout_type: session.workout_type,
                }
                .into());
            }
            let count = session.plan.step_count();
            let index = usize::try_from(step_index)
                .ok()
                .filter(|index| *index < count)
                .ok_or(ProgressError::StepOutOfRange {
                    index: step_index,
                    count,
                })?;
            let reps = reps.max(0);
            store.interval_scores().upsert(&IntervalScore {
                class_id,
                user_id,
                step_index: index,
                reps,
                updated_at: now,
            })?;
            let scores = store.interval_scores().list_for_user(class_id, user_id)?;
            let event = EventBody::IntervalScoreSubmitted {
                class_id,
                user_id,
                step_index: index,
                reps,
            };
            Ok((my_progress(&session, user_id, None, &scores), vec![event]))
        })
    }

    /// Coach correction that places an AMRAP member at a given rep total.
    pub fn coach_set_amrap_total(
        &self,
        ctx: &RequestContext,
        caller: Caller,
        class_id: ClassId,
        user_id: UserId,
        total_reps: i64,
    ) -> Result<MyProgress, WodboardError> {
        let now = self.core.now();
        self.core.with_events(ctx, |store| {
            ensure_class_coach(store, caller, class_id)?;
            let session = load_session(store, class_id)?;
            lifecycle::ensure_running(&session)?;
            if session.workout_type != WorkoutType::Amrap {
                return Err(ProgressError::UnsupportedFormat {
                    workout_type: session.workout_type,
                }
                .into());
            }
            let (rounds, index, partial) = amrap_position(total_reps, &session.plan)?;
            let mut progress = store
                .progress()
                .get(class_id, user_id)?
                .unwrap_or_else(|| LiveProgress::fresh(class_id, user_id, now));
            progress.rounds_completed = rounds;
            progress.current_step_index = index;
            progress.dnf_partial_reps = (partial > 0).then_some(partial);
            progress.updated_at = now;
            store.progress().upsert(&progress)?;
            let event = EventBody::AmrapTotalSet {
                class_id,
                user_id,
                total_reps: total_reps.max(0),
            };
            Ok((
                my_progress(&session, user_id, Some(&progress), &[]),
                vec![event],
            ))
        })
    }

    /// Coach correction of a time-scored finish, in seconds from the start.
    /// `None` takes the finish away again.
    pub fn coach_set_for_time_finish(
        &self,
        ctx: &RequestContext,
        caller: Caller,
        class_id: ClassId,
        user_id: UserId,
        finish_seconds: Option<i64>,
    ) -> Result<MyProgress, WodboardError> {
        let now = self.core.now();
        self.core.with_events(ctx, |store| {
            ensure_class_coach(store, caller, class_id)?;
            let session = load_session(store, class_id)?;
            lifecycle::ensure_running(&session)?;
            if session.workout_type.family() != ScoringFamily::Time {
                return Err(ProgressError::UnsupportedFormat {
                    workout_type: session.workout_type,
                }
                .into());
            }
            let mut progress = store
                .progress()
                .get(class_id, user_id)?
                .unwrap_or_else(|| LiveProgress::fresh(class_id, user_id, now));
            let finish_seconds = finish_seconds.map(|seconds| seconds.max(0));
            match finish_seconds {
                Some(seconds) => {
                    progress.finished_at =
                        Some(session.started_at + chrono::Duration::seconds(seconds));
                    progress.finish_elapsed_seconds = Some(seconds);
                    progress.current_step_index = session.plan.last_step_index().unwrap_or(0);
                    progress.dnf_partial_reps = None;
                }
                None => {
                    progress.finished_at = None;
                    progress.finish_elapsed_seconds = None;
                }
            }
            progress.updated_at = now;
            store.progress().upsert(&progress)?;
            let event = EventBody::ForTimeFinishSet {
                class_id,
                user_id,
                finish_seconds,
            };
            Ok((
                my_progress(&session, user_id, Some(&progress), &[]),
                vec![event],
            ))
        })
    }
}

pub struct LeaderboardApi<'a, S: Store> {
    core: &'a LiveClass<S>,
}

impl<S: Store> LeaderboardApi<'_, S> {
    /// Ranks straight from the current rows; nothing is cached.
    pub fn realtime(&self, class_id: ClassId) -> Result<Leaderboard, WodboardError> {
        let session = load_session(&self.core.store, class_id)?;
        live_board(&self.core.store, &session)
    }

    pub fn interval(&self, class_id: ClassId) -> Result<Leaderboard, WodboardError> {
        let session = load_session(&self.core.store, class_id)?;
        if !session.workout_type.is_interval() {
            return Err(ScoreError::NotInterval {
                workout_type: session.workout_type,
            }
            .into());
        }
        live_board(&self.core.store, &session)
    }

    /// The live board while a session runs. Once it has ended, or when scores
    /// were entered without one, the stored final scores.
    pub fn class_leaderboard(&self, class_id: ClassId) -> Result<Leaderboard, WodboardError> {
        let store = &self.core.store;
        let session = store.sessions().get(class_id)?;
        if let Some(session) = session
            .as_ref()
            .filter(|session| session.status != SessionStatus::Ended)
        {
            return live_board(store, session);
        }
        let rows = store.attendance().list(class_id)?;
        if rows.is_empty() {
            return self.realtime(class_id);
        }
        let workout_type = match &session {
            Some(session) => session.workout_type,
            None => workout_for_class(store, class_id)?.workout_type,
        };
        let family = workout_type.family();
        Ok(Leaderboard {
            class_id,
            workout_type,
            family,
            source: LeaderboardSource::Final,
            status: session.map(|session| session.status),
            entries: scoring::rank_final(family, rows),
        })
    }
}

pub struct FinalizationApi<'a, S: Store> {
    core: &'a LiveClass<S>,
}

impl<S: Store> FinalizationApi<'_, S> {
    /// Snapshots the live board into attendance. Safe to repeat: unchanged
    /// rows are left exactly as they were.
    pub fn finalize(
        &self,
        ctx: &RequestContext,
        class_id: ClassId,
    ) -> Result<FinalizationReport, WodboardError> {
        let now = self.core.now();
        let report = self.core.with_events(ctx, |store| {
            let session = load_session(store, class_id)?;
            lifecycle::ensure_ended(&session)?;
            let board = live_board(store, &session)?;
            let mut changed = 0;
            for entry in &board.entries {
                let score = scoring::final_score(board.family, entry);
                let (_, moved) = store.attendance().merge(class_id, &score, now)?;
                if moved {
                    changed += 1;
                }
            }
            let report = FinalizationReport {
                class_id,
                workout_type: session.workout_type,
                entries: board.entries.len(),
                changed,
            };
            let events = if changed > 0 {
                vec![EventBody::ClassFinalized {
                    class_id,
                    entries: report.entries,
                    changed,
                }]
            } else {
                Vec::new()
            };
            Ok((report, events))
        })?;
        tracing::info!(
            class_id = class_id.get(),
            entries = report.entries,
            changed = report.changed,
            "class finalized"
        );
        Ok(report)
    }

    pub fn edit_interval_final_reps(
        &self,
        ctx: &RequestContext,
        caller: Caller,
        class_id: ClassId,
        member_id: UserId,
        total_reps: i64,
    ) -> Result<ClassAttendance, WodboardError> {
        let now = self.core.now();
        self.core.with_events(ctx, |store| {
            ensure_class_coach(store, caller, class_id)?;
            let session = load_session(store, class_id)?;
            if session.workout_type != WorkoutType::Interval {
                return Err(ScoreError::NotInterval {
                    workout_type: session.workout_type,
                }
                .into());
            }
            lifecycle::ensure_ended(&session)?;
            let total_reps = total_reps.max(0);
            let row = store
                .attendance()
                .overwrite_total_reps(class_id, member_id, total_reps, now)?;
            let event = EventBody::IntervalFinalEdited {
                class_id,
                member_id,
                total_reps,
            };
            Ok((row, vec![event]))
        })
    }
}

pub struct WorkoutsApi<'a, S: Store> {
    core: &'a LiveClass<S>,
}

impl<S: Store> WorkoutsApi<'_, S> {
    pub fn plan(&self, workout_id: WorkoutId) -> Result<WorkoutSteps, WodboardError> {
        let workout = self
            .core
            .store
            .workouts()
            .get(workout_id)?
            .ok_or(WorkoutError::WorkoutNotFound)?;
        let plan = build_plan(&workout);
        let time_cap = time_cap_seconds(workout.workout_type, &workout.metadata, &plan, None);
        Ok(WorkoutSteps {
            workout_id,
            workout_type: workout.workout_type,
            steps: plan.steps,
            cum_reps: plan.cum_reps,
            time_cap_seconds: time_cap,
            metadata: workout.metadata,
        })
    }

    /// Loads workouts, classes and bookings. A workout a session already
    /// points at may only be re-imported unchanged.
    pub fn import(
        &self,
        ctx: &RequestContext,
        workouts: Vec<Workout>,
        classes: Vec<ClassSeed>,
    ) -> Result<ImportSummary, WodboardError> {
        self.core.with_events(ctx, |store| {
            let mut summary = ImportSummary {
                workouts: 0,
                workouts_unchanged: 0,
                classes: 0,
                bookings: 0,
            };
            for workout in &workouts {
                validate(workout)?;
                let stored = store.workouts().get(workout.id)?;
                if stored.as_ref() == Some(workout) {
                    summary.workouts_unchanged += 1;
                    continue;
                }
                if stored.is_some() && store.workouts().is_referenced(workout.id)? {
                    return Err(WorkoutError::InUse.into());
                }
                store.workouts().upsert(workout)?;
                summary.workouts += 1;
            }
            for seed in &classes {
                store.classes().upsert(&seed.class)?;
                summary.classes += 1;
                for member in &seed.members {
                    store.classes().add_booking(seed.class.id, *member)?;
                    summary.bookings += 1;
                }
            }
            let event = EventBody::FixturesImported {
                workouts: summary.workouts,
                classes: summary.classes,
            };
            Ok((summary, vec![event]))
        })
    }
}

pub struct ScoresApi<'a, S: Store> {
    core: &'a LiveClass<S>,
}

impl<S: Store> ScoresApi<'_, S> {
    /// Manual final scores for a class that is not live. Staff submit for
    /// anyone in the class they run; members submit only their own.
    pub fn submit(
        &self,
        ctx: &RequestContext,
        caller: Caller,
        input: SubmitScoreInput,
    ) -> Result<SubmitScoreOutcome, WodboardError> {
        let now = self.core.now();
        let class_id = input.class_id;
        self.core.with_events(ctx, |store| {
            let class = store
                .classes()
                .get(class_id)?
                .ok_or(WorkoutError::ClassNotFound)?;
            let session = store.sessions().get(class_id)?;
            if session.as_ref().is_some_and(|s| s.status.is_live()) {
                return Err(ScoreError::SessionActive.into());
            }
            let workout_type = match &session {
                Some(session) => session.workout_type,
                None => workout_for_class(store, class_id)?.workout_type,
            };
            let family = workout_type.family();
            if input.scores.is_empty() {
                return Err(missing("no scores submitted"));
            }

            let member_ids: Vec<UserId> = match caller {
                Caller::Coach { user_id } if class.coach_id != Some(user_id) => {
                    return Err(ScoreError::NotClassCoach.into());
                }
                Caller::Coach { .. } | Caller::Admin { .. } => input
                    .scores
                    .iter()
                    .map(|entry| {
                        entry.member_id.ok_or_else(|| {
                            WodboardError::from(ScoreError::InvalidInput {
                                message: "member_id is required".to_string(),
                            })
                        })
                    })
                    .collect::<Result<_, _>>()?,
                Caller::Member { user_id } => {
                    let [entry] = input.scores.as_slice() else {
                        return Err(ScoreError::InvalidInput {
                            message: "submit exactly one score for yourself".to_string(),
                        }
                        .into());
                    };
                    if entry.member_id.is_some_and(|member| member != user_id) {
                        return Err(ScoreError::InvalidInput {
                            message: "members may only submit their own score".to_string(),
                        }
                        .into());
                    }
                    if !store.classes().is_booked(class_id, user_id)? {
                        return Err(ScoreError::NotBooked.into());
                    }
                    vec![user_id]
                }
            };

            let mut updated = Vec::with_capacity(member_ids.len());
            for (member_id, entry) in member_ids.iter().zip(&input.scores) {
                let score = score_for_family(family, *member_id, entry)?;
                let (row, _) = store.attendance().merge(class_id, &score, now)?;
                updated.push(row);
            }
            let event = EventBody::ScoresSubmitted {
                class_id,
                member_ids,
            };
            Ok((SubmitScoreOutcome { class_id, updated }, vec![event]))
        })
    }
}

pub struct EventsApi<'a, S: Store> {
    core: &'a LiveClass<S>,
}

impl<S: Store> EventsApi<'_, S> {
    pub fn list(&self, filter: &EventFilter) -> Result<Vec<EventRecord>, WodboardError> {
        self.core.store.events().list(filter)
    }
}

fn load_session<S: Store>(store: &S, class_id: ClassId) -> Result<ClassSession, WodboardError> {
    store
        .sessions()
        .get(class_id)?
        .ok_or_else(|| SessionError::NotFound.into())
}

/// Coaches may only touch the classes they run; admins may touch any.
fn ensure_class_coach<S: Store>(
    store: &S,
    caller: Caller,
    class_id: ClassId,
) -> Result<(), WodboardError> {
    let class = store
        .classes()
        .get(class_id)?
        .ok_or(WorkoutError::ClassNotFound)?;
    match caller {
        Caller::Admin { .. } => Ok(()),
        Caller::Coach { user_id } if class.coach_id == Some(user_id) => Ok(()),
        Caller::Coach { .. } | Caller::Member { .. } => Err(ScoreError::NotClassCoach.into()),
    }
}

fn ensure_booked<S: Store>(store: &S, class_id: ClassId, user_id: UserId) -> Result<(), WodboardError> {
    if store.classes().is_booked(class_id, user_id)? {
        Ok(())
    } else {
        Err(ScoreError::NotBooked.into())
    }
}

fn workout_for_class<S: Store>(store: &S, class_id: ClassId) -> Result<Workout, WodboardError> {
    let class = store
        .classes()
        .get(class_id)?
        .ok_or(WorkoutError::ClassNotFound)?;
    let workout_id = class.workout_id.ok_or(WorkoutError::NoWorkoutAssigned)?;
    store
        .workouts()
        .get(workout_id)?
        .ok_or_else(|| WorkoutError::WorkoutNotFound.into())
}

fn live_board<S: Store>(store: &S, session: &ClassSession) -> Result<Leaderboard, WodboardError> {
    let family = session.workout_type.family();
    let lines = if session.workout_type.is_interval() {
        let rows = store.interval_scores().list(session.class_id)?;
        scoring::lines_from_intervals(&rows, &session.plan)
    } else {
        let rows = store.progress().list(session.class_id)?;
        scoring::lines_from_progress(&rows, &session.plan)
    };
    Ok(Leaderboard {
        class_id: session.class_id,
        workout_type: session.workout_type,
        family,
        source: LeaderboardSource::Live,
        status: Some(session.status),
        entries: scoring::rank(family, lines),
    })
}

fn my_progress(
    session: &ClassSession,
    user_id: UserId,
    progress: Option<&LiveProgress>,
    interval_scores: &[IntervalScore],
) -> MyProgress {
    let plan = &session.plan;
    let fresh = LiveProgress::fresh(session.class_id, user_id, session.started_at);
    let row = progress.unwrap_or(&fresh);
    let (reps, updated_at) = if session.workout_type.is_interval() {
        (
            interval_scores.iter().map(|score| score.reps).sum(),
            interval_scores.iter().map(|score| score.updated_at).max(),
        )
    } else {
        (
            reps_equivalent(row, plan),
            progress.map(|progress| progress.updated_at),
        )
    };
    let mut interval_steps: Vec<_> = interval_scores
        .iter()
        .map(|score| scoring::interval_step(score, plan))
        .collect();
    interval_steps.sort_by_key(|step| step.step_index);
    MyProgress {
        class_id: session.class_id,
        user_id,
        workout_type: session.workout_type,
        current_step_index: row.current_step_index,
        rounds_completed: row.rounds_completed,
        finished: row.is_finished(),
        finished_at: row.finished_at,
        finish_elapsed_seconds: row.finish_elapsed_seconds,
        dnf_partial_reps: row.dnf_partial_reps,
        reps_equivalent: reps,
        step_count: plan.step_count(),
        current_step: plan.steps.get(row.current_step_index).cloned(),
        interval_steps,
        updated_at,
    }
}

fn score_for_family(
    family: ScoringFamily,
    member_id: UserId,
    entry: &ScoreEntryInput,
) -> Result<FinalScore, WodboardError> {
    let (value, field) = match family {
        ScoringFamily::Time => (entry.time_seconds, "time_seconds"),
        ScoringFamily::Reps => (entry.total_reps, "total_reps"),
    };
    let Some(value) = value else {
        return Err(missing(format!("{field} is required for member {member_id}")));
    };
    if value < 0 {
        return Err(ScoreError::InvalidInput {
            message: format!("{field} must not be negative"),
        }
        .into());
    }
    Ok(match family {
        ScoringFamily::Time => FinalScore {
            member_id,
            final_time_seconds: Some(value),
            final_total_reps: None,
        },
        ScoringFamily::Reps => FinalScore {
            member_id,
            final_time_seconds: None,
            final_total_reps: Some(value),
        },
    })
}

fn missing(message: impl Into<String>) -> WodboardError {
    ScoreError::MissingScore {
        message: message.into(),
    }
    .into()
}

fn build_event_record(
    ctx: &RequestContext,
    at: DateTime<Utc>,
    body: EventBody,
) -> Result<EventRecord, WodboardError> {
    let class_id = body.class_id().map(ClassId::get);
    let value = serde_json::to_value(body).map_err(|err| WodboardError::Internal {
        message: err.to_string(),
    })?;
    Ok(EventRecord {
        id: String::new(),
        seq: 0,
        at,
        class_id,
        correlation_id: ctx.correlation_id.clone(),
        source: ctx.source,
        body: value,
    })
}
