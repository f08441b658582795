use crate::error::SessionError;
use crate::types::enums::SessionStatus;
use crate::types::session::{ClassSession, SessionView};
use chrono::{DateTime, Utc};

/// Pause-adjusted seconds since start. Ended sessions are measured up to
/// `ended_at`; the result never goes below zero.
pub fn elapsed_seconds(session: &ClassSession, now: DateTime<Utc>) -> i64 {
    let reference = match (session.status, session.ended_at) {
        (SessionStatus::Ended, Some(ended_at)) => ended_at,
        _ => now,
    };
    let gross = (reference - session.started_at).num_seconds();
    let open_pause = session
        .paused_at
        .map_or(0, |paused_at| (reference - paused_at).num_seconds().max(0));
    (gross - session.paused_duration_seconds - open_pause).max(0)
}

pub fn time_cap_reached(session: &ClassSession, now: DateTime<Utc>) -> bool {
    session
        .time_cap_seconds
        .is_some_and(|cap| elapsed_seconds(session, now) >= cap)
}

pub fn view(session: &ClassSession, now: DateTime<Utc>) -> SessionView {
    let elapsed = elapsed_seconds(session, now);
    SessionView {
        class_id: session.class_id,
        workout_id: session.workout_id,
        workout_type: session.workout_type,
        status: session.status,
        started_at: session.started_at,
        paused_at: session.paused_at,
        ended_at: session.ended_at,
        paused_duration_seconds: session.paused_duration_seconds,
        elapsed_seconds: elapsed,
        time_cap_seconds: session.time_cap_seconds,
        remaining_seconds: session.time_cap_seconds.map(|cap| (cap - elapsed).max(0)),
        time_cap_reached: time_cap_reached(session, now),
        step_count: session.plan.step_count(),
        coach_note: session.coach_note.clone(),
    }
}

/// Decides whether a start may proceed over what is stored.
pub fn check_start(existing: Option<&ClassSession>, restart: bool) -> Result<(), SessionError> {
    match existing {
        _ if restart => Ok(()),
        None => Ok(()),
        Some(session) if session.status == SessionStatus::Ended => Err(SessionError::AlreadyEnded),
        Some(_) => Err(SessionError::AlreadyRunning),
    }
}

pub fn ensure_running(session: &ClassSession) -> Result<(), SessionError> {
    if session.status == SessionStatus::Running {
        Ok(())
    } else {
        Err(SessionError::NotRunning {
            status: session.status,
        })
    }
}

pub fn ensure_ended(session: &ClassSession) -> Result<(), SessionError> {
    if session.status == SessionStatus::Ended {
        Ok(())
    } else {
        Err(SessionError::NotEnded {
            status: session.status,
        })
    }
}

pub fn pause(session: &mut ClassSession, now: DateTime<Utc>) -> Result<(), SessionError> {
    ensure_running(session)?;
    session.status = SessionStatus::Paused;
    session.paused_at = Some(now);
    session.updated_at = now;
    Ok(())
}

/// Returns the length of the pause that just closed.
pub fn resume(session: &mut ClassSession, now: DateTime<Utc>) -> Result<i64, SessionError> {
    if session.status != SessionStatus::Paused {
        return Err(SessionError::NotPaused {
            status: session.status,
        });
    }
    let closed = close_pause(session, now);
    session.status = SessionStatus::Running;
    session.updated_at = now;
    Ok(closed)
}

pub fn stop(session: &mut ClassSession, now: DateTime<Utc>) -> Result<(), SessionError> {
    if !session.status.is_live() {
        return Err(SessionError::NotRunning {
            status: session.status,
        });
    }
    close_pause(session, now);
    session.status = SessionStatus::Ended;
    session.ended_at = Some(now);
    session.updated_at = now;
    Ok(())
}

fn close_pause(session: &mut ClassSession, now: DateTime<Utc>) -> i64 {
    let Some(paused_at) = session.paused_at.take() else {
        return 0;
    };
    let length = (now - paused_at).num_seconds().max(0);
    session.paused_duration_seconds += length;
    length
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::enums::WorkoutType;
    use crate::types::ids::{ClassId, WorkoutId};
    use crate::types::workout::WorkoutPlan;
    use chrono::{Duration, TimeZone};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 4, 18, 0, 0).unwrap()
    }

    fn at(seconds: i64) -> DateTime<Utc> {
        t0() + Duration::seconds(seconds)
    }

    fn running(cap: Option<i64>) -> ClassSession {
        ClassSession {
            class_id: ClassId::new(1).unwrap(),
            workout_id: WorkoutId::new(1).unwrap(),
            workout_type: WorkoutType::ForTime,
            status: SessionStatus::Running,
            started_at: t0(),
            paused_at: None,
            paused_duration_seconds: 0,
            ended_at: None,
            time_cap_seconds: cap,
            plan: WorkoutPlan {
                steps: Vec::new(),
                cum_reps: vec![0],
            },
            coach_note: None,
            started_by: None,
            updated_at: t0(),
        }
    }

    #[test]
    fn pauses_are_excluded_from_elapsed() {
        let mut session = running(None);
        pause(&mut session, at(60)).unwrap();
        assert_eq!(elapsed_seconds(&session, at(100)), 60);
        assert_eq!(resume(&mut session, at(120)).unwrap(), 60);
        assert_eq!(session.paused_duration_seconds, 60);
        assert_eq!(elapsed_seconds(&session, at(180)), 120);
    }

    #[test]
    fn stop_folds_an_open_pause_and_freezes_elapsed() {
        let mut session = running(None);
        pause(&mut session, at(30)).unwrap();
        stop(&mut session, at(50)).unwrap();
        assert_eq!(session.status, SessionStatus::Ended);
        assert_eq!(session.paused_at, None);
        assert_eq!(session.paused_duration_seconds, 20);
        assert_eq!(elapsed_seconds(&session, at(5000)), 30);
    }

    #[test]
    fn elapsed_is_clamped_at_zero() {
        let session = running(None);
        assert_eq!(elapsed_seconds(&session, at(-10)), 0);
    }

    #[test]
    fn transitions_reject_wrong_states() {
        let mut session = running(None);
        assert!(matches!(
            resume(&mut session, at(1)),
            Err(SessionError::NotPaused { .. })
        ));
        stop(&mut session, at(2)).unwrap();
        assert!(matches!(
            pause(&mut session, at(3)),
            Err(SessionError::NotRunning { .. })
        ));
        assert!(matches!(
            stop(&mut session, at(3)),
            Err(SessionError::NotRunning { .. })
        ));
    }

    #[test]
    fn start_checks() {
        let live = running(None);
        let mut ended = running(None);
        stop(&mut ended, at(1)).unwrap();
        assert!(check_start(None, false).is_ok());
        assert!(matches!(
            check_start(Some(&live), false),
            Err(SessionError::AlreadyRunning)
        ));
        assert!(matches!(
            check_start(Some(&ended), false),
            Err(SessionError::AlreadyEnded)
        ));
        assert!(check_start(Some(&live), true).is_ok());
    }

    #[test]
    fn view_reports_remaining_time() {
        let session = running(Some(600));
        let v = view(&session, at(450));
        assert_eq!(v.remaining_seconds, Some(150));
        assert!(!v.time_cap_reached);
        assert!(view(&session, at(600)).time_cap_reached);
        assert!(time_cap_reached(&session, at(601)));
    }
}
