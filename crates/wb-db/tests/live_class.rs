use chrono::{DateTime, TimeZone, Utc};
use std::sync::{Arc, Barrier};
use std::time::Duration;
use wb_core::clock::ManualClock;
use wb_core::types::attendance::FinalizationStatus;
use wb_core::types::caller::Caller;
use wb_core::types::enums::{Direction, LeaderboardSource, SessionStatus};
use wb_core::types::ids::{ClassId, UserId};
use wb_core::types::io::{EventFilter, ScoreEntryInput, SubmitScoreInput};
use wb_core::{LiveClass, RequestContext, WodboardError};
use wb_db::{DbStore, fixtures, schema};
use wb_events::bus::EventBus;
use wb_events::types::EventSource;

const FIXTURES: &str = r#"
[[workout]]
id = 1
name = "Ladder"
type = "FOR_TIME"
metadata = { time_limit = 10 }
exercise = [
  { position = 1, name = "Air squats", quantity = 10 },
  { position = 2, name = "Push-ups", quantity = 15 },
  { position = 3, name = "Sit-ups", quantity = 15 },
]

[[workout]]
id = 2
name = "Sprint"
type = "FOR_TIME"
metadata = { time_limit = 1 }
exercise = [
  { position = 1, name = "Air squats", quantity = 10 },
  { position = 2, name = "Push-ups", quantity = 15 },
  { position = 3, name = "Sit-ups", quantity = 15 },
]

[[workout]]
id = 3
name = "Cindy-ish"
type = "AMRAP"
exercise = [
  { position = 1, name = "Pull-ups", quantity = 10 },
  { position = 2, name = "Push-ups", quantity = 15 },
  { position = 3, name = "Squats", quantity = 15 },
]

[[workout]]
id = 4
name = "Bike intervals"
type = "INTERVAL"
exercise = [
  { position = 1, name = "Bike", quantity_type = "duration", quantity = 40 },
  { position = 2, name = "Burpees", quantity_type = "duration", quantity = 20 },
]

[[class]]
id = 100
name = "6am"
workout_id = 1
coach_id = 10
members = [20, 21]

[[class]]
id = 101
name = "7am"
workout_id = 2
coach_id = 10
members = [20]

[[class]]
id = 102
name = "Noon"
workout_id = 3
coach_id = 10
members = [21, 22]

[[class]]
id = 103
name = "5pm"
workout_id = 4
coach_id = 10
members = [20, 21]

[[class]]
id = 104
name = "Open gym"
workout_id = 1
coach_id = 11
members = [20]

[[class]]
id = 105
name = "Unplanned"
coach_id = 10

[[class]]
id = 106
name = "Lunch AMRAP"
workout_id = 3
coach_id = 10
duration_minutes = 20
members = [21]
"#;

fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 2, 6, 0, 0).unwrap()
}

fn class(id: i64) -> ClassId {
    ClassId::new(id).unwrap()
}

fn user(id: i64) -> UserId {
    UserId::new(id).unwrap()
}

fn coach() -> RequestContext {
    RequestContext::new(EventSource::Coach, Some("corr_test".to_string()))
}

fn member() -> RequestContext {
    RequestContext::new(EventSource::Member, None)
}

fn head_coach() -> Caller {
    Caller::Coach { user_id: user(10) }
}

fn seeded(conn: rusqlite::Connection, clock: Arc<ManualClock>) -> LiveClass<DbStore> {
    let live = LiveClass::with_clock(DbStore::new(conn), EventBus::new(64), clock);
    let seed = fixtures::parse(FIXTURES).unwrap();
    live.workouts()
        .import(&RequestContext::new(EventSource::Cli, None), seed.workouts, seed.classes)
        .unwrap();
    live
}

fn setup() -> (LiveClass<DbStore>, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::new(t0()));
    let live = seeded(schema::with_test_db().unwrap(), clock.clone());
    (live, clock)
}

fn code(result: Result<impl std::fmt::Debug, WodboardError>) -> &'static str {
    result.unwrap_err().code()
}

fn next(live: &LiveClass<DbStore>, class_id: i64, user_id: i64) {
    live.progress()
        .advance(&member(), class(class_id), user(user_id), Direction::Next)
        .unwrap();
}

#[test]
fn start_on_running_session_fails_and_keeps_progress() {
    let (live, _) = setup();
    live.sessions().start(&coach(), class(100), false, Some(user(10))).unwrap();
    next(&live, 100, 20);

    assert_eq!(
        code(live.sessions().start(&coach(), class(100), false, None)),
        "ALREADY_RUNNING"
    );
    let me = live.progress().my_progress(class(100), user(20)).unwrap();
    assert_eq!(me.current_step_index, 1);
}

#[test]
fn start_reports_missing_class_workout_and_ended_session() {
    let (live, _) = setup();
    assert_eq!(code(live.sessions().start(&coach(), class(999), false, None)), "CLASS_NOT_FOUND");
    assert_eq!(
        code(live.sessions().start(&coach(), class(105), false, None)),
        "NO_WORKOUT_ASSIGNED"
    );
    assert_eq!(code(live.sessions().pause(&coach(), class(100))), "SESSION_NOT_FOUND");

    live.sessions().start(&coach(), class(100), false, None).unwrap();
    live.sessions().stop(&coach(), class(100)).unwrap();
    assert_eq!(code(live.sessions().start(&coach(), class(100), false, None)), "ALREADY_ENDED");
}

#[test]
fn restart_after_stop_starts_from_a_clean_slate() {
    let (live, clock) = setup();
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    clock.advance_secs(100);
    for _ in 0..3 {
        next(&live, 100, 20);
    }
    next(&live, 100, 21);
    live.sessions().stop(&coach(), class(100)).unwrap();
    let first = live.leaderboard().class_leaderboard(class(100)).unwrap();
    assert_eq!(first.entries[0].elapsed_seconds, Some(100));

    live.sessions().start(&coach(), class(100), true, None).unwrap();
    let rerun = live.leaderboard().class_leaderboard(class(100)).unwrap();
    assert_eq!(rerun.source, LeaderboardSource::Live);
    assert_eq!(rerun.status, Some(SessionStatus::Running));
    assert!(rerun.entries.is_empty());

    next(&live, 100, 20);
    next(&live, 100, 21);
    live.sessions().stop(&coach(), class(100)).unwrap();

    let board = live.leaderboard().class_leaderboard(class(100)).unwrap();
    assert_eq!(board.source, LeaderboardSource::Final);
    assert!(board.entries.iter().all(|entry| !entry.finished));
    assert!(board.entries.iter().all(|entry| entry.elapsed_seconds.is_none()));
}

#[test]
fn class_leaderboard_is_live_while_paused() {
    let (live, _) = setup();
    let owner = Caller::Coach { user_id: user(11) };
    let input = SubmitScoreInput {
        class_id: class(104),
        scores: vec![ScoreEntryInput {
            member_id: Some(user(20)),
            time_seconds: Some(280),
            total_reps: None,
        }],
    };
    live.scores().submit(&coach(), owner, input).unwrap();
    assert_eq!(
        live.leaderboard().class_leaderboard(class(104)).unwrap().source,
        LeaderboardSource::Final
    );

    live.sessions().start(&coach(), class(104), false, None).unwrap();
    live.sessions().pause(&coach(), class(104)).unwrap();
    let board = live.leaderboard().class_leaderboard(class(104)).unwrap();
    assert_eq!(board.source, LeaderboardSource::Live);
    assert_eq!(board.status, Some(SessionStatus::Paused));
}

#[test]
fn class_length_caps_an_open_amrap() {
    let (live, clock) = setup();
    let view = live.sessions().start(&coach(), class(106), false, None).unwrap();
    assert_eq!(view.time_cap_seconds, Some(1200));

    next(&live, 106, 21);
    assert_eq!(
        code(live.progress().submit_partial(&member(), class(106), user(21), 4)),
        "TIME_CAP_NOT_REACHED"
    );
    clock.advance_secs(1200);
    let me = live
        .progress()
        .submit_partial(&member(), class(106), user(21), 4)
        .unwrap();
    assert_eq!(me.reps_equivalent, 14);

    let plain = live.sessions().start(&coach(), class(102), false, None).unwrap();
    assert_eq!(plain.time_cap_seconds, None);
}

#[test]
fn coach_sets_and_clears_a_for_time_finish() {
    let (live, _) = setup();
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    next(&live, 100, 21);
    let progress = live.progress();

    let set = progress
        .coach_set_for_time_finish(&coach(), head_coach(), class(100), user(20), Some(250))
        .unwrap();
    assert!(set.finished);
    assert_eq!(set.finish_elapsed_seconds, Some(250));
    assert_eq!(set.reps_equivalent, 40);
    let board = live.leaderboard().realtime(class(100)).unwrap();
    assert_eq!(board.entries[0].user_id, user(20));
    assert_eq!(board.entries[0].display_score, "4:10");

    let cleared = progress
        .coach_set_for_time_finish(&coach(), head_coach(), class(100), user(20), None)
        .unwrap();
    assert!(!cleared.finished);
    assert_eq!(cleared.finish_elapsed_seconds, None);
    let board = live.leaderboard().realtime(class(100)).unwrap();
    assert!(board.entries.iter().all(|entry| !entry.finished));

    live.sessions().start(&coach(), class(102), false, None).unwrap();
    assert_eq!(
        code(progress.coach_set_for_time_finish(&coach(), head_coach(), class(102), user(21), Some(60))),
        "UNSUPPORTED_FORMAT"
    );
}

#[test]
fn corrections_belong_to_the_class_coach() {
    let (live, _) = setup();
    let other = Caller::Coach { user_id: user(11) };
    let admin = Caller::Admin { user_id: user(1) };
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    live.sessions().start(&coach(), class(102), false, None).unwrap();
    live.sessions().start(&coach(), class(103), false, None).unwrap();
    let progress = live.progress();

    assert_eq!(
        code(live.sessions().set_note(&coach(), other, class(100), Some("hi".to_string()))),
        "NOT_CLASS_COACH"
    );
    assert_eq!(
        code(progress.coach_set_amrap_total(&coach(), other, class(102), user(21), 20)),
        "NOT_CLASS_COACH"
    );
    assert_eq!(
        code(progress.coach_interval_score(&coach(), other, class(103), user(20), 0, 9)),
        "NOT_CLASS_COACH"
    );
    assert_eq!(
        code(progress.coach_set_for_time_finish(&coach(), other, class(100), user(20), Some(90))),
        "NOT_CLASS_COACH"
    );
    progress
        .coach_interval_score(&coach(), admin, class(103), user(20), 0, 9)
        .unwrap();

    assert_eq!(
        code(progress.submit_interval_score(&member(), class(103), user(22), 0, 5)),
        "NOT_BOOKED"
    );

    live.sessions().stop(&coach(), class(103)).unwrap();
    assert_eq!(
        code(live.finalization().edit_interval_final_reps(&coach(), other, class(103), user(20), 30)),
        "NOT_CLASS_COACH"
    );
}

#[test]
fn restart_clears_live_rows() {
    let (live, _) = setup();
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    next(&live, 100, 20);
    next(&live, 100, 21);

    let view = live.sessions().start(&coach(), class(100), true, None).unwrap();
    assert_eq!(view.status, SessionStatus::Running);
    assert!(live.leaderboard().realtime(class(100)).unwrap().entries.is_empty());
}

#[test]
fn finishing_twice_is_a_no_op() {
    let (live, clock) = setup();
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    next(&live, 100, 20);
    next(&live, 100, 20);
    clock.advance_secs(95);
    next(&live, 100, 20);
    let first = live.progress().my_progress(class(100), user(20)).unwrap();
    assert!(first.finished);
    assert_eq!(first.finish_elapsed_seconds, Some(95));

    clock.advance_secs(30);
    next(&live, 100, 20);
    let second = live.progress().my_progress(class(100), user(20)).unwrap();
    assert_eq!(first, second);
    assert_eq!(second.current_step_index, 2);
}

#[test]
fn prev_at_first_step_returns_current_state() {
    let (live, _) = setup();
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    let me = live
        .progress()
        .advance(&member(), class(100), user(20), Direction::Prev)
        .unwrap();
    assert_eq!(me.current_step_index, 0);
    assert_eq!(me.reps_equivalent, 0);
}

#[test]
fn partial_after_cap_counts_toward_reps() {
    let (live, clock) = setup();
    live.sessions().start(&coach(), class(101), false, None).unwrap();
    next(&live, 101, 20);
    next(&live, 101, 20);

    assert_eq!(
        code(live.progress().submit_partial(&member(), class(101), user(20), 5)),
        "TIME_CAP_NOT_REACHED"
    );
    clock.advance_secs(61);
    assert_eq!(
        code(live.progress().advance(&member(), class(101), user(20), Direction::Next)),
        "TIME_CAP_REACHED"
    );

    let me = live
        .progress()
        .submit_partial(&member(), class(101), user(20), 5)
        .unwrap();
    assert_eq!(me.dnf_partial_reps, Some(5));
    assert_eq!(me.reps_equivalent, 30);

    let board = live.leaderboard().realtime(class(101)).unwrap();
    assert_eq!(board.entries[0].display_score, "30 reps");
}

#[test]
fn finishers_outrank_everyone_still_working() {
    let (live, clock) = setup();
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    for _ in 0..2 {
        next(&live, 100, 21);
    }
    clock.advance_secs(200);
    for _ in 0..3 {
        next(&live, 100, 20);
    }

    let board = live.leaderboard().realtime(class(100)).unwrap();
    assert_eq!(board.source, LeaderboardSource::Live);
    let leader = &board.entries[0];
    assert_eq!(leader.user_id, user(20));
    assert!(leader.finished);
    assert_eq!(leader.display_score, "3:20");
    assert_eq!(board.entries[1].user_id, user(21));
    assert_eq!(board.entries[1].total_reps, Some(25));

    assert_eq!(live.leaderboard().realtime(class(100)).unwrap(), board);
}

#[test]
fn amrap_tie_goes_to_the_earlier_update() {
    let (live, clock) = setup();
    live.sessions().start(&coach(), class(102), false, None).unwrap();
    clock.advance_secs(10);
    live.progress()
        .coach_set_amrap_total(&coach(), head_coach(), class(102), user(22), 50)
        .unwrap();
    clock.advance_secs(10);
    let later = live
        .progress()
        .coach_set_amrap_total(&coach(), head_coach(), class(102), user(21), 50)
        .unwrap();
    assert_eq!(later.rounds_completed, 1);
    assert_eq!(later.current_step_index, 1);

    let board = live.leaderboard().realtime(class(102)).unwrap();
    let order: Vec<_> = board.entries.iter().map(|entry| entry.user_id).collect();
    assert_eq!(order, vec![user(22), user(21)]);
    assert_eq!(board.entries[0].total_reps, Some(50));
}

#[test]
fn amrap_wraps_into_the_next_round() {
    let (live, _) = setup();
    live.sessions().start(&coach(), class(102), false, None).unwrap();
    for _ in 0..4 {
        next(&live, 102, 21);
    }
    let me = live.progress().my_progress(class(102), user(21)).unwrap();
    assert_eq!(me.rounds_completed, 1);
    assert_eq!(me.current_step_index, 1);
    assert_eq!(me.reps_equivalent, 50);
    assert!(!me.finished);
}

#[test]
fn pause_time_is_excluded_from_elapsed() {
    let (live, clock) = setup();
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    clock.advance_secs(30);
    live.sessions().pause(&coach(), class(100)).unwrap();
    clock.advance_secs(100);
    assert_eq!(live.sessions().view(class(100)).unwrap().elapsed_seconds, 30);
    assert_eq!(
        code(live.progress().advance(&member(), class(100), user(20), Direction::Next)),
        "NOT_RUNNING"
    );
    assert_eq!(code(live.sessions().pause(&coach(), class(100))), "NOT_RUNNING");

    let resumed = live.sessions().resume(&coach(), class(100)).unwrap();
    assert_eq!(resumed.paused_duration_seconds, 100);
    assert_eq!(code(live.sessions().resume(&coach(), class(100))), "NOT_PAUSED");
    clock.advance_secs(10);
    assert_eq!(live.sessions().view(class(100)).unwrap().elapsed_seconds, 40);

    live.sessions().pause(&coach(), class(100)).unwrap();
    clock.advance_secs(50);
    let stopped = live.sessions().stop(&coach(), class(100)).unwrap();
    assert_eq!(stopped.session.paused_duration_seconds, 150);
    assert_eq!(stopped.session.elapsed_seconds, 40);
}

#[test]
fn finalize_twice_leaves_attendance_identical() {
    let (live, clock) = setup();
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    clock.advance_secs(120);
    for _ in 0..3 {
        next(&live, 100, 20);
    }
    next(&live, 100, 21);

    let stopped = live.sessions().stop(&coach(), class(100)).unwrap();
    assert_eq!(
        stopped.finalization,
        FinalizationStatus::Completed {
            entries: 2,
            changed: 2
        }
    );
    let first = live.leaderboard().class_leaderboard(class(100)).unwrap();
    assert_eq!(first.source, LeaderboardSource::Final);
    assert_eq!(first.entries[0].user_id, user(20));
    assert_eq!(first.entries[0].elapsed_seconds, Some(120));
    assert_eq!(first.entries[1].display_score, "no score");

    clock.advance_secs(300);
    let report = live.finalization().finalize(&coach(), class(100)).unwrap();
    assert_eq!(report.changed, 0);
    assert_eq!(live.leaderboard().class_leaderboard(class(100)).unwrap(), first);

    let finalized = live
        .events()
        .list(&EventFilter {
            class_id: Some(class(100)),
            ..EventFilter::default()
        })
        .unwrap()
        .into_iter()
        .filter(|event| event.body["type"] == "ClassFinalized")
        .count();
    assert_eq!(finalized, 1);
}

#[test]
fn submissions_after_stop_fail_the_running_guard() {
    let (live, _) = setup();
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    live.sessions().stop(&coach(), class(100)).unwrap();
    assert_eq!(
        code(live.progress().advance(&member(), class(100), user(20), Direction::Next)),
        "NOT_RUNNING"
    );
    assert_eq!(code(live.sessions().stop(&coach(), class(100))), "NOT_RUNNING");
}

#[test]
fn finalize_requires_an_ended_session() {
    let (live, _) = setup();
    assert_eq!(code(live.finalization().finalize(&coach(), class(100))), "SESSION_NOT_FOUND");
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    assert_eq!(code(live.finalization().finalize(&coach(), class(100))), "NOT_ENDED");
}

#[test]
fn interval_scores_sum_per_member() {
    let (live, _) = setup();
    live.sessions().start(&coach(), class(103), false, None).unwrap();
    let progress = live.progress();
    progress.submit_interval_score(&member(), class(103), user(20), 0, 12).unwrap();
    progress.submit_interval_score(&member(), class(103), user(20), 1, 8).unwrap();
    progress.submit_interval_score(&member(), class(103), user(21), 0, 10).unwrap();
    progress.coach_interval_score(&coach(), head_coach(), class(103), user(21), 0, 15).unwrap();

    assert_eq!(
        code(progress.submit_interval_score(&member(), class(103), user(20), 2, 1)),
        "STEP_INDEX_OUT_OF_RANGE"
    );
    assert_eq!(
        code(progress.advance(&member(), class(103), user(20), Direction::Next)),
        "UNSUPPORTED_FORMAT"
    );

    let board = live.leaderboard().interval(class(103)).unwrap();
    assert_eq!(board.entries[0].user_id, user(20));
    assert_eq!(board.entries[0].display_score, "20 reps");
    assert_eq!(board.entries[0].interval_steps.len(), 2);
    assert_eq!(board.entries[1].total_reps, Some(15));

    let me = progress.my_progress(class(103), user(20)).unwrap();
    assert_eq!(me.reps_equivalent, 20);
}

#[test]
fn interval_final_edits_need_an_ended_interval_class() {
    let (live, _) = setup();
    live.sessions().start(&coach(), class(103), false, None).unwrap();
    live.progress()
        .submit_interval_score(&member(), class(103), user(20), 0, 12)
        .unwrap();
    assert_eq!(
        code(live.finalization().edit_interval_final_reps(&coach(), head_coach(), class(103), user(20), 30)),
        "NOT_ENDED"
    );

    live.sessions().stop(&coach(), class(103)).unwrap();
    let row = live
        .finalization()
        .edit_interval_final_reps(&coach(), head_coach(), class(103), user(20), 30)
        .unwrap();
    assert_eq!(row.final_total_reps, Some(30));

    live.sessions().start(&coach(), class(100), false, None).unwrap();
    live.sessions().stop(&coach(), class(100)).unwrap();
    assert_eq!(
        code(live.finalization().edit_interval_final_reps(&coach(), head_coach(), class(100), user(20), 30)),
        "NOT_INTERVAL"
    );
}

#[test]
fn manual_scores_follow_role_rules() {
    let (live, _) = setup();
    let scores = live.scores();
    let time = |member_id: Option<i64>, seconds: i64| SubmitScoreInput {
        class_id: class(104),
        scores: vec![ScoreEntryInput {
            member_id: member_id.map(user),
            time_seconds: Some(seconds),
            total_reps: None,
        }],
    };

    let not_owner = Caller::Coach { user_id: user(10) };
    assert_eq!(code(scores.submit(&coach(), not_owner, time(Some(20), 300))), "NOT_CLASS_COACH");

    let stranger = Caller::Member { user_id: user(21) };
    assert_eq!(code(scores.submit(&member(), stranger, time(None, 300))), "NOT_BOOKED");

    let reps_only = SubmitScoreInput {
        class_id: class(104),
        scores: vec![ScoreEntryInput {
            member_id: None,
            time_seconds: None,
            total_reps: Some(40),
        }],
    };
    let booked = Caller::Member { user_id: user(20) };
    assert_eq!(code(scores.submit(&member(), booked, reps_only)), "MISSING_SCORE");

    let outcome = scores.submit(&member(), booked, time(None, 300)).unwrap();
    assert_eq!(outcome.updated[0].final_time_seconds, Some(300));

    let owner = Caller::Coach { user_id: user(11) };
    scores.submit(&coach(), owner, time(Some(20), 280)).unwrap();
    let board = live.leaderboard().class_leaderboard(class(104)).unwrap();
    assert_eq!(board.entries[0].elapsed_seconds, Some(280));
    assert_eq!(board.status, None);

    live.sessions().start(&coach(), class(104), false, None).unwrap();
    let admin = Caller::Admin { user_id: user(1) };
    assert_eq!(code(scores.submit(&coach(), admin, time(Some(20), 250))), "SESSION_ACTIVE");
}

#[test]
fn current_class_follows_the_caller() {
    let (live, _) = setup();
    let sessions = live.sessions();
    assert!(!sessions.current_for(Caller::Member { user_id: user(20) }).unwrap().ongoing);

    sessions.start(&coach(), class(102), false, None).unwrap();
    let current = sessions.current_for(Caller::Member { user_id: user(22) }).unwrap();
    assert!(current.ongoing);
    assert_eq!(current.class.map(|class| class.id), Some(class(102)));

    let coach_view = sessions.current_for(Caller::Coach { user_id: user(10) }).unwrap();
    assert_eq!(coach_view.session.map(|session| session.class_id), Some(class(102)));
    assert!(!sessions.current_for(Caller::Member { user_id: user(20) }).unwrap().ongoing);
}

#[test]
fn coach_note_is_trimmed_and_cleared() {
    let (live, _) = setup();
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    let note = live
        .sessions()
        .set_note(&coach(), head_coach(), class(100), Some("  scale to 65 lb  ".to_string()))
        .unwrap();
    assert_eq!(note.note.as_deref(), Some("scale to 65 lb"));
    live.sessions()
        .set_note(&coach(), head_coach(), class(100), Some("   ".to_string()))
        .unwrap();
    assert_eq!(live.sessions().note(class(100)).unwrap().note, None);
}

#[test]
fn referenced_workouts_only_reimport_unchanged() {
    let (live, _) = setup();
    live.sessions().start(&coach(), class(100), false, None).unwrap();
    let ctx = RequestContext::new(EventSource::Cli, None);

    let seed = fixtures::parse(FIXTURES).unwrap();
    let summary = live.workouts().import(&ctx, seed.workouts, Vec::new()).unwrap();
    assert_eq!(summary.workouts_unchanged, 4);

    let mut changed = fixtures::parse(FIXTURES).unwrap().workouts;
    changed[0].name = "Ladder v2".to_string();
    assert_eq!(code(live.workouts().import(&ctx, changed, Vec::new())), "WORKOUT_IN_USE");

    let plan = live.workouts().plan(wb_core::types::ids::WorkoutId::new(1).unwrap()).unwrap();
    assert_eq!(plan.cum_reps, vec![0, 10, 25, 40]);
    assert_eq!(plan.time_cap_seconds, Some(600));
}

#[test]
fn racing_starts_let_exactly_one_through() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("race.db");
    let path = path.to_str().unwrap().to_string();
    let busy = Duration::from_secs(5);
    let clock = Arc::new(ManualClock::new(t0()));
    drop(seeded(schema::open_and_migrate(&path, busy).unwrap(), clock.clone()));

    let barrier = Barrier::new(2);
    let results: Vec<Result<_, WodboardError>> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..2)
            .map(|_| {
                scope.spawn(|| {
                    let conn = schema::open(&path, busy).unwrap();
                    let live =
                        LiveClass::with_clock(DbStore::new(conn), EventBus::new(8), clock.clone());
                    barrier.wait();
                    live.sessions().start(&coach(), class(100), false, None)
                })
            })
            .collect();
        handles.into_iter().map(|handle| handle.join().unwrap()).collect()
    });

    let wins = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(wins, 1);
    let loser = results.into_iter().find_map(Result::err).unwrap();
    assert_eq!(loser.code(), "ALREADY_RUNNING");
}
