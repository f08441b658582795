use crate::tracker::reps_equivalent;
use crate::types::attendance::{ClassAttendance, FinalScore};
use crate::types::enums::ScoringFamily;
use crate::types::ids::UserId;
use crate::types::leaderboard::{IntervalStepScore, LeaderboardEntry};
use crate::types::progress::{IntervalScore, LiveProgress};
use crate::types::workout::WorkoutPlan;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// One member's live standing before ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreLine {
    pub user_id: UserId,
    pub finished_at: Option<DateTime<Utc>>,
    pub elapsed_seconds: Option<i64>,
    pub reps: i64,
    pub last_update_at: Option<DateTime<Utc>>,
    pub interval_steps: Vec<IntervalStepScore>,
}

impl ScoreLine {
    fn finished(&self) -> bool {
        self.finished_at.is_some()
    }
}

pub fn lines_from_progress(rows: &[LiveProgress], plan: &WorkoutPlan) -> Vec<ScoreLine> {
    rows.iter()
        .map(|row| ScoreLine {
            user_id: row.user_id,
            finished_at: row.finished_at,
            elapsed_seconds: row.finish_elapsed_seconds,
            reps: reps_equivalent(row, plan),
            last_update_at: Some(row.updated_at),
            interval_steps: Vec::new(),
        })
        .collect()
}

/// Sums interval rows per member; the latest row time is the member's last update.
pub fn lines_from_intervals(rows: &[IntervalScore], plan: &WorkoutPlan) -> Vec<ScoreLine> {
    let mut by_user: BTreeMap<UserId, ScoreLine> = BTreeMap::new();
    for row in rows {
        let line = by_user.entry(row.user_id).or_insert_with(|| ScoreLine {
            user_id: row.user_id,
            finished_at: None,
            elapsed_seconds: None,
            reps: 0,
            last_update_at: None,
            interval_steps: Vec::new(),
        });
        line.reps += row.reps;
        line.last_update_at = line.last_update_at.max(Some(row.updated_at));
        line.interval_steps.push(interval_step(row, plan));
    }
    by_user
        .into_values()
        .map(|mut line| {
            line.interval_steps.sort_by_key(|step| step.step_index);
            line
        })
        .collect()
}

pub fn interval_step(row: &IntervalScore, plan: &WorkoutPlan) -> IntervalStepScore {
    IntervalStepScore {
        step_index: row.step_index,
        label: plan
            .steps
            .get(row.step_index)
            .map(|step| step.label.clone())
            .unwrap_or_default(),
        reps: row.reps,
    }
}

/// Orders live lines and assigns ranks from 1.
pub fn rank(family: ScoringFamily, mut lines: Vec<ScoreLine>) -> Vec<LeaderboardEntry> {
    lines.sort_by(|a, b| compare(family, a, b));
    lines
        .into_iter()
        .zip(1_u32..)
        .map(|(line, rank)| {
            let finished = family == ScoringFamily::Time && line.finished();
            let display_score = match (finished, line.elapsed_seconds) {
                (true, Some(elapsed)) => format_duration(elapsed),
                _ => format_reps(line.reps),
            };
            LeaderboardEntry {
                rank,
                user_id: line.user_id,
                finished,
                elapsed_seconds: if finished { line.elapsed_seconds } else { None },
                total_reps: Some(line.reps),
                display_score,
                last_update_at: line.last_update_at,
                interval_steps: line.interval_steps,
            }
        })
        .collect()
}

fn compare(family: ScoringFamily, a: &ScoreLine, b: &ScoreLine) -> Ordering {
    let primary = match family {
        ScoringFamily::Time => match (a.finished(), b.finished()) {
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (true, true) => elapsed_key(a)
                .cmp(&elapsed_key(b))
                .then_with(|| a.finished_at.cmp(&b.finished_at)),
            (false, false) => b
                .reps
                .cmp(&a.reps)
                .then_with(|| earliest_first(a.last_update_at, b.last_update_at)),
        },
        ScoringFamily::Reps => b
            .reps
            .cmp(&a.reps)
            .then_with(|| earliest_first(a.last_update_at, b.last_update_at)),
    };
    primary.then_with(|| a.user_id.cmp(&b.user_id))
}

fn elapsed_key(line: &ScoreLine) -> i64 {
    line.elapsed_seconds.unwrap_or(i64::MAX)
}

fn earliest_first(a: Option<DateTime<Utc>>, b: Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// What finalization stores for a ranked live entry.
pub fn final_score(family: ScoringFamily, entry: &LeaderboardEntry) -> FinalScore {
    match family {
        ScoringFamily::Time => FinalScore {
            member_id: entry.user_id,
            final_time_seconds: entry.elapsed_seconds.filter(|_| entry.finished),
            final_total_reps: None,
        },
        ScoringFamily::Reps => FinalScore {
            member_id: entry.user_id,
            final_time_seconds: None,
            final_total_reps: entry.total_reps,
        },
    }
}

/// Orders stored attendance rows. Missing values sort last, then by member id.
pub fn rank_final(family: ScoringFamily, mut rows: Vec<ClassAttendance>) -> Vec<LeaderboardEntry> {
    rows.sort_by(|a, b| {
        let primary = match family {
            ScoringFamily::Time => nulls_last(a.final_time_seconds, b.final_time_seconds, false)
                .then_with(|| nulls_last(a.final_total_reps, b.final_total_reps, true)),
            ScoringFamily::Reps => nulls_last(a.final_total_reps, b.final_total_reps, true),
        };
        primary.then_with(|| a.member_id.cmp(&b.member_id))
    });
    rows.into_iter()
        .zip(1_u32..)
        .map(|(row, rank)| {
            let finished = match family {
                ScoringFamily::Time => row.final_time_seconds.is_some(),
                ScoringFamily::Reps => row.final_total_reps.is_some(),
            };
            let display_score = match (family, row.final_time_seconds, row.final_total_reps) {
                (ScoringFamily::Time, Some(seconds), _) => format_duration(seconds),
                (_, _, Some(reps)) => format_reps(reps),
                _ => "no score".to_string(),
            };
            LeaderboardEntry {
                rank,
                user_id: row.member_id,
                finished,
                elapsed_seconds: row.final_time_seconds,
                total_reps: row.final_total_reps,
                display_score,
                last_update_at: Some(row.updated_at),
                interval_steps: Vec::new(),
            }
        })
        .collect()
}

fn nulls_last(a: Option<i64>, b: Option<i64>, descending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if descending => b.cmp(&a),
        (Some(a), Some(b)) => a.cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `m:ss` below an hour, `h:mm:ss` above.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let (hours, minutes, secs) = (seconds / 3600, (seconds % 3600) / 60, seconds % 60);
    if hours > 0 {
        format!("{hours}:{minutes:02}:{secs:02}")
    } else {
        format!("{minutes}:{secs:02}")
    }
}

pub fn format_reps(reps: i64) -> String {
    format!("{reps} reps")
}
