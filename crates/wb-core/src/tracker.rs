use crate::error::ProgressError;
use crate::types::enums::{Direction, WorkoutType};
use crate::types::progress::LiveProgress;
use crate::types::workout::WorkoutPlan;
use chrono::{DateTime, Utc};

/// Moves a member one step. Returns `false` when nothing changed.
///
/// The caller has already checked that the format is self-paced and the plan
/// is not empty; the index is kept inside `[0, last]` regardless.
pub fn apply_advance(
    progress: &mut LiveProgress,
    plan: &WorkoutPlan,
    workout_type: WorkoutType,
    direction: Direction,
    now: DateTime<Utc>,
    elapsed_seconds: i64,
) -> bool {
    let Some(last) = plan.last_step_index() else {
        return false;
    };
    if progress.is_finished() {
        return false;
    }
    progress.current_step_index = progress.current_step_index.min(last);

    let changed = match direction {
        Direction::Next if progress.current_step_index < last => {
            progress.current_step_index += 1;
            progress.dnf_partial_reps = None;
            true
        }
        Direction::Next => match workout_type {
            WorkoutType::Amrap => {
                progress.current_step_index = 0;
                progress.rounds_completed = progress.rounds_completed.saturating_add(1);
                progress.dnf_partial_reps = None;
                true
            }
            WorkoutType::ForTime | WorkoutType::Emom => {
                progress.finished_at = Some(now);
                progress.finish_elapsed_seconds = Some(elapsed_seconds);
                progress.dnf_partial_reps = None;
                true
            }
            WorkoutType::Interval | WorkoutType::Tabata => false,
        },
        Direction::Prev if progress.current_step_index == 0 => false,
        Direction::Prev => {
            progress.current_step_index -= 1;
            progress.dnf_partial_reps = None;
            true
        }
    };
    if changed {
        progress.updated_at = now;
    }
    changed
}

/// Reps a member has banked: whole passes, the table entry for the current
/// step and any partial reps. A finisher counts every rep of the plan.
pub fn reps_equivalent(progress: &LiveProgress, plan: &WorkoutPlan) -> i64 {
    let per_pass = plan.reps_per_pass();
    let passes = i64::from(progress.rounds_completed);
    if progress.is_finished() {
        return (passes + 1) * per_pass;
    }
    passes * per_pass
        + plan.reps_to_reach(progress.current_step_index)
        + progress.dnf_partial_reps.unwrap_or(0)
}

/// Where a member with `total_reps` sits in an AMRAP: (rounds, step, partial).
pub fn amrap_position(total_reps: i64, plan: &WorkoutPlan) -> Result<(u32, usize, i64), ProgressError> {
    let total = total_reps.max(0);
    let per_pass = plan.reps_per_pass();
    if plan.step_count() == 0 {
        return Err(ProgressError::EmptyWorkout);
    }
    if per_pass == 0 {
        return Ok((0, 0, total));
    }
    let rounds = u32::try_from(total / per_pass).map_err(|_| ProgressError::InvalidInput {
        message: format!("{total} reps is out of range"),
    })?;
    let remainder = total % per_pass;
    let index = plan.cum_reps[..plan.step_count()]
        .iter()
        .rposition(|reached| *reached <= remainder)
        .unwrap_or(0);
    Ok((rounds, index, remainder - plan.reps_to_reach(index)))
}

pub fn ensure_self_paced(workout_type: WorkoutType) -> Result<(), ProgressError> {
    if workout_type.is_self_paced() {
        Ok(())
    } else {
        Err(ProgressError::UnsupportedFormat { workout_type })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::cumulative_reps;
    use crate::types::enums::QuantityType;
    use crate::types::ids::{ClassId, UserId};
    use crate::types::workout::Step;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn plan(reps: &[u32]) -> WorkoutPlan {
        let steps: Vec<Step> = reps
            .iter()
            .enumerate()
            .map(|(index, reps)| Step {
                index,
                label: format!("{reps}x Move"),
                round: 1,
                subround: 1,
                quantity_type: QuantityType::Reps,
                reps: Some(*reps),
                duration_seconds: None,
                target_reps: None,
            })
            .collect();
        let cum_reps = cumulative_reps(&steps);
        WorkoutPlan { steps, cum_reps }
    }

    fn t(seconds: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 10, 7, 0, 0).unwrap() + Duration::seconds(seconds)
    }

    fn member() -> LiveProgress {
        LiveProgress::fresh(ClassId::new(3).unwrap(), UserId::new(9).unwrap(), t(0))
    }

    #[test]
    fn for_time_finish_is_recorded_once() {
        let plan = plan(&[10, 15, 15]);
        let mut p = member();
        for _ in 0..2 {
            assert!(apply_advance(&mut p, &plan, WorkoutType::ForTime, Direction::Next, t(5), 5));
        }
        assert!(apply_advance(&mut p, &plan, WorkoutType::ForTime, Direction::Next, t(90), 88));
        let finished = p.clone();
        assert_eq!(finished.finish_elapsed_seconds, Some(88));
        assert!(!apply_advance(&mut p, &plan, WorkoutType::ForTime, Direction::Next, t(95), 93));
        assert!(!apply_advance(&mut p, &plan, WorkoutType::ForTime, Direction::Prev, t(96), 94));
        assert_eq!(p, finished);
        assert_eq!(reps_equivalent(&p, &plan), 40);
    }

    #[test]
    fn amrap_wraps_and_counts_rounds() {
        let plan = plan(&[5, 5]);
        let mut p = member();
        for _ in 0..3 {
            apply_advance(&mut p, &plan, WorkoutType::Amrap, Direction::Next, t(1), 1);
        }
        assert_eq!((p.rounds_completed, p.current_step_index), (1, 1));
        assert_eq!(reps_equivalent(&p, &plan), 15);
        assert!(!p.is_finished());
    }

    #[test]
    fn prev_at_start_is_a_no_op() {
        let plan = plan(&[5, 5]);
        let mut p = member();
        assert!(!apply_advance(&mut p, &plan, WorkoutType::ForTime, Direction::Prev, t(1), 1));
        assert_eq!(p.updated_at, t(0));
    }

    #[test]
    fn moving_clears_partial_reps() {
        let plan = plan(&[5, 5]);
        let mut p = member();
        p.dnf_partial_reps = Some(3);
        apply_advance(&mut p, &plan, WorkoutType::ForTime, Direction::Next, t(1), 1);
        assert_eq!(p.dnf_partial_reps, None);
    }

    #[test]
    fn partial_counts_on_top_of_the_table() {
        let plan = plan(&[10, 15, 15]);
        let mut p = member();
        p.current_step_index = 2;
        p.dnf_partial_reps = Some(5);
        assert_eq!(reps_equivalent(&p, &plan), 30);
    }

    #[test]
    fn amrap_position_examples() {
        let plan = plan(&[10, 15, 15]);
        assert_eq!(amrap_position(0, &plan).unwrap(), (0, 0, 0));
        assert_eq!(amrap_position(30, &plan).unwrap(), (0, 2, 5));
        assert_eq!(amrap_position(40, &plan).unwrap(), (1, 0, 0));
        assert_eq!(amrap_position(-4, &plan).unwrap(), (0, 0, 0));
    }

    fn direction() -> impl Strategy<Value = Direction> {
        prop_oneof![Just(Direction::Next), Just(Direction::Prev)]
    }

    fn self_paced() -> impl Strategy<Value = WorkoutType> {
        prop_oneof![
            Just(WorkoutType::ForTime),
            Just(WorkoutType::Amrap),
            Just(WorkoutType::Emom)
        ]
    }

    proptest! {
        #[test]
        fn index_stays_within_the_plan(
            reps in prop::collection::vec(0_u32..30, 1..8),
            moves in prop::collection::vec(direction(), 0..60),
            workout_type in self_paced(),
        ) {
            let plan = plan(&reps);
            let last = plan.last_step_index().unwrap();
            let mut p = member();
            for (i, direction) in moves.into_iter().enumerate() {
                let i = i64::try_from(i).unwrap();
                apply_advance(&mut p, &plan, workout_type, direction, t(i), i);
                prop_assert!(p.current_step_index <= last);
            }
        }

        #[test]
        fn amrap_position_round_trips_through_reps_equivalent(
            reps in prop::collection::vec(1_u32..30, 1..8),
            total in 0_i64..2_000,
        ) {
            let plan = plan(&reps);
            let (rounds, index, partial) = amrap_position(total, &plan).unwrap();
            let mut p = member();
            p.rounds_completed = rounds;
            p.current_step_index = index;
            p.dnf_partial_reps = Some(partial);
            prop_assert!(index < plan.step_count());
            prop_assert_eq!(reps_equivalent(&p, &plan), total);
        }
    }
}
