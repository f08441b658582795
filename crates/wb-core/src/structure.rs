use crate::error::WorkoutError;
use crate::types::enums::{QuantityType, WorkoutType};
use crate::types::workout::{Exercise, Step, Workout, WorkoutMetadata, WorkoutPlan};
use std::collections::{BTreeMap, BTreeSet};

/// Flattens the round/subround tree into ordered steps plus the cumulative
/// rep table.
pub fn build_plan(workout: &Workout) -> WorkoutPlan {
    let base = base_steps(workout);
    let steps = match workout.workout_type {
        WorkoutType::Emom => group_by_subround(base),
        WorkoutType::ForTime | WorkoutType::Interval | WorkoutType::Tabata => {
            let repeats = workout.metadata.number_of_rounds.unwrap_or(1).max(1);
            repeat_single_round(base, repeats)
        }
        WorkoutType::Amrap => base,
    };
    let steps = reindex(steps);
    let cum_reps = cumulative_reps(&steps);
    WorkoutPlan { steps, cum_reps }
}

pub fn cumulative_reps(steps: &[Step]) -> Vec<i64> {
    let mut table = Vec::with_capacity(steps.len() + 1);
    let mut running = 0_i64;
    table.push(running);
    for step in steps {
        running += i64::from(step.reps.unwrap_or(0));
        table.push(running);
    }
    table
}

/// Cap in seconds derived when a session starts. The workout's own limit
/// wins, then what its format implies, then the class length.
pub fn time_cap_seconds(
    workout_type: WorkoutType,
    metadata: &WorkoutMetadata,
    plan: &WorkoutPlan,
    class_minutes: Option<u32>,
) -> Option<i64> {
    if let Some(minutes) = metadata.time_limit.filter(|minutes| *minutes > 0) {
        return Some(i64::from(minutes) * 60);
    }
    format_cap_seconds(workout_type, metadata, plan).or_else(|| {
        class_minutes
            .filter(|minutes| *minutes > 0)
            .map(|minutes| i64::from(minutes) * 60)
    })
}

fn format_cap_seconds(
    workout_type: WorkoutType,
    metadata: &WorkoutMetadata,
    plan: &WorkoutPlan,
) -> Option<i64> {
    match workout_type {
        WorkoutType::Emom => {
            let planned: i64 = metadata.emom_repeats.iter().map(|m| i64::from(*m)).sum();
            if planned > 0 {
                return Some(planned * 60);
            }
            let blocks = plan
                .steps
                .iter()
                .map(|step| step.round)
                .collect::<BTreeSet<_>>()
                .len();
            let blocks = i64::try_from(blocks).unwrap_or(i64::MAX / 60);
            (blocks > 0).then_some(blocks * 60)
        }
        WorkoutType::Interval | WorkoutType::Tabata => {
            let total: i64 = plan
                .steps
                .iter()
                .map(|step| i64::from(step.duration_seconds.unwrap_or(0)))
                .sum();
            (total > 0).then_some(total)
        }
        WorkoutType::ForTime | WorkoutType::Amrap => None,
    }
}

/// Rejects trees that cannot be flattened into something a member can follow.
pub fn validate(workout: &Workout) -> Result<(), WorkoutError> {
    if workout.name.trim().is_empty() {
        return Err(invalid("workout name is empty"));
    }
    let mut seen = BTreeSet::new();
    for round in &workout.rounds {
        for subround in &round.subrounds {
            for exercise in &subround.exercises {
                if exercise.name.trim().is_empty() {
                    return Err(invalid(format!(
                        "round {} subround {}: exercise name is empty",
                        round.number, subround.number
                    )));
                }
                if exercise.quantity == 0 {
                    return Err(invalid(format!(
                        "{}: quantity must be positive",
                        exercise.name
                    )));
                }
                if !seen.insert((round.number, subround.number, exercise.position)) {
                    return Err(invalid(format!(
                        "round {} subround {} position {} is used twice",
                        round.number, subround.number, exercise.position
                    )));
                }
            }
        }
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> WorkoutError {
    WorkoutError::InvalidStructure {
        message: message.into(),
    }
}

fn base_steps(workout: &Workout) -> Vec<Step> {
    let mut rows: Vec<(u32, u32, &Exercise)> = workout
        .rounds
        .iter()
        .flat_map(|round| {
            round.subrounds.iter().flat_map(move |subround| {
                subround
                    .exercises
                    .iter()
                    .map(move |exercise| (round.number, subround.number, exercise))
            })
        })
        .collect();
    rows.sort_by_key(|(round, subround, exercise)| (*round, *subround, exercise.position));

    let timed_only = workout.workout_type.is_interval();
    rows.into_iter()
        .enumerate()
        .map(|(index, (round, subround, exercise))| {
            step_for(index, round, subround, exercise, timed_only)
        })
        .collect()
}

fn step_for(index: usize, round: u32, subround: u32, exercise: &Exercise, timed_only: bool) -> Step {
    let quantity = exercise.quantity;
    let (label, reps, duration_seconds) =
        if timed_only || exercise.quantity_type == QuantityType::Duration {
            (format!("{} {quantity}s", exercise.name), None, Some(quantity))
        } else {
            (format!("{quantity}x {}", exercise.name), Some(quantity), None)
        };
    Step {
        index,
        label,
        round,
        subround,
        quantity_type: exercise.quantity_type,
        reps,
        duration_seconds,
        target_reps: exercise.target_reps,
    }
}

fn group_by_subround(steps: Vec<Step>) -> Vec<Step> {
    let mut groups: BTreeMap<u32, Vec<Step>> = BTreeMap::new();
    for step in steps {
        groups.entry(step.subround.max(1)).or_default().push(step);
    }
    groups
        .into_iter()
        .flat_map(|(block, group)| {
            group.into_iter().map(move |step| Step {
                round: block,
                ..step
            })
        })
        .collect()
}

fn repeat_single_round(steps: Vec<Step>, repeats: u32) -> Vec<Step> {
    let rounds: BTreeSet<u32> = steps.iter().map(|step| step.round).collect();
    if repeats <= 1 || rounds.len() != 1 {
        return steps;
    }
    (1..=repeats)
        .flat_map(|round| {
            steps.iter().map(move |step| Step {
                round,
                ..step.clone()
            })
        })
        .collect()
}

fn reindex(steps: Vec<Step>) -> Vec<Step> {
    steps
        .into_iter()
        .enumerate()
        .map(|(index, step)| Step { index, ..step })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ids::WorkoutId;
    use crate::types::workout::{Round, Subround};

    fn reps(position: u32, name: &str, quantity: u32) -> Exercise {
        Exercise {
            position,
            name: name.to_string(),
            quantity_type: QuantityType::Reps,
            quantity,
            target_reps: None,
        }
    }

    fn timed(position: u32, name: &str, seconds: u32) -> Exercise {
        Exercise {
            quantity_type: QuantityType::Duration,
            ..reps(position, name, seconds)
        }
    }

    fn workout(workout_type: WorkoutType, rounds: Vec<Round>) -> Workout {
        Workout {
            id: WorkoutId::new(1).unwrap(),
            name: "Test".to_string(),
            workout_type,
            metadata: WorkoutMetadata::default(),
            rounds,
        }
    }

    fn round(number: u32, subrounds: Vec<Subround>) -> Round {
        Round { number, subrounds }
    }

    fn sub(number: u32, exercises: Vec<Exercise>) -> Subround {
        Subround { number, exercises }
    }

    #[test]
    fn cum_table_starts_at_zero_and_ends_with_a_full_pass() {
        let w = workout(
            WorkoutType::ForTime,
            vec![round(
                1,
                vec![sub(
                    1,
                    vec![reps(1, "Thrusters", 10), reps(2, "Pull-ups", 15), reps(3, "Burpees", 15)],
                )],
            )],
        );
        let plan = build_plan(&w);
        assert_eq!(plan.cum_reps, vec![0, 10, 25, 40]);
        assert_eq!(plan.steps[1].label, "15x Pull-ups");
        assert_eq!(plan.reps_per_pass(), 40);
    }

    #[test]
    fn steps_follow_round_subround_position_order() {
        let w = workout(
            WorkoutType::Amrap,
            vec![
                round(2, vec![sub(1, vec![reps(1, "C", 3)])]),
                round(1, vec![sub(2, vec![reps(1, "B", 2)]), sub(1, vec![reps(2, "A2", 1), reps(1, "A1", 1)])]),
            ],
        );
        let labels: Vec<_> = build_plan(&w).steps.into_iter().map(|s| s.label).collect();
        assert_eq!(labels, vec!["1x A1", "1x A2", "2x B", "3x C"]);
    }

    #[test]
    fn duration_steps_do_not_count_reps() {
        let w = workout(
            WorkoutType::ForTime,
            vec![round(1, vec![sub(1, vec![timed(1, "Plank", 60), reps(2, "Squats", 20)])])],
        );
        let plan = build_plan(&w);
        assert_eq!(plan.steps[0].label, "Plank 60s");
        assert_eq!(plan.steps[0].duration_seconds, Some(60));
        assert_eq!(plan.cum_reps, vec![0, 0, 20]);
    }

    #[test]
    fn single_round_template_repeats() {
        let mut w = workout(
            WorkoutType::ForTime,
            vec![round(1, vec![sub(1, vec![reps(1, "Row", 5), reps(2, "Dips", 5)])])],
        );
        w.metadata.number_of_rounds = Some(3);
        let plan = build_plan(&w);
        assert_eq!(plan.step_count(), 6);
        assert_eq!(plan.steps[5].round, 3);
        assert_eq!(plan.steps[5].index, 5);
        assert_eq!(plan.cum_reps.last(), Some(&30));
    }

    #[test]
    fn multi_round_workouts_are_not_repeated() {
        let mut w = workout(
            WorkoutType::ForTime,
            vec![
                round(1, vec![sub(1, vec![reps(1, "Row", 5)])]),
                round(2, vec![sub(1, vec![reps(1, "Row", 5)])]),
            ],
        );
        w.metadata.number_of_rounds = Some(4);
        assert_eq!(build_plan(&w).step_count(), 2);
    }

    #[test]
    fn interval_labels_are_always_timed() {
        let w = workout(
            WorkoutType::Tabata,
            vec![round(1, vec![sub(1, vec![reps(1, "Air squat", 20), timed(2, "Rest", 10)])])],
        );
        let plan = build_plan(&w);
        assert_eq!(plan.steps[0].label, "Air squat 20s");
        assert_eq!(plan.steps[0].reps, None);
        assert_eq!(plan.cum_reps, vec![0, 0, 0]);
        assert_eq!(time_cap_seconds(WorkoutType::Tabata, &w.metadata, &plan, None), Some(30));
    }

    #[test]
    fn emom_regroups_by_subround() {
        let w = workout(
            WorkoutType::Emom,
            vec![
                round(1, vec![sub(1, vec![reps(1, "A", 1)]), sub(2, vec![reps(1, "B", 1)])]),
                round(2, vec![sub(1, vec![reps(1, "C", 1)])]),
            ],
        );
        let plan = build_plan(&w);
        let order: Vec<_> = plan.steps.iter().map(|s| (s.label.as_str(), s.round)).collect();
        assert_eq!(order, vec![("1x A", 1), ("1x C", 1), ("1x B", 2)]);
        assert_eq!(time_cap_seconds(WorkoutType::Emom, &w.metadata, &plan, None), Some(120));
    }

    #[test]
    fn cap_prefers_time_limit_then_emom_repeats() {
        let mut w = workout(WorkoutType::Emom, vec![round(1, vec![sub(1, vec![reps(1, "A", 1)])])]);
        w.metadata.emom_repeats = vec![1, 3, 2];
        let plan = build_plan(&w);
        assert_eq!(time_cap_seconds(WorkoutType::Emom, &w.metadata, &plan, None), Some(360));
        w.metadata.time_limit = Some(12);
        assert_eq!(time_cap_seconds(WorkoutType::Emom, &w.metadata, &plan, None), Some(720));
        assert_eq!(time_cap_seconds(WorkoutType::Amrap, &WorkoutMetadata::default(), &plan, None), None);
    }

    #[test]
    fn class_length_caps_workouts_without_a_limit() {
        let mut w = workout(WorkoutType::Amrap, vec![round(1, vec![sub(1, vec![reps(1, "A", 5)])])]);
        let plan = build_plan(&w);
        assert_eq!(time_cap_seconds(WorkoutType::Amrap, &w.metadata, &plan, Some(20)), Some(1200));
        assert_eq!(time_cap_seconds(WorkoutType::Amrap, &w.metadata, &plan, Some(0)), None);
        w.metadata.time_limit = Some(15);
        assert_eq!(time_cap_seconds(WorkoutType::Amrap, &w.metadata, &plan, Some(20)), Some(900));

        let tabata = workout(WorkoutType::Tabata, vec![round(1, vec![sub(1, vec![timed(1, "Row", 20)])])]);
        let plan = build_plan(&tabata);
        assert_eq!(time_cap_seconds(WorkoutType::Tabata, &tabata.metadata, &plan, Some(60)), Some(20));
    }

    #[test]
    fn validate_rejects_duplicate_positions_and_zero_quantities() {
        let w = workout(
            WorkoutType::ForTime,
            vec![round(1, vec![sub(1, vec![reps(1, "A", 1), reps(1, "B", 1)])])],
        );
        assert!(validate(&w).is_err());
        let w = workout(WorkoutType::ForTime, vec![round(1, vec![sub(1, vec![reps(1, "A", 0)])])]);
        assert!(validate(&w).is_err());
        let w = workout(WorkoutType::ForTime, vec![round(1, vec![sub(1, vec![reps(1, "A", 1)])])]);
        assert!(validate(&w).is_ok());
    }
}
