//! TOML seed files for workouts, classes and bookings.
//!
//! ```toml
//! [[workout]]
//! id = 1
//! name = "Fran"
//! type = "FOR_TIME"
//! metadata = { time_limit = 10 }
//!
//! [[workout.exercise]]
//! position = 1
//! name = "Thrusters"
//! quantity = 21
//!
//! [[class]]
//! id = 100
//! name = "6am WOD"
//! workout_id = 1
//! coach_id = 10
//! members = [20, 21]
//! ```

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use wb_core::types::class::{ClassInfo, ClassSeed};
use wb_core::types::enums::{QuantityType, WorkoutType};
use wb_core::types::ids::{ClassId, UserId, WorkoutId};
use wb_core::types::workout::{Exercise, Round, Subround, Workout, WorkoutMetadata};

#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid fixture file: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Fixtures {
    pub workouts: Vec<Workout>,
    pub classes: Vec<ClassSeed>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FixtureFile {
    #[serde(default)]
    workout: Vec<WorkoutFixture>,
    #[serde(default)]
    class: Vec<ClassFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WorkoutFixture {
    id: WorkoutId,
    name: String,
    #[serde(rename = "type")]
    workout_type: WorkoutType,
    #[serde(default)]
    metadata: WorkoutMetadata,
    #[serde(default, rename = "exercise")]
    exercises: Vec<ExerciseFixture>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ExerciseFixture {
    #[serde(default = "first")]
    round: u32,
    #[serde(default = "first")]
    subround: u32,
    position: u32,
    name: String,
    #[serde(default = "reps")]
    quantity_type: QuantityType,
    quantity: u32,
    #[serde(default)]
    target_reps: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ClassFixture {
    id: ClassId,
    name: String,
    #[serde(default)]
    workout_id: Option<WorkoutId>,
    #[serde(default)]
    coach_id: Option<UserId>,
    #[serde(default)]
    duration_minutes: Option<u32>,
    #[serde(default)]
    members: Vec<UserId>,
}

fn first() -> u32 {
    1
}

fn reps() -> QuantityType {
    QuantityType::Reps
}

pub fn load(path: &Path) -> Result<Fixtures, FixtureError> {
    let text = std::fs::read_to_string(path).map_err(|source| FixtureError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&text)
}

pub fn parse(text: &str) -> Result<Fixtures, FixtureError> {
    let file: FixtureFile = toml::from_str(text)?;
    Ok(Fixtures {
        workouts: file.workout.into_iter().map(into_workout).collect(),
        classes: file
            .class
            .into_iter()
            .map(|class| ClassSeed {
                class: ClassInfo {
                    id: class.id,
                    name: class.name,
                    workout_id: class.workout_id,
                    coach_id: class.coach_id,
                    duration_minutes: class.duration_minutes,
                },
                members: class.members,
            })
            .collect(),
    })
}

/// Builds the round/subround tree in stored order so a re-import compares
/// equal to what is already in the database.
fn into_workout(fixture: WorkoutFixture) -> Workout {
    let mut tree: BTreeMap<u32, BTreeMap<u32, Vec<Exercise>>> = BTreeMap::new();
    for exercise in fixture.exercises {
        tree.entry(exercise.round)
            .or_default()
            .entry(exercise.subround)
            .or_default()
            .push(Exercise {
                position: exercise.position,
                name: exercise.name,
                quantity_type: exercise.quantity_type,
                quantity: exercise.quantity,
                target_reps: exercise.target_reps,
            });
    }
    let rounds = tree
        .into_iter()
        .map(|(number, subrounds)| Round {
            number,
            subrounds: subrounds
                .into_iter()
                .map(|(number, mut exercises)| {
                    exercises.sort_by_key(|exercise| exercise.position);
                    Subround { number, exercises }
                })
                .collect(),
        })
        .collect();
    Workout {
        id: fixture.id,
        name: fixture.name,
        workout_type: fixture.workout_type,
        metadata: fixture.metadata,
        rounds,
    }
}
