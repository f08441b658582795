use crate::util::{decode_enum, decode_json, encode_enum, encode_json, narrow, storage};
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeMap;
use wb_core::WodboardError;
use wb_core::types::ids::WorkoutId;
use wb_core::types::workout::{Exercise, Round, Subround, Workout, WorkoutMetadata};
use wb_core::workouts::WorkoutRepository;

pub struct WorkoutRepo<'a> {
    pub conn: &'a Connection,
}

impl<'a> WorkoutRepo<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Self { conn }
    }

    fn exercises(&self, id: WorkoutId) -> Result<Vec<Round>, WodboardError> {
        let mut stmt = self
            .conn
            .prepare(
                "SELECT round_number, subround_number, position, name, quantity_type, quantity, target_reps FROM workout_exercises WHERE workout_id = ?1 ORDER BY round_number, subround_number, position",
            )
            .map_err(storage)?;
        let mut rows = stmt.query([id.get()]).map_err(storage)?;
        let mut tree: BTreeMap<u32, BTreeMap<u32, Vec<Exercise>>> = BTreeMap::new();
        while let Some(row) = rows.next().map_err(storage)? {
            let round: i64 = row.get(0).map_err(storage)?;
            let subround: i64 = row.get(1).map_err(storage)?;
            let position: i64 = row.get(2).map_err(storage)?;
            let quantity_type: String = row.get(4).map_err(storage)?;
            let quantity: i64 = row.get(5).map_err(storage)?;
            let target_reps: Option<i64> = row.get(6).map_err(storage)?;
            let exercise = Exercise {
                position: narrow(position, "position")?,
                name: row.get(3).map_err(storage)?,
                quantity_type: decode_enum(&quantity_type)?,
                quantity: narrow(quantity, "quantity")?,
                target_reps: target_reps
                    .map(|value| narrow(value, "target_reps"))
                    .transpose()?,
            };
            tree.entry(narrow(round, "round_number")?)
                .or_default()
                .entry(narrow(subround, "subround_number")?)
                .or_default()
                .push(exercise);
        }
        Ok(tree
            .into_iter()
            .map(|(number, subrounds)| Round {
                number,
                subrounds: subrounds
                    .into_iter()
                    .map(|(number, exercises)| Subround { number, exercises })
                    .collect(),
            })
            .collect())
    }
}

impl WorkoutRepository for WorkoutRepo<'_> {
    fn get(&self, id: WorkoutId) -> Result<Option<Workout>, WodboardError> {
        let row = self
            .conn
            .query_row(
                "SELECT name, workout_type, metadata_json FROM workouts WHERE id = ?1",
                [id.get()],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()
            .map_err(storage)?;
        let Some((name, workout_type, metadata_json)) = row else {
            return Ok(None);
        };
        let metadata: WorkoutMetadata = decode_json(&metadata_json)?;
        Ok(Some(Workout {
            id,
            name,
            workout_type: decode_enum(&workout_type)?,
            metadata,
            rounds: self.exercises(id)?,
        }))
    }

    fn upsert(&self, workout: &Workout) -> Result<(), WodboardError> {
        self.conn
            .execute(
                "INSERT INTO workouts (id, name, workout_type, metadata_json) VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(id) DO UPDATE SET name = excluded.name, workout_type = excluded.workout_type, metadata_json = excluded.metadata_json",
                params![
                    workout.id.get(),
                    workout.name,
                    encode_enum(&workout.workout_type)?,
                    encode_json(&workout.metadata)?,
                ],
            )
            .map_err(storage)?;
        self.conn
            .execute(
                "DELETE FROM workout_exercises WHERE workout_id = ?1",
                [workout.id.get()],
            )
            .map_err(storage)?;
        let mut stmt = self
            .conn
            .prepare(
                "INSERT INTO workout_exercises (workout_id, round_number, subround_number, position, name, quantity_type, quantity, target_reps) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            )
            .map_err(storage)?;
        for round in &workout.rounds {
            for subround in &round.subrounds {
                for exercise in &subround.exercises {
                    stmt.execute(params![
                        workout.id.get(),
                        round.number,
                        subround.number,
                        exercise.position,
                        exercise.name,
                        encode_enum(&exercise.quantity_type)?,
                        exercise.quantity,
                        exercise.target_reps,
                    ])
                    .map_err(storage)?;
                }
            }
        }
        Ok(())
    }

    fn is_referenced(&self, id: WorkoutId) -> Result<bool, WodboardError> {
        self.conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM class_sessions WHERE workout_id = ?1)",
                [id.get()],
                |row| row.get(0),
            )
            .map_err(storage)
    }
}
