pub mod coach;
pub mod error;
pub mod events;
pub mod health;
pub mod leaderboard;
pub mod live;
pub mod scores;
pub mod workouts;

use crate::middleware::correlation::correlation_middleware;
use crate::routes::error::invalid_input;
use crate::{AppState, openapi};
use axum::Router;
use axum::middleware;
use axum::response::Response;
use wb_core::types::ids::{ClassId, WorkoutId};

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(live::router(state.clone()))
        .merge(coach::router(state.clone()))
        .merge(leaderboard::router(state.clone()))
        .merge(workouts::router(state.clone()))
        .merge(scores::router(state.clone()))
        .merge(events::router(state.clone()))
        .merge(health::router(state))
        .merge(openapi::router())
        .route_layer(middleware::from_fn(correlation_middleware));

    Router::new().nest("/api", api)
}

pub(crate) fn parse_class_id(raw: &str, correlation_id: Option<&str>) -> Result<ClassId, Response> {
    ClassId::parse(raw)
        .map_err(|err| invalid_input(err.to_string(), correlation_id.map(str::to_string)))
}

pub(crate) fn parse_workout_id(
    raw: &str,
    correlation_id: Option<&str>,
) -> Result<WorkoutId, Response> {
    WorkoutId::parse(raw)
        .map_err(|err| invalid_input(err.to_string(), correlation_id.map(str::to_string)))
}
