use crate::middleware::correlation::CorrelationId;
use crate::routes::error::map_error;
use crate::AppState;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Extension, Json, Router};
use serde::Serialize;
use utoipa::ToSchema;
use wb_core::WodboardError;
use wb_db::schema;
use wb_db::util::storage;

#[derive(Debug, Serialize, ToSchema)]
pub struct Health {
    pub status: &'static str,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .with_state(state)
}

/// Pings SQLite on a blocking thread; a ping slower than the configured
/// timeout reports `STORAGE_TIMEOUT`.
#[utoipa::path(
    get,
    path = "/api/health",
    responses((status = 200, body = Health), (status = 503))
)]
pub(crate) async fn health(
    State(state): State<AppState>,
    Extension(correlation): Extension<CorrelationId>,
) -> Response {
    let config = state.config.clone();
    let ping = tokio::task::spawn_blocking(move || -> Result<(), WodboardError> {
        let conn = schema::open(&config.db_path, config.busy_timeout()).map_err(storage)?;
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))
            .map_err(storage)?;
        Ok(())
    });
    let result = match tokio::time::timeout(state.config.health_timeout(), ping).await {
        Ok(Ok(result)) => result,
        Ok(Err(join)) => Err(WodboardError::internal(join.to_string())),
        Err(_) => Err(WodboardError::StorageTimeout {
            message: format!(
                "health check exceeded {}ms",
                state.config.health_timeout_ms
            ),
        }),
    };
    match result {
        Ok(()) => Json(Health { status: "ok" }).into_response(),
        Err(err) => map_error(&err, Some(correlation.0)).into_response(),
    }
}
