pub mod config;
pub mod middleware;
pub mod openapi;
pub mod routes;
pub mod sse;

use axum::Router;
use config::ServeConfig;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use wb_core::{LiveClass, WodboardError};
use wb_db::schema;
use wb_db::store::DbStore;
use wb_db::util::storage;
use wb_events::bus::EventBus;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServeConfig>,
    pub event_bus: EventBus,
}

impl AppState {
    pub fn new(config: ServeConfig) -> Self {
        let event_bus = EventBus::new(config.event_capacity);
        Self {
            config: Arc::new(config),
            event_bus,
        }
    }
}

/// One connection per request; the schema is migrated once by [`prepare_db`].
pub fn build_live(state: &AppState) -> Result<LiveClass<DbStore>, WodboardError> {
    let conn = schema::open(&state.config.db_path, state.config.busy_timeout()).map_err(storage)?;
    Ok(LiveClass::new(DbStore::new(conn), state.event_bus.clone()))
}

/// Creates the database directory and applies migrations.
pub fn prepare_db(config: &ServeConfig) -> Result<(), WodboardError> {
    let parent = Path::new(&config.db_path)
        .parent()
        .filter(|parent| !parent.as_os_str().is_empty());
    if let Some(parent) = parent {
        std::fs::create_dir_all(parent).map_err(|err| {
            WodboardError::internal(format!("cannot create {}: {err}", parent.display()))
        })?;
    }
    schema::open_and_migrate(&config.db_path, config.busy_timeout()).map_err(storage)?;
    Ok(())
}

pub fn app(state: AppState) -> Router {
    routes::router(state).layer(TraceLayer::new_for_http())
}

pub async fn serve(state: AppState) -> Result<(), std::io::Error> {
    let addr = state.config.addr();
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, db_path = %state.config.db_path, "wodboard listening");
    axum::serve(listener, app(state)).await
}
