use crate::routes::error::map_error;
use crate::{AppState, build_live};
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Response};
use futures::stream::{self, StreamExt};
use std::convert::Infallible;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use wb_core::types::ids::ClassId;
use wb_core::types::io::EventFilter;
use wb_events::types::EventRecord;

/// Stored events for the class after `after`, then live ones as they commit.
/// Clients re-read the leaderboard on each event.
pub async fn subscribe(
    state: AppState,
    class_id: ClassId,
    after: Option<i64>,
    correlation_id: String,
) -> Response {
    // Subscribe before reading history so nothing committed in between is lost.
    let receiver = state.event_bus.subscribe();
    let live = match build_live(&state) {
        Ok(live) => live,
        Err(err) => return map_error(&err, Some(correlation_id)).into_response(),
    };
    let filter = EventFilter {
        class_id: Some(class_id),
        after,
        limit: None,
    };
    let history = match live.events().list(&filter) {
        Ok(events) => events,
        Err(err) => return map_error(&err, Some(correlation_id)).into_response(),
    };
    let last_seq = history.last().map_or(after.unwrap_or(0), |event| event.seq);
    let history_stream = stream::iter(history.into_iter().map(|event| Ok(to_sse(&event))));

    let class = class_id.get();
    let live_stream = BroadcastStream::new(receiver).filter_map(move |item| async move {
        match item {
            Ok(event) if event.belongs_to(class) && event.seq > last_seq => {
                Some(Ok::<Event, Infallible>(to_sse(&event)))
            }
            Ok(_) => None,
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(class_id = class, skipped, "sse subscriber lagged");
                None
            }
        }
    });

    Sse::new(history_stream.chain(live_stream))
        .keep_alive(KeepAlive::default())
        .into_response()
}

fn to_sse(event: &EventRecord) -> Event {
    let json = serde_json::to_string(event).unwrap_or_else(|_| "{}".to_string());
    Event::default().id(event.seq.to_string()).data(json)
}
