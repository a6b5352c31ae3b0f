use std::convert::Infallible;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum_extra::{headers, TypedHeader};
use futures_util::stream::{self, Stream, StreamExt};
use tokio_stream::wrappers::{errors::BroadcastStreamRecvError, BroadcastStream};

use crate::config::KEEP_ALIVE_TEXT;
use crate::models::AppState;

use super::helpers::outgoing_payload;

/// Push endpoint: the current snapshot first, then one event per change.
pub async fn sse_handler(
    State(state): State<AppState>,
    user_agent: Option<TypedHeader<headers::UserAgent>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let agent = user_agent
        .map(|TypedHeader(ua)| ua.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());
    tracing::info!(user_agent = %agent, "feed client connected");

    // Subscribe before reading the snapshot so no change falls in between.
    let rx = state.store.subscribe();
    let initial = current_payload(&state);

    let updates_state = state.clone();
    let updates = BroadcastStream::new(rx).filter_map(move |msg| {
        let payload = match msg {
            Ok(payload) => Some(payload),
            Err(BroadcastStreamRecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "feed client lagged, resending current snapshot");
                current_payload(&updates_state)
            }
        };
        let payload = payload.map(|p| outgoing_payload(&updates_state, p));
        futures_util::future::ready(payload)
    });

    let mut shutdown = state.shutdown_signal();
    let stream = stream::iter(initial.map(|p| outgoing_payload(&state, p)))
        .chain(updates)
        .map(|payload| Ok::<Event, Infallible>(Event::default().data(payload)))
        .take_until(async move {
            let _ = shutdown.wait_for(|stopping| *stopping).await;
        });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(state.keep_alive)
            .text(KEEP_ALIVE_TEXT),
    )
}

fn current_payload(state: &AppState) -> Option<String> {
    match state.store.snapshot_json() {
        Ok(payload) => Some(payload),
        Err(e) => {
            tracing::error!(%e, "Failed to encode snapshot");
            None
        }
    }
}
