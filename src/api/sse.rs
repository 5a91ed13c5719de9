//! Server-Sent Events support

use crate::runtime::SseEvent;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::Stream;
use std::convert::Infallible;
use std::time::Duration;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;

const KEEP_ALIVE_INTERVAL: Duration = Duration::from_secs(15);

/// The init snapshot first, then live session events
pub fn sse_stream(
    init_event: SseEvent,
    broadcast_rx: tokio::sync::broadcast::Receiver<SseEvent>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let init = futures::stream::once(async move { Ok(to_axum_event(&init_event)) });

    // A lagging subscriber skips what it missed
    let live = BroadcastStream::new(broadcast_rx)
        .filter_map(Result::ok)
        .map(|event| Ok(to_axum_event(&event)));

    Sse::new(init.chain(live)).keep_alive(
        KeepAlive::new()
            .interval(KEEP_ALIVE_INTERVAL)
            .text("ping"),
    )
}

fn to_axum_event(event: &SseEvent) -> Event {
    let data = serde_json::to_string(event).unwrap_or_else(|e| {
        tracing::error!(error = %e, event = event.name(), "Failed to serialize SSE event");
        String::from("{}")
    });
    Event::default().event(event.name()).data(data)
}
