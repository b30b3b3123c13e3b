//! HTTP routes
//!
//! `/` serves the viewer page, `/stream` opens one SSE connection per client.
//! Each connection gets its own subscription and `DeliveryLoop`; the loop
//! writes into a `ChannelSink` whose receiving half is the response body, so
//! a client hanging up closes the sink and the loop unsubscribes.

use std::borrow::Cow;
use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, Sse};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::{Stream, StreamExt};
use tower_http::trace::TraceLayer;

use crate::delivery::{ChannelSink, DeliveryLoop, StreamEvent};
use crate::hub::{BroadcastHub, HubError};

use super::page::INDEX_HTML;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    hub: Arc<BroadcastHub>,
    sink_buffer: usize,
}

impl AppState {
    /// Create handler state; `sink_buffer` is clamped to at least 1
    pub fn new(hub: Arc<BroadcastHub>, sink_buffer: usize) -> Self {
        Self {
            hub,
            sink_buffer: sink_buffer.max(1),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/stream", get(stream))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn stream(
    State(state): State<AppState>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, HubRejection> {
    let (sink, events) = ChannelSink::new(state.sink_buffer);
    let delivery = DeliveryLoop::subscribe(Arc::clone(&state.hub), sink).map_err(HubRejection)?;

    tracing::info!(
        subscriber = %delivery.id(),
        subscribers = state.hub.subscriber_count(),
        "Stream opened"
    );

    tokio::spawn(delivery.run());

    let body = ReceiverStream::new(events).map(|event| Ok(sse_event(&event)));
    Ok(Sse::new(body))
}

/// Convert a delivery event into an SSE frame
pub fn sse_event(event: &StreamEvent) -> Event {
    Event::default()
        .event(event.kind.as_str())
        .data(normalize_newlines(event.data.as_str()))
}

/// Fold `\r\n` and lone `\r` into `\n`
///
/// SSE treats all three as line breaks; the frame writer only accepts `\n`.
pub fn normalize_newlines(text: &str) -> Cow<'_, str> {
    if text.contains('\r') {
        Cow::Owned(text.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        Cow::Borrowed(text)
    }
}

/// Subscribe failure surfaced to the client
#[derive(Debug)]
pub struct HubRejection(pub HubError);

impl IntoResponse for HubRejection {
    fn into_response(self) -> Response {
        tracing::warn!(error = %self.0, "Stream rejected");
        (StatusCode::SERVICE_UNAVAILABLE, self.0.to_string()).into_response()
    }
}
