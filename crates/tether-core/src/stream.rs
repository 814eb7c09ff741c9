//! Streaming event channel for an active session.
//!
//! The backend pushes `InboundEvent`s over server-sent events; this module
//! adapts the byte stream into typed events. Transport framing stays in
//! this module; the controller only ever sees parsed events.

use std::pin::Pin;

use async_trait::async_trait;
use eventsource_stream::{EventStream, Eventsource};
use futures_util::stream::BoxStream;
use futures_util::{Stream, StreamExt};
use tracing::debug;

use tether_types::InboundEvent;

use crate::api::{self, USER_AGENT};
use crate::error::{ApiError, ApiResult, classify_reqwest_error};

/// Ordered stream of events for one session, ending on connection close.
pub type SessionStream = BoxStream<'static, ApiResult<InboundEvent>>;

/// Source of per-session event streams.
///
/// Object-safe so the controller can be wired with test doubles.
#[async_trait]
pub trait EventChannel: Send + Sync {
    /// Opens the stream for the given session id.
    async fn connect(&self, session_id: &str) -> ApiResult<SessionStream>;
}

/// HTTP/SSE implementation of [`EventChannel`].
///
/// No timeout is applied: the channel stays open for the session's
/// lifetime and only ends on a terminal event or connection close.
pub struct SseChannel {
    base_url: String,
    http: reqwest::Client,
}

impl SseChannel {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            http: reqwest::Client::new(),
        }
    }
}

#[async_trait]
impl EventChannel for SseChannel {
    async fn connect(&self, session_id: &str) -> ApiResult<SessionStream> {
        let url = api::endpoint(&self.base_url, &["api", "sessions", session_id, "events"])?;
        debug!(%url, "connecting event stream");

        let response = self
            .http
            .get(url)
            .header("accept", "text/event-stream")
            .header("user-agent", USER_AGENT)
            .send()
            .await
            .map_err(|e| classify_reqwest_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::http_status(status.as_u16(), &body));
        }

        // Boxed so the parser's `Unpin` bound holds.
        Ok(Box::pin(EventParser::new(response.bytes_stream().boxed())))
    }
}

/// SSE parser that converts a byte stream into `InboundEvent`s.
///
/// Frames with empty data (keep-alives) are skipped; frames whose data is
/// not valid event JSON surface as `Parse` errors without ending the
/// stream.
pub struct EventParser<S> {
    inner: EventStream<S>,
}

impl<S> EventParser<S> {
    pub fn new(stream: S) -> Self
    where
        S: Eventsource,
    {
        Self {
            inner: stream.eventsource(),
        }
    }
}

impl<S, E> Stream for EventParser<S>
where
    S: Stream<Item = std::result::Result<bytes::Bytes, E>> + Unpin,
    E: std::error::Error + Send + Sync + 'static,
{
    type Item = ApiResult<InboundEvent>;

    fn poll_next(
        mut self: Pin<&mut Self>,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Option<Self::Item>> {
        use std::task::Poll;

        loop {
            match Pin::new(&mut self.inner).poll_next(cx) {
                Poll::Ready(Some(Ok(event))) => {
                    if event.data.trim().is_empty() {
                        continue;
                    }
                    return Poll::Ready(Some(parse_event_data(&event.data)));
                }
                Poll::Ready(Some(Err(e))) => {
                    return Poll::Ready(Some(Err(ApiError::parse(format!(
                        "SSE stream error: {e}"
                    )))));
                }
                Poll::Ready(None) => return Poll::Ready(None),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}

fn parse_event_data(data: &str) -> ApiResult<InboundEvent> {
    serde_json::from_str(data)
        .map_err(|e| ApiError::parse(format!("Malformed event payload: {e}")))
}
