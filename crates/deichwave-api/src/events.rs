// Server push channel
//
// The box publishes state-change notifications as server-sent events on
// `{base}sse?stream=events`. Each `data:` payload is a JSON object
// `{origin, type, name}`. This module frames the byte stream into events,
// decodes the payloads, and exposes them as a `Stream`.
//
// Malformed payloads are logged and skipped. The stream always ends with
// a single `Err(Error::StreamClosed)` so consumers can tell a broken or
// finished channel apart from a quiet one.

use std::fmt;
use std::pin::Pin;

use futures_core::Stream;
use futures_util::StreamExt;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, info, trace};

use crate::client::ApiClient;
use crate::error::Error;

/// One notification from the server's push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PushEvent {
    /// Subsystem that emitted the event (`music`, `audio`, `config`, ...).
    pub origin: String,
    /// What happened (`playing`, `position`, `volume`, ...).
    #[serde(rename = "type")]
    pub kind: String,
    /// Entity the event concerns, e.g. a playlist name.
    ///
    /// The server always sends the field; an empty string means "none".
    #[serde(default, deserialize_with = "empty_as_none")]
    pub name: Option<String>,
}

impl PushEvent {
    pub fn new(origin: &str, kind: &str, name: Option<&str>) -> Self {
        Self {
            origin: origin.to_owned(),
            kind: kind.to_owned(),
            name: name.map(str::to_owned),
        }
    }
}

impl fmt::Display for PushEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{}/{} ({name})", self.origin, self.kind),
            None => write!(f, "{}/{}", self.origin, self.kind),
        }
    }
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let name = Option::<String>::deserialize(deserializer)?;
    Ok(name.filter(|n| !n.is_empty()))
}

/// A boxed stream of push events.
pub type EventStream = Pin<Box<dyn Stream<Item = Result<PushEvent, Error>> + Send>>;

// ── SSE framing ──────────────────────────────────────────────────────

/// Largest event block accepted before its terminating blank line.
pub const MAX_EVENT_BYTES: usize = 64 * 1024;

/// Incremental `text/event-stream` framer.
///
/// Feed raw chunks in; complete events come out as their joined `data`
/// payload. Comment lines and the `event`, `id` and `retry` fields are
/// ignored since the server only uses unnamed message events. A pending
/// block larger than [`MAX_EVENT_BYTES`] is an error.
#[derive(Debug, Default)]
pub struct SseDecoder {
    buffer: Vec<u8>,
}

impl SseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return the data of every event it completed.
    pub fn push(&mut self, chunk: &[u8]) -> Result<Vec<String>, Error> {
        self.buffer.extend(chunk.iter().copied().filter(|b| *b != b'\r'));

        let mut out = Vec::new();
        while let Some(end) = find_blank_line(&self.buffer) {
            let block: Vec<u8> = self.buffer.drain(..end + 2).collect();
            if let Some(data) = parse_block(&String::from_utf8_lossy(&block)) {
                out.push(data);
            }
        }
        if self.buffer.len() > MAX_EVENT_BYTES {
            let pending = self.buffer.len();
            self.buffer.clear();
            return Err(Error::StreamClosed {
                reason: format!("event exceeded {MAX_EVENT_BYTES} bytes ({pending} pending)"),
            });
        }
        Ok(out)
    }
}

fn find_blank_line(buf: &[u8]) -> Option<usize> {
    buf.windows(2).position(|w| w == b"\n\n")
}

fn parse_block(block: &str) -> Option<String> {
    let mut data: Vec<&str> = Vec::new();
    for line in block.lines() {
        if line.is_empty() || line.starts_with(':') {
            continue;
        }
        let (field, value) = line.split_once(':').unwrap_or((line, ""));
        if field == "data" {
            data.push(value.strip_prefix(' ').unwrap_or(value));
        }
    }
    if data.is_empty() {
        None
    } else {
        Some(data.join("\n"))
    }
}

/// Turn a raw byte stream into a stream of decoded push events.
pub fn decode_events<S, B, E>(bytes: S) -> EventStream
where
    S: Stream<Item = Result<B, E>> + Send + 'static,
    B: AsRef<[u8]> + Send + 'static,
    E: fmt::Display + Send + 'static,
{
    Box::pin(async_stream::stream! {
        let mut decoder = SseDecoder::new();
        let mut bytes = std::pin::pin!(bytes);

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    let completed = match decoder.push(chunk.as_ref()) {
                        Ok(completed) => completed,
                        Err(e) => {
                            yield Err(e);
                            return;
                        }
                    };
                    for data in completed {
                        match serde_json::from_str::<PushEvent>(&data) {
                            Ok(event) => {
                                trace!(%event, "push event");
                                yield Ok(event);
                            }
                            Err(e) => {
                                debug!(error = %e, data = %data, "skipping malformed push event");
                            }
                        }
                    }
                }
                Err(e) => {
                    yield Err(Error::StreamClosed { reason: e.to_string() });
                    return;
                }
            }
        }

        yield Err(Error::StreamClosed {
            reason: "server ended the event stream".into(),
        });
    })
}

impl ApiClient {
    /// Open the push channel on the resolved host.
    ///
    /// Waits for host resolution like every other call.
    pub async fn events(&self) -> Result<EventStream, Error> {
        let base = self.base_url().await?;
        let url = base.events_url();
        debug!(%url, "opening event stream");

        let resp = self
            .http()
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache")
            .send()
            .await
            .map_err(|e| Error::StreamConnect(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::StreamConnect(format!("HTTP {status}")));
        }

        info!(host = %base, "event stream connected");
        Ok(decode_events(resp.bytes_stream()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn decoder_joins_split_chunks() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: {\"origin\":").unwrap().is_empty());
        let out = decoder.push(b"\"music\"}\n\n").unwrap();
        assert_eq!(out, vec![r#"{"origin":"music"}"#.to_owned()]);
    }

    #[test]
    fn decoder_handles_crlf_and_multiline_data() {
        let mut decoder = SseDecoder::new();
        let out = decoder
            .push(b"data: a\r\ndata: b\r\n\r\ndata: c\n\n")
            .unwrap();
        assert_eq!(out, vec!["a\nb".to_owned(), "c".to_owned()]);
    }

    #[test]
    fn decoder_ignores_comments_and_other_fields() {
        let mut decoder = SseDecoder::new();
        let out = decoder
            .push(b": keepalive\n\nevent: ping\nid: 7\nretry: 100\n\ndata:x\n\n")
            .unwrap();
        assert_eq!(out, vec!["x".to_owned()]);
    }

    #[test]
    fn decoder_rejects_unterminated_oversized_event() {
        let mut decoder = SseDecoder::new();
        assert!(decoder.push(b"data: ").unwrap().is_empty());
        let flood = vec![b'a'; MAX_EVENT_BYTES];
        assert!(matches!(
            decoder.push(&flood),
            Err(Error::StreamClosed { .. })
        ));

        // The buffer was dropped; later events decode normally.
        assert_eq!(decoder.push(b"data: ok\n\n").unwrap(), vec!["ok".to_owned()]);
    }

    #[tokio::test]
    async fn decode_events_ends_on_oversized_event() {
        let chunks: Vec<Result<Vec<u8>, std::io::Error>> = vec![
            Ok(br#"data: {"origin":"audio","type":"volume"}"#.to_vec()),
            Ok(b"\n\n".to_vec()),
            Ok(vec![b'x'; MAX_EVENT_BYTES + 1]),
            Ok(b"\n\n".to_vec()),
        ];
        let mut events = decode_events(futures_util::stream::iter(chunks));

        assert_eq!(
            events.next().await.unwrap().unwrap(),
            PushEvent::new("audio", "volume", None)
        );
        assert!(matches!(
            events.next().await.unwrap(),
            Err(Error::StreamClosed { .. })
        ));
        assert!(events.next().await.is_none());
    }

    #[test]
    fn push_event_empty_name_is_none() {
        let event: PushEvent =
            serde_json::from_str(r#"{"origin":"config","type":"changed","name":""}"#).unwrap();
        assert_eq!(event, PushEvent::new("config", "changed", None));
    }

    #[test]
    fn push_event_display() {
        let event = PushEvent::new("music", "position", Some("party"));
        assert_eq!(event.to_string(), "music/position (party)");
    }

    #[tokio::test]
    async fn decode_events_skips_garbage_and_reports_close() {
        let chunks: Vec<Result<&'static [u8], std::io::Error>> = vec![
            Ok(b"data: not json\n\n"),
            Ok(b"data: {\"origin\":\"audio\",\"type\":\"volume\",\"name\":\"\"}\n\n"),
        ];
        let mut events = decode_events(futures_util::stream::iter(chunks));

        let first = events.next().await.unwrap().unwrap();
        assert_eq!(first, PushEvent::new("audio", "volume", None));

        let closed = events.next().await.unwrap();
        assert!(matches!(closed, Err(Error::StreamClosed { .. })));
        assert!(events.next().await.is_none());
    }

    #[tokio::test]
    async fn decode_events_surfaces_transport_errors() {
        let chunks: Vec<Result<&'static [u8], std::io::Error>> =
            vec![Err(std::io::Error::other("reset"))];
        let mut events = decode_events(futures_util::stream::iter(chunks));

        match events.next().await.unwrap() {
            Err(Error::StreamClosed { reason }) => assert_eq!(reason, "reset"),
            other => panic!("expected StreamClosed, got {other:?}"),
        }
        assert!(events.next().await.is_none());
    }
}
