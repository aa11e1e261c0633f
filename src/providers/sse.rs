//! Server-sent event decoding
//!
//! Turns a raw HTTP body, delivered as arbitrary byte chunks, into the `data:`
//! payload of each event.

use crate::error::{Result, TutorError};
use bytes::Bytes;
use futures::{Stream, StreamExt};
use std::collections::VecDeque;
use std::pin::Pin;

struct DecoderState<E> {
    inner: Pin<Box<dyn Stream<Item = std::result::Result<Bytes, E>> + Send>>,
    buffer: Vec<u8>,
    pending: VecDeque<String>,
    finished: bool,
}

/// Parse an SSE byte stream into event payloads
///
/// Field handling:
///
/// - `data:` lines of one event are joined with `\n`
/// - `event: ping` events and empty payloads are dropped
/// - lines starting with `:` and any other field are ignored
/// - `\r` bytes are discarded so CRLF framing behaves like LF
///
/// A read error is yielded once, as the typed [`TutorError`] it converts to,
/// and ends the stream. A trailing event without a terminating blank line is
/// still delivered.
pub fn parse_sse_stream<S, E>(byte_stream: S) -> impl Stream<Item = Result<String>> + Send
where
    S: Stream<Item = std::result::Result<Bytes, E>> + Send + 'static,
    E: Into<TutorError> + Send + 'static,
{
    let state = DecoderState {
        inner: Box::pin(byte_stream),
        buffer: Vec::new(),
        pending: VecDeque::new(),
        finished: false,
    };

    futures::stream::unfold(state, |mut state| async move {
        loop {
            if let Some(data) = state.pending.pop_front() {
                return Some((Ok(data), state));
            }
            if state.finished {
                return None;
            }

            match state.inner.next().await {
                Some(Ok(chunk)) => {
                    state
                        .buffer
                        .extend(chunk.iter().copied().filter(|b| *b != b'\r'));
                    while let Some(pos) = find_event_boundary(&state.buffer) {
                        let block: Vec<u8> = state.buffer.drain(..pos + 2).collect();
                        let text = String::from_utf8_lossy(&block[..pos]);
                        if let Some(data) = parse_event_block(&text) {
                            state.pending.push_back(data);
                        }
                    }
                }
                Some(Err(e)) => {
                    state.finished = true;
                    let err: TutorError = e.into();
                    tracing::debug!("Response body read failed: {}", err);
                    return Some((Err(err.into()), state));
                }
                None => {
                    state.finished = true;
                    let rest = std::mem::take(&mut state.buffer);
                    if let Some(data) = parse_event_block(&String::from_utf8_lossy(&rest)) {
                        state.pending.push_back(data);
                    }
                }
            }
        }
    })
}

fn find_event_boundary(buffer: &[u8]) -> Option<usize> {
    buffer.windows(2).position(|w| w == b"\n\n")
}

/// Extract the joined `data:` payload from one event block
pub(crate) fn parse_event_block(block: &str) -> Option<String> {
    let mut data_lines: Vec<&str> = Vec::new();
    let mut event_type: Option<&str> = None;

    for line in block.lines() {
        if let Some(value) = line.strip_prefix("data:") {
            data_lines.push(value.strip_prefix(' ').unwrap_or(value));
        } else if let Some(value) = line.strip_prefix("event:") {
            event_type = Some(value.trim());
        }
    }

    if matches!(event_type, Some(et) if et.eq_ignore_ascii_case("ping")) {
        return None;
    }

    let data = data_lines.join("\n");
    if data.trim().is_empty() {
        return None;
    }
    Some(data)
}
