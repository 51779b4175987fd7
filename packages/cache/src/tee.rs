//! Forward an origin byte stream to the client while persisting it.
//!
//! The write side runs inside the same stream as the forwarding side: a
//! fragment is handed to the client first and persisted when the client polls
//! for the next one. The cache entry therefore shares the response's lifetime.
//! A dropped response (client disconnect) drops the writer before it can write
//! metadata, and an origin read error abandons it the same way.
//!
//! Hyper stops polling a body once its declared `Content-Length` has been
//! written, so when the origin declared a length the fragment that completes
//! it is persisted and the entry finalized before that fragment is forwarded.

use std::io;

use bytes::Bytes;
use futures::stream::{self, BoxStream, StreamExt};
use tracing::warn;

use crate::writer::ChunkWriter;

/// Lazy, single-pass byte stream handed to the HTTP layer.
pub type ByteStream = BoxStream<'static, io::Result<Bytes>>;

struct TeeState {
    origin: ByteStream,
    writer: Option<ChunkWriter>,
    pending: Option<Bytes>,
    expected_len: Option<u64>,
    received: u64,
    done: bool,
}

/// Build the client-facing stream. With `writer = None` the origin is passed
/// through untouched. `expected_len` is the origin's declared body length.
pub fn tee(
    origin: ByteStream,
    writer: Option<ChunkWriter>,
    expected_len: Option<u64>,
) -> ByteStream {
    let state = TeeState {
        origin,
        writer,
        pending: None,
        expected_len,
        received: 0,
        done: false,
    };

    stream::unfold(state, |mut state| async move {
        if state.done {
            return None;
        }

        if let Some(fragment) = state.pending.take()
            && let Some(writer) = state.writer.as_mut()
        {
            writer.push(&fragment).await;
        }

        loop {
            match state.origin.next().await {
                Some(Ok(fragment)) if fragment.is_empty() => continue,
                Some(Ok(fragment)) => {
                    state.received += fragment.len() as u64;
                    if state.expected_len == Some(state.received) {
                        state.done = true;
                        if let Some(mut writer) = state.writer.take() {
                            writer.push(&fragment).await;
                            writer.finish().await;
                        }
                    } else {
                        state.pending = Some(fragment.clone());
                    }
                    return Some((Ok(fragment), state));
                }
                Some(Err(e)) => {
                    warn!(error = %e, "Origin stream interrupted");
                    state.done = true;
                    if let Some(writer) = state.writer.take() {
                        writer.abandon("origin stream interrupted");
                    }
                    return Some((Err(e), state));
                }
                None => {
                    state.done = true;
                    if let Some(writer) = state.writer.take() {
                        writer.finish().await;
                    }
                    return None;
                }
            }
        }
    })
    .boxed()
}
