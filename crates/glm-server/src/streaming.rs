//! Server-Sent Events (SSE) streaming for chat completions.
//!
//! Implements the OpenAI-compatible streaming protocol:
//! - Each chunk is sent as `data: {json}\n\n`
//! - Final message is `data: [DONE]\n\n`
//! - Stream stops immediately when the client disconnects (via CancellationToken).

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use futures::stream::{Stream, StreamExt};
use glm_engine::SnapshotStream;
use tokio_util::sync::CancellationToken;

use crate::assembler::ResponseAssembler;
use crate::framer::{self, FrameEvent};

/// Terminal SSE payload.
pub const DONE_SENTINEL: &str = "[DONE]";

/// Create an SSE stream of chat completion chunks.
///
/// The stream owns a drop guard for the framer's cancellation token. When the
/// client disconnects, axum drops the stream, which cancels the token and
/// abandons the engine's snapshot stream.
pub fn stream_chat_completion(
    assembler: ResponseAssembler,
    snapshots: SnapshotStream,
    chunk: bool,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let cancel = CancellationToken::new();
    let guard = cancel.clone().drop_guard();
    let frames = framer::frame_snapshots(snapshots, chunk, cancel);

    let stream = async_stream::stream! {
        let _guard = guard;
        let mut frames = Box::pin(frames);

        while let Some(frame) = frames.next().await {
            match frame {
                Ok(FrameEvent::Delta(delta)) => {
                    let envelope = assembler.chunk(delta);
                    match serde_json::to_string(&envelope) {
                        Ok(data) => yield Ok(Event::default().data(data)),
                        Err(err) => {
                            tracing::warn!(id = assembler.id(), error = %err, "failed to encode chunk");
                            return;
                        }
                    }
                }
                Ok(FrameEvent::Done) => yield Ok(Event::default().data(DONE_SENTINEL)),
                Err(err) => {
                    // Headers are already sent; ending without [DONE] signals failure.
                    tracing::warn!(id = assembler.id(), error = %err, "generation failed mid-stream");
                    return;
                }
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}
