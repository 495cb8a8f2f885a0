//! Turns cumulative generation snapshots into streamed delta events.
//!
//! Event order for one request:
//! 1. an opening event carrying `role=assistant`
//! 2. one content event per snapshot with a non-empty fragment
//! 3. a closing event with `finish_reason=stop`
//! 4. [`FrameEvent::Done`]
//!
//! Steps 3 and 4 are skipped when the engine fails or the request is
//! cancelled.

use futures::stream::{Stream, StreamExt};
use glm_engine::{EngineError, GenerationSnapshot, Role};
use tokio_util::sync::CancellationToken;

use crate::models::{ChatChoiceDelta, FinishReason};

/// One unit of framer output.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameEvent {
    Delta(ChatChoiceDelta),
    /// Terminal sentinel; nothing follows it.
    Done,
}

/// Per-request diffing state.
#[derive(Debug, Default)]
pub struct DeltaFramer {
    chunk: bool,
    previous_text: String,
}

impl DeltaFramer {
    pub fn new(chunk: bool) -> Self {
        Self {
            chunk,
            previous_text: String::new(),
        }
    }

    pub fn opening(&self) -> ChatChoiceDelta {
        ChatChoiceDelta::role(Role::Assistant)
    }

    pub fn closing(&self) -> ChatChoiceDelta {
        ChatChoiceDelta::finish(FinishReason::Stop)
    }

    /// Event for the next snapshot, or `None` when its fragment is empty.
    pub fn advance(&mut self, snapshot: &GenerationSnapshot) -> Option<ChatChoiceDelta> {
        let fragment = if self.chunk {
            let suffix = suffix_after(&snapshot.text, &self.previous_text);
            self.previous_text.clone_from(&snapshot.text);
            suffix
        } else {
            snapshot.text.clone()
        };

        if fragment.is_empty() {
            None
        } else {
            Some(ChatChoiceDelta::content(fragment))
        }
    }
}

/// Text past the previously emitted prefix.
///
/// Snapshots normally extend the previous one; if one does not, the first
/// `previous.chars().count()` characters are skipped.
fn suffix_after(text: &str, previous: &str) -> String {
    match text.strip_prefix(previous) {
        Some(suffix) => suffix.to_string(),
        None => text.chars().skip(previous.chars().count()).collect(),
    }
}

/// Frame an engine snapshot stream.
///
/// Stops without a closing event when `cancel` fires or the engine yields an
/// error; the error is passed through as the final item.
pub fn frame_snapshots<S>(
    snapshots: S,
    chunk: bool,
    cancel: CancellationToken,
) -> impl Stream<Item = Result<FrameEvent, EngineError>>
where
    S: Stream<Item = Result<GenerationSnapshot, EngineError>> + Send + 'static,
{
    async_stream::stream! {
        let mut framer = DeltaFramer::new(chunk);
        yield Ok(FrameEvent::Delta(framer.opening()));

        let mut snapshots = Box::pin(snapshots);
        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::debug!("stream cancelled by client disconnect");
                    return;
                }
                next = snapshots.next() => next,
            };

            match next {
                Some(Ok(snapshot)) => {
                    if let Some(delta) = framer.advance(&snapshot) {
                        yield Ok(FrameEvent::Delta(delta));
                    }
                }
                Some(Err(err)) => {
                    yield Err(err);
                    return;
                }
                None => break,
            }
        }

        if cancel.is_cancelled() {
            return;
        }
        yield Ok(FrameEvent::Delta(framer.closing()));
        yield Ok(FrameEvent::Done);
    }
}
