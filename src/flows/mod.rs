//! Browser-facing flows
//!
//! Pairing and permission each run as one task per browser connection and
//! report progress over a bounded event queue. The HTTP layer turns that
//! queue into a server-sent event stream. The listing is request/response and
//! runs inside the handler.
//!
//! A flow's task watches a child of the process token. The [`FlowStream`]
//! holds a drop guard for that child, so when the browser goes away and the
//! response body is dropped the flow stops and its backend exchange is torn
//! down with it.

mod listing;
mod pairing;
mod permission;

use std::pin::Pin;
use std::task::{Context, Poll};

use futures::Stream;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::ReceiverStream;
use tokio_util::sync::DropGuard;

pub use listing::{list_permissions, PermissionEntry, PermissionListing};
pub use pairing::PairingFlow;
pub use permission::{PermissionFlow, PermissionPolicy};

/// Body of every pairing and permission event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowMessage {
    pub done: bool,
    pub msg: String,
}

impl FlowMessage {
    /// Informational message relayed from the authority
    pub fn progress(msg: impl Into<String>) -> Self {
        Self {
            done: false,
            msg: msg.into(),
        }
    }

    /// Terminal success
    pub fn done() -> Self {
        Self {
            done: true,
            msg: String::new(),
        }
    }

    /// Terminal denial
    pub fn denied() -> Self {
        Self {
            done: false,
            msg: String::new(),
        }
    }
}

/// How a flow ended
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// Pairing stored a session
    Bound,
    /// Permission granted and recorded
    Granted,
    /// Permission denied by the subject
    Denied,
    /// Backend or store failure
    Failed(String),
    /// Browser disconnected or the process is shutting down
    Cancelled,
}

/// Event stream of one running flow.
///
/// Dropping it cancels the flow.
pub struct FlowStream {
    events: ReceiverStream<FlowMessage>,
    _guard: DropGuard,
}

impl FlowStream {
    pub(crate) fn new(events: mpsc::Receiver<FlowMessage>, guard: DropGuard) -> Self {
        Self {
            events: ReceiverStream::new(events),
            _guard: guard,
        }
    }
}

impl Stream for FlowStream {
    type Item = FlowMessage;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.events).poll_next(cx)
    }
}

/// A started flow: its events and the task driving it
pub struct FlowHandle {
    pub events: FlowStream,
    pub task: JoinHandle<FlowOutcome>,
}

/// Push one event, returning false when the browser is gone.
pub(crate) async fn emit(events: &mpsc::Sender<FlowMessage>, message: FlowMessage) -> bool {
    events.send(message).await.is_ok()
}
