//! Identifiers and handles for tasks spawned through a [`crate::StateCtx`].
//!
//! Every spawned task gets a [`TaskHandle`] wrapping a child `CancellationToken` of the
//! context's shutdown token. Cancelling the handle stops that one task; shutting the context
//! down stops all of them.

use tokio_util::sync::CancellationToken;

/// Unique identifier for a spawned task.
///
/// Combines a static kind label (e.g. `"list"`) with a generation counter that increases
/// with every spawn on the same context, so later tasks always compare greater.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    kind: &'static str,
    generation: u64,
}

impl TaskId {
    pub fn new(kind: &'static str, generation: u64) -> Self {
        Self { kind, generation }
    }

    pub fn kind(&self) -> &'static str {
        self.kind
    }

    /// Higher generation values indicate more recently spawned tasks.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

impl std::fmt::Display for TaskId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.kind, self.generation)
    }
}

/// Handle to a spawned task with cooperative cancellation.
///
/// Cancellation does not abort the task outright: the task races its work against
/// `cancelled()` and, when cancellation wins, finishes without reporting a result.
#[derive(Debug, Clone)]
pub struct TaskHandle {
    id: TaskId,
    cancel_token: CancellationToken,
}

impl TaskHandle {
    pub fn new(id: TaskId, cancel_token: CancellationToken) -> Self {
        Self { id, cancel_token }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn cancel(&self) {
        self.cancel_token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel_token.is_cancelled()
    }
}
