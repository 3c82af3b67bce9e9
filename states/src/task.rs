//! Identity and cancellation of command runs.
//!
//! Every flushed command gets a [`TaskId`] made of the command's `TypeId` and a
//! per-command generation counter. The context keeps one [`TaskHandle`] per
//! command type; flushing the same command again cancels the previous handle.

use std::any::TypeId;

use tokio_util::sync::CancellationToken;

/// Identifies one run of a command.
///
/// Two runs of the same command share the `type_id`; the later run has the
/// higher `generation`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId {
    type_id: TypeId,
    generation: u64,
}

impl TaskId {
    pub fn new(type_id: TypeId, generation: u64) -> Self {
        Self { type_id, generation }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `self` belongs to the same command as `other` and was started after it.
    pub fn supersedes(&self, other: &Self) -> bool {
        self.type_id == other.type_id && self.generation > other.generation
    }
}

/// A running command together with its cancellation token.
///
/// Cancellation is cooperative: the context races the command future against
/// [`CancellationToken::cancelled`], and long-running commands may check the
/// token themselves.
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
