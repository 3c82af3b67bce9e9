use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::{CommandSnapshot, LatestOnlyUpdater};

pub type CommandFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// An asynchronous operation triggered by the view layer.
///
/// `run` is called synchronously during [`StateCtx::flush_commands`](crate::StateCtx::flush_commands);
/// it should copy what it needs out of the snapshot and return a future that
/// reports progress and results through the updater.
pub trait Command: Send + Sync + 'static {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        cancel: CancellationToken,
    ) -> CommandFuture;
}
