//! Typed state store shared by the LumiQR business layer and its front ends.
//!
//! A [`StateCtx`] holds three kinds of values, all keyed by their Rust type:
//!
//! - [`State`]: plain inputs written by the view layer.
//! - [`Compute`]: values derived from states, or written by commands.
//! - [`Command`]: async operations spawned on a tokio `JoinSet`, which read a
//!   [`CommandSnapshot`] and report back through a [`LatestOnlyUpdater`].

mod command;
mod compute;
mod ctx;
mod dep;
mod error;
mod snapshot;
mod state;
mod state_sync_status;
mod task;

pub use command::{Command, CommandFuture};
pub use compute::{Compute, ComputeDeps, no_deps};
pub use ctx::StateCtx;
pub use dep::Dep;
pub use error::Error;
pub use snapshot::CommandSnapshot;
pub use state::{LatestOnlyUpdater, SnapshotClone, State, Updater, state_assign_impl};
pub use state_sync_status::StateSyncStatus;
pub use task::{TaskHandle, TaskId};
