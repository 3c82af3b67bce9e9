use std::any::{Any, TypeId, type_name};

use flume::Sender;

use crate::TaskId;

/// Produces a detached copy of a value for a command snapshot.
///
/// Types that should not be visible to commands keep the default, which
/// leaves them out of the snapshot.
pub trait SnapshotClone {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        None
    }
}

/// A value owned by the [`StateCtx`](crate::StateCtx).
///
/// States are written by the view layer through [`StateCtx::update`](crate::StateCtx::update)
/// and read by commands through their snapshot.
pub trait State: SnapshotClone + Any + Send {
    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Replace `self` with a boxed value of the same concrete type.
    fn assign_box(&mut self, new_self: Box<dyn Any + Send>);
}

/// Shared body of [`State::assign_box`] implementations.
pub fn state_assign_impl<T: Any>(this: &mut T, new_self: Box<dyn Any + Send>) {
    match new_self.downcast::<T>() {
        Ok(value) => *this = *value,
        Err(_) => log::warn!("Ignored assignment of mismatched type to {}", type_name::<T>()),
    }
}

/// A pending write travelling from a command or compute back to the context.
pub(crate) struct Update {
    pub(crate) type_id: TypeId,
    pub(crate) name: &'static str,
    pub(crate) value: Box<dyn Any + Send>,
    pub(crate) origin: Option<TaskId>,
}

/// Sends new values for states and computes back to the owning context.
///
/// Values are applied on the next [`StateCtx::sync_computes`](crate::StateCtx::sync_computes).
#[derive(Clone)]
pub struct Updater {
    send: Sender<Update>,
}

impl Updater {
    pub(crate) fn new(send: Sender<Update>) -> Self {
        Self { send }
    }

    pub fn set<T: State>(&self, value: T) {
        self.send_update(value, None);
    }

    fn send_update<T: State>(&self, value: T, origin: Option<TaskId>) {
        let update = Update {
            type_id: TypeId::of::<T>(),
            name: type_name::<T>(),
            value: Box::new(value),
            origin,
        };
        if self.send.send(update).is_err() {
            log::debug!("State context dropped before update of {}", type_name::<T>());
        }
    }
}

/// Updater handed to commands.
///
/// Each update is tagged with the task that produced it. Once a newer run of
/// the same command has been flushed, updates from older runs are discarded.
#[derive(Clone)]
pub struct LatestOnlyUpdater {
    inner: Updater,
    task: TaskId,
}

impl LatestOnlyUpdater {
    pub(crate) fn new(inner: Updater, task: TaskId) -> Self {
        Self { inner, task }
    }

    pub fn set<T: State>(&self, value: T) {
        self.inner.send_update(value, Some(self.task));
    }

    pub fn task_id(&self) -> TaskId {
        self.task
    }
}
