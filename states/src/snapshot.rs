use std::any::{Any, TypeId, type_name};
use std::collections::BTreeMap;

use crate::{Compute, Error, State};

/// Cloned states and computes taken when a command is flushed.
///
/// Commands run detached from the context, so they only ever see this copy.
#[derive(Default)]
pub struct CommandSnapshot {
    states: BTreeMap<TypeId, Box<dyn Any + Send>>,
    computes: BTreeMap<TypeId, Box<dyn Any + Send>>,
}

impl CommandSnapshot {
    pub(crate) fn new(
        states: BTreeMap<TypeId, Box<dyn Any + Send>>,
        computes: BTreeMap<TypeId, Box<dyn Any + Send>>,
    ) -> Self {
        Self { states, computes }
    }

    pub fn try_state<T: State>(&self) -> Result<&T, Error> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .ok_or_else(|| Error::state_not_found(type_name::<T>(), "command snapshot"))
    }

    pub fn try_compute<T: Compute>(&self) -> Result<&T, Error> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|boxed| boxed.downcast_ref::<T>())
            .ok_or_else(|| Error::compute_not_found(type_name::<T>(), "command snapshot"))
    }

    /// # Panics
    ///
    /// Panics if `T` was not registered or does not implement a cloning [`SnapshotClone`](crate::SnapshotClone).
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>().unwrap_or_else(|e| panic!("{e}"))
    }

    /// # Panics
    ///
    /// Panics if `T` was not registered or does not implement a cloning [`SnapshotClone`](crate::SnapshotClone).
    pub fn compute<T: Compute>(&self) -> &T {
        self.try_compute::<T>().unwrap_or_else(|e| panic!("{e}"))
    }
}
