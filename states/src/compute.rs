use std::any::TypeId;

use crate::{Dep, State, Updater};

/// Dependencies of a compute: `(state ids, compute ids)`.
pub type ComputeDeps = (Vec<TypeId>, Vec<TypeId>);

/// A value derived from other states and computes.
///
/// [`Compute::compute`] runs during [`StateCtx::sync_computes`](crate::StateCtx::sync_computes)
/// whenever one of its dependencies changed, and publishes its new value
/// through the given [`Updater`]. Computes that are only written by commands
/// declare no dependencies and leave `compute` empty.
pub trait Compute: State {
    fn deps(&self) -> ComputeDeps;

    fn compute(&self, deps: Dep<'_>, updater: Updater);
}

/// Shorthand for computes without dependencies.
pub fn no_deps() -> ComputeDeps {
    (Vec::new(), Vec::new())
}
