use std::any::TypeId;
use std::collections::BTreeMap;

use crate::{Compute, State, StateSyncStatus};

pub(crate) type StateSlots = BTreeMap<TypeId, (Box<dyn State>, StateSyncStatus)>;
pub(crate) type ComputeSlots = BTreeMap<TypeId, (Box<dyn Compute>, StateSyncStatus)>;

/// Read-only view of the context handed to [`Compute::compute`].
pub struct Dep<'a> {
    states: &'a StateSlots,
    computes: &'a ComputeSlots,
}

impl<'a> Dep<'a> {
    pub(crate) fn new(states: &'a StateSlots, computes: &'a ComputeSlots) -> Self {
        Self { states, computes }
    }

    pub fn get_state_ref<T: State>(&self) -> Option<&'a T> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|(state, _)| state.as_any().downcast_ref::<T>())
    }

    pub fn get_compute_ref<T: Compute>(&self) -> Option<&'a T> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|(compute, _)| compute.as_any().downcast_ref::<T>())
    }
}
