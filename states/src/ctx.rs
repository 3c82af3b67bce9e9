use std::any::{TypeId, type_name};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use flume::Receiver;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

use crate::dep::{ComputeSlots, StateSlots};
use crate::state::Update;
use crate::{
    Command, CommandSnapshot, Compute, Dep, Error, LatestOnlyUpdater, State, StateSyncStatus,
    TaskHandle, TaskId, Updater,
};

/// Upper bound on compute propagation rounds within one sync.
const MAX_SYNC_ROUNDS: usize = 16;

struct CommandEntry {
    name: &'static str,
    command: Arc<dyn Command>,
}

/// Owner of every state, compute and command of an application.
///
/// The view layer mutates inputs with [`StateCtx::update`], queues commands
/// with [`StateCtx::enqueue_command`] and spawns them with
/// [`StateCtx::flush_commands`]. Results flow back through an [`Updater`] and
/// land on the next [`StateCtx::sync_computes`].
pub struct StateCtx {
    states: StateSlots,
    computes: ComputeSlots,
    commands: BTreeMap<TypeId, CommandEntry>,
    queue: Vec<TypeId>,
    generations: BTreeMap<TypeId, u64>,
    running: BTreeMap<TypeId, TaskHandle>,
    tasks: JoinSet<()>,
    updater: Updater,
    recv: Receiver<Update>,
}

impl Default for StateCtx {
    fn default() -> Self {
        Self::new()
    }
}

impl StateCtx {
    pub fn new() -> Self {
        let (send, recv) = flume::unbounded();
        Self {
            states: BTreeMap::new(),
            computes: BTreeMap::new(),
            commands: BTreeMap::new(),
            queue: Vec::new(),
            generations: BTreeMap::new(),
            running: BTreeMap::new(),
            tasks: JoinSet::new(),
            updater: Updater::new(send),
            recv,
        }
    }

    pub fn add_state<T: State>(&mut self, state: T) {
        self.states.insert(
            TypeId::of::<T>(),
            (Box::new(state), StateSyncStatus::BeforeInit),
        );
    }

    pub fn record_compute<T: Compute>(&mut self, compute: T) {
        self.computes.insert(
            TypeId::of::<T>(),
            (Box::new(compute), StateSyncStatus::BeforeInit),
        );
    }

    pub fn record_command<C: Command>(&mut self, command: C) {
        self.commands.insert(
            TypeId::of::<C>(),
            CommandEntry {
                name: type_name::<C>(),
                command: Arc::new(command),
            },
        );
    }

    pub fn try_state<T: State>(&self) -> Result<&T, Error> {
        self.states
            .get(&TypeId::of::<T>())
            .and_then(|(state, _)| state.as_any().downcast_ref::<T>())
            .ok_or_else(|| Error::state_not_found(type_name::<T>(), "state context"))
    }

    pub fn try_compute<T: Compute>(&self) -> Result<&T, Error> {
        self.computes
            .get(&TypeId::of::<T>())
            .and_then(|(compute, _)| compute.as_any().downcast_ref::<T>())
            .ok_or_else(|| Error::compute_not_found(type_name::<T>(), "state context"))
    }

    /// # Panics
    ///
    /// Panics if `T` was never added with [`StateCtx::add_state`].
    pub fn state<T: State>(&self) -> &T {
        self.try_state::<T>().unwrap_or_else(|e| panic!("{e}"))
    }

    /// # Panics
    ///
    /// Panics if `T` was never added with [`StateCtx::record_compute`].
    pub fn compute<T: Compute>(&self) -> &T {
        self.try_compute::<T>().unwrap_or_else(|e| panic!("{e}"))
    }

    /// Mutate a state in place and mark it dirty.
    pub fn update<T: State>(&mut self, f: impl FnOnce(&mut T)) {
        let Some((state, status)) = self.states.get_mut(&TypeId::of::<T>()) else {
            log::warn!("Update of unregistered state {}", type_name::<T>());
            return;
        };
        let Some(value) = state.as_any_mut().downcast_mut::<T>() else {
            log::warn!("Update of mismatched state {}", type_name::<T>());
            return;
        };
        f(value);
        *status = StateSyncStatus::Dirty;
    }

    pub fn updater(&self) -> Updater {
        self.updater.clone()
    }

    pub fn enqueue_command<C: Command>(&mut self) {
        self.queue.push(TypeId::of::<C>());
    }

    /// Spawn every queued command on the task set.
    ///
    /// A command that is still running from an earlier flush is cancelled,
    /// and any update it already sent is discarded on sync.
    pub fn flush_commands(&mut self) {
        for type_id in std::mem::take(&mut self.queue) {
            let Some(entry) = self.commands.get(&type_id) else {
                log::warn!("Skipped unregistered command {type_id:?}");
                continue;
            };
            let name = entry.name;
            let command = Arc::clone(&entry.command);

            let generation = {
                let counter = self.generations.entry(type_id).or_insert(0);
                *counter += 1;
                *counter
            };
            let task_id = TaskId::new(type_id, generation);
            let handle = TaskHandle::new(task_id, CancellationToken::new());
            if let Some(previous) = self.running.insert(type_id, handle.clone()) {
                log::debug!("Cancelling superseded run of {name}");
                previous.cancel();
            }

            let cancel = handle.cancellation_token();
            let future = command.run(
                self.snapshot(),
                LatestOnlyUpdater::new(self.updater.clone(), task_id),
                cancel.clone(),
            );
            log::debug!("Spawning {name} (generation {generation})");
            self.tasks.spawn(async move {
                tokio::select! {
                    () = cancel.cancelled() => log::debug!("{name} cancelled"),
                    () = future => {}
                }
            });
        }
    }

    fn snapshot(&self) -> CommandSnapshot {
        let states = self
            .states
            .iter()
            .filter_map(|(id, (state, _))| state.clone_boxed().map(|boxed| (*id, boxed)))
            .collect();
        let computes = self
            .computes
            .iter()
            .filter_map(|(id, (compute, _))| compute.clone_boxed().map(|boxed| (*id, boxed)))
            .collect();
        CommandSnapshot::new(states, computes)
    }

    /// Apply pending updates, then re-run computes whose dependencies changed
    /// until nothing changes anymore.
    pub fn sync_computes(&mut self) {
        for _ in 0..MAX_SYNC_ROUNDS {
            self.apply_updates();

            let uninit: BTreeSet<TypeId> = self
                .computes
                .iter()
                .filter(|(_, (_, status))| *status == StateSyncStatus::BeforeInit)
                .map(|(id, _)| *id)
                .collect();
            let changed = self.take_changed();

            let to_run: Vec<TypeId> = self
                .computes
                .iter()
                .filter(|(id, (compute, _))| {
                    let (state_ids, compute_ids) = compute.deps();
                    uninit.contains(*id)
                        || state_ids
                            .iter()
                            .chain(compute_ids.iter())
                            .any(|dep| changed.contains(dep))
                })
                .map(|(id, _)| *id)
                .collect();
            if to_run.is_empty() {
                return;
            }

            for id in &to_run {
                if let Some((compute, _)) = self.computes.get(id) {
                    compute.compute(
                        Dep::new(&self.states, &self.computes),
                        self.updater.clone(),
                    );
                }
            }

            if self.recv.is_empty() {
                return;
            }
        }
        log::warn!("Computes did not settle after {MAX_SYNC_ROUNDS} rounds");
    }

    fn apply_updates(&mut self) {
        while let Ok(update) = self.recv.try_recv() {
            if let Some(origin) = update.origin
                && self
                    .running
                    .get(&origin.type_id())
                    .is_some_and(|latest| latest.id().supersedes(&origin))
            {
                log::debug!(
                    "Dropped stale update of {} from generation {}",
                    update.name,
                    origin.generation()
                );
                continue;
            }

            if let Some((state, status)) = self.states.get_mut(&update.type_id) {
                state.assign_box(update.value);
                *status = StateSyncStatus::Dirty;
            } else if let Some((compute, status)) = self.computes.get_mut(&update.type_id) {
                compute.assign_box(update.value);
                *status = StateSyncStatus::Dirty;
            } else {
                log::warn!("Dropped update of unregistered {}", update.name);
            }
        }
    }

    fn take_changed(&mut self) -> BTreeSet<TypeId> {
        let mut changed = BTreeSet::new();
        for (id, (_, status)) in &mut self.states {
            if *status != StateSyncStatus::Clean {
                changed.insert(*id);
                *status = StateSyncStatus::Clean;
            }
        }
        for (id, (_, status)) in &mut self.computes {
            if *status != StateSyncStatus::Clean {
                changed.insert(*id);
                *status = StateSyncStatus::Clean;
            }
        }
        changed
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn task_set_mut(&mut self) -> &mut JoinSet<()> {
        &mut self.tasks
    }

    /// Cancel every running command and wait for the task set to drain.
    pub async fn shutdown(&mut self) {
        for handle in self.running.values() {
            handle.cancel();
        }
        self.running.clear();
        self.queue.clear();
        self.tasks.shutdown().await;
    }
}

#[cfg(test)]
mod tests {
    use std::any::Any;
    use std::time::Duration;

    use super::*;
    use crate::{CommandFuture, SnapshotClone, no_deps, state_assign_impl};

    #[derive(Debug, Default, Clone)]
    struct Counter {
        value: i32,
    }

    impl SnapshotClone for Counter {
        fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
            Some(Box::new(self.clone()))
        }
    }

    impl State for Counter {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            state_assign_impl(self, new_self);
        }
    }

    #[derive(Debug, Default, Clone)]
    struct Doubled {
        value: i32,
    }

    impl SnapshotClone for Doubled {}

    impl State for Doubled {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            state_assign_impl(self, new_self);
        }
    }

    impl Compute for Doubled {
        fn deps(&self) -> crate::ComputeDeps {
            (vec![TypeId::of::<Counter>()], Vec::new())
        }

        fn compute(&self, deps: Dep<'_>, updater: Updater) {
            let value = deps.get_state_ref::<Counter>().map_or(0, |c| c.value * 2);
            updater.set(Self { value });
        }
    }

    #[derive(Debug, Default, Clone)]
    struct Echo {
        value: i32,
    }

    impl SnapshotClone for Echo {}

    impl State for Echo {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn as_any_mut(&mut self) -> &mut dyn Any {
            self
        }

        fn assign_box(&mut self, new_self: Box<dyn Any + Send>) {
            state_assign_impl(self, new_self);
        }
    }

    impl Compute for Echo {
        fn deps(&self) -> crate::ComputeDeps {
            no_deps()
        }

        fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}
    }

    struct EchoCommand;

    impl Command for EchoCommand {
        fn run(
            &self,
            snap: CommandSnapshot,
            updater: LatestOnlyUpdater,
            _cancel: CancellationToken,
        ) -> CommandFuture {
            let value = snap.state::<Counter>().value;
            Box::pin(async move {
                tokio::time::sleep(Duration::from_millis(5)).await;
                updater.set(Echo { value });
            })
        }
    }

    async fn settle(ctx: &mut StateCtx) {
        ctx.sync_computes();
        ctx.flush_commands();
        while ctx.task_count() > 0 {
            if ctx.task_set_mut().join_next().await.is_some() {
                ctx.sync_computes();
            }
        }
        ctx.sync_computes();
    }

    #[test]
    fn compute_follows_its_state() {
        let mut ctx = StateCtx::new();
        ctx.add_state(Counter::default());
        ctx.record_compute(Doubled::default());

        ctx.update::<Counter>(|c| c.value = 21);
        ctx.sync_computes();

        assert_eq!(ctx.compute::<Doubled>().value, 42);
    }

    #[test]
    fn missing_state_is_reported() {
        let ctx = StateCtx::new();
        assert!(matches!(
            ctx.try_state::<Counter>(),
            Err(Error::StateNotFound { .. })
        ));
    }

    #[tokio::test]
    async fn command_result_lands_after_sync() {
        let mut ctx = StateCtx::new();
        ctx.add_state(Counter { value: 7 });
        ctx.record_compute(Echo::default());
        ctx.record_command(EchoCommand);

        ctx.enqueue_command::<EchoCommand>();
        settle(&mut ctx).await;

        assert_eq!(ctx.compute::<Echo>().value, 7);
        assert_eq!(ctx.task_count(), 0);
    }

    #[tokio::test]
    async fn superseded_run_never_lands() {
        let mut ctx = StateCtx::new();
        ctx.add_state(Counter { value: 1 });
        ctx.record_compute(Echo::default());
        ctx.record_command(EchoCommand);

        ctx.enqueue_command::<EchoCommand>();
        ctx.flush_commands();

        ctx.update::<Counter>(|c| c.value = 2);
        ctx.enqueue_command::<EchoCommand>();
        settle(&mut ctx).await;

        assert_eq!(ctx.compute::<Echo>().value, 2);
    }

    #[tokio::test]
    async fn shutdown_cancels_running_commands() {
        let mut ctx = StateCtx::new();
        ctx.add_state(Counter { value: 3 });
        ctx.record_compute(Echo::default());
        ctx.record_command(EchoCommand);

        ctx.enqueue_command::<EchoCommand>();
        ctx.flush_commands();
        ctx.shutdown().await;
        ctx.sync_computes();

        assert_eq!(ctx.task_count(), 0);
        assert_eq!(ctx.compute::<Echo>().value, 0);
    }
}
