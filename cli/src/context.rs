//! State context initialization and task management utilities.

use lumiqr_business::{
    BusinessConfig, GenerateQrCommand, GenerateQrInput, GeneratorCompute, ResetScannerCommand,
    SaveQrCommand, SaveQrCompute, SaveQrInput, ScanDisplayCompute, ScanFrameCommand,
    ScanFrameInput, ScannerCompute,
};
use lumiqr_states::StateCtx;
use tracing::instrument;

/// Initialize `StateCtx` with the generator and scanner flows.
pub fn build_state_ctx(config: BusinessConfig) -> StateCtx {
    let mut ctx = StateCtx::new();

    ctx.add_state(config);

    // Generator
    ctx.add_state(GenerateQrInput::default());
    ctx.record_compute(GeneratorCompute::default());
    ctx.add_state(SaveQrInput::default());
    ctx.record_compute(SaveQrCompute::default());

    // Scanner
    ctx.add_state(ScanFrameInput::default());
    ctx.record_compute(ScannerCompute::default());
    ctx.record_compute(ScanDisplayCompute::default());

    ctx.record_command(GenerateQrCommand);
    ctx.record_command(SaveQrCommand);
    ctx.record_command(ScanFrameCommand);
    ctx.record_command(ResetScannerCommand);

    ctx
}

/// Await all pending tasks in the `JoinSet` and sync computes.
#[instrument(skip_all, name = "await_tasks")]
pub async fn await_pending_tasks(ctx: &mut StateCtx) {
    while ctx.task_count() > 0 {
        if ctx.task_set_mut().join_next().await.is_some() {
            ctx.sync_computes();
        }
    }
}

/// Flush commands and await all spawned tasks.
#[instrument(skip_all, name = "flush")]
pub async fn flush_and_await(ctx: &mut StateCtx) {
    ctx.sync_computes();
    ctx.flush_commands();
    await_pending_tasks(ctx).await;
    ctx.sync_computes();
}
