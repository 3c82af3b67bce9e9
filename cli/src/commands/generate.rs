//! Natural-language QR generation.

use anyhow::{Context as _, Result};
use inquire::Text;
use lumiqr_business::{GenerateQrCommand, GenerateQrInput, GeneratorCompute, GeneratorStatus};
use lumiqr_states::StateCtx;
use tracing::{error, info, instrument};

use crate::commands::render::{Delivery, deliver};
use crate::context::flush_and_await;
use crate::output::Output;

#[instrument(skip_all, name = "generate")]
pub async fn run_generate(
    mut ctx: StateCtx,
    prompt: Option<String>,
    delivery: Delivery<'_>,
) -> Result<()> {
    let out = Output::new();

    let prompt = match prompt {
        Some(prompt) => prompt,
        None => Text::new("Describe your QR code:")
            .with_help_message("e.g. WiFi \"Casa\" with password hola123, blue dots")
            .prompt()
            .context("Failed to read prompt")?,
    };

    info!(prompt_len = prompt.len(), "Requesting QR specification");
    out.info("Generating...");
    ctx.update::<GenerateQrInput>(|input| input.prompt = prompt);
    ctx.enqueue_command::<GenerateQrCommand>();
    flush_and_await(&mut ctx).await;

    let status = ctx.compute::<GeneratorCompute>().status.clone();
    let (spec, payload) = match status {
        GeneratorStatus::Success { spec, payload } => (spec, payload),
        GeneratorStatus::Error(message) => {
            error!("Generation failed: {message}");
            out.error(message);
            ctx.shutdown().await;
            std::process::exit(1);
        }
        GeneratorStatus::Idle | GeneratorStatus::Loading => {
            out.error("Generation did not complete");
            ctx.shutdown().await;
            std::process::exit(1);
        }
    };

    out.newline();
    out.spec_summary(&spec, &payload);
    out.newline();

    let result = deliver(&mut ctx, &out, &spec, &payload, delivery).await;
    ctx.shutdown().await;
    result
}
