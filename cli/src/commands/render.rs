//! Render a specification file, plus the image delivery shared with `generate`.

use std::io::Read as _;
use std::path::Path;

use anyhow::{Context as _, Result, bail};
use lumiqr_business::{
    QrContentSpec, QrRenderer, SaveQrCommand, SaveQrCompute, SaveQrInput, SaveStatus,
    encode_payload, generator::SAVE_SUCCESS_MESSAGE, terminal_preview,
};
use lumiqr_states::StateCtx;
use tracing::instrument;

use crate::context::flush_and_await;
use crate::output::Output;

/// Where and whether to write a rendered image.
#[derive(Debug, Clone, Copy, Default)]
pub struct Delivery<'a> {
    pub output: Option<&'a Path>,
    pub no_save: bool,
    pub preview: bool,
}

#[instrument(skip_all, name = "render", fields(spec = %spec_path.display()))]
pub async fn run_render(mut ctx: StateCtx, spec_path: &Path, delivery: Delivery<'_>) -> Result<()> {
    let out = Output::new();

    let text = read_spec_text(spec_path)?;
    let spec: QrContentSpec = serde_json::from_str(&text)
        .with_context(|| format!("Invalid QR specification in {}", spec_path.display()))?;
    let payload = encode_payload(&spec.content);

    out.spec_summary(&spec, &payload);
    out.newline();
    let result = deliver(&mut ctx, &out, &spec, &payload, delivery).await;
    ctx.shutdown().await;
    result
}

fn read_spec_text(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("Failed to read specification from stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read specification: {}", path.display()))
}

/// Render `payload` with `spec`, then preview, write, or save it to the album.
#[instrument(skip_all, name = "deliver", fields(payload_len = payload.len()))]
pub async fn deliver(
    ctx: &mut StateCtx,
    out: &Output,
    spec: &QrContentSpec,
    payload: &str,
    delivery: Delivery<'_>,
) -> Result<()> {
    let rendered = QrRenderer::default()
        .render(payload, spec)
        .context("Failed to render QR code")?;

    if delivery.preview {
        out.print(terminal_preview(payload, spec.error_correction)?);
    }
    if delivery.no_save {
        out.dim("Image not saved (--no-save)");
        return Ok(());
    }

    let png = rendered.branded_png_bytes()?;
    if let Some(path) = delivery.output {
        std::fs::write(path, &png)
            .with_context(|| format!("Error saving image: {}", path.display()))?;
        out.success(format!("{SAVE_SUCCESS_MESSAGE}: {}", path.display()));
        return Ok(());
    }

    ctx.update::<SaveQrInput>(|input| {
        input.png = Some(png);
        input.directory = None;
    });
    ctx.enqueue_command::<SaveQrCommand>();
    flush_and_await(ctx).await;

    match &ctx.compute::<SaveQrCompute>().status {
        SaveStatus::Saved(path) => {
            out.success(SAVE_SUCCESS_MESSAGE);
            out.labeled("File", path.display());
            Ok(())
        }
        SaveStatus::Error(message) => bail!("{message}"),
        SaveStatus::Idle | SaveStatus::Saving => bail!("Save did not complete"),
    }
}
