//! Scan QR codes from files, stdin, or the clipboard.

use std::io::IsTerminal as _;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context as _, Result};
use lumiqr_business::{ScanDisplayCompute, ScanError, ScanFrameCommand, ScanFrameInput, ScannerCompute};
use lumiqr_input::{
    ClipboardSource, FileSource, Frame, FrameSource, StdinSource, copy_text_to_clipboard,
};
use lumiqr_states::StateCtx;
use serde_json::json;
use tracing::{debug, instrument};

use crate::context::flush_and_await;
use crate::output::Output;

#[derive(Debug, Clone, Default)]
pub struct ScanOptions {
    pub path: Option<PathBuf>,
    pub stdin: bool,
    pub clipboard: bool,
    pub watch: bool,
    pub interval: Duration,
    pub copy: bool,
    pub json: bool,
}

impl ScanOptions {
    /// A file wins, then explicit flags, then piped stdin, then the clipboard.
    fn source(&self) -> Box<dyn FrameSource> {
        if let Some(path) = &self.path {
            Box::new(FileSource::new(path))
        } else if self.clipboard || self.watch {
            Box::new(ClipboardSource)
        } else if self.stdin || !std::io::stdin().is_terminal() {
            Box::new(StdinSource::new())
        } else {
            Box::new(ClipboardSource)
        }
    }
}

/// Hand one frame to the scanner and wait for the result.
pub async fn scan_frame(ctx: &mut StateCtx, frame: Frame) {
    ctx.update::<ScanFrameInput>(|input| input.frame = Some(frame));
    ctx.enqueue_command::<ScanFrameCommand>();
    flush_and_await(ctx).await;
    ctx.update::<ScanFrameInput>(|input| input.frame = None);
}

#[instrument(skip_all, name = "scan", fields(watch = options.watch))]
pub async fn run_scan(mut ctx: StateCtx, options: ScanOptions) -> Result<()> {
    let out = Output::new();
    let mut source = options.source();

    if options.watch {
        watch_clipboard(&mut ctx, source.as_mut(), options.interval, &out).await;
    } else {
        let Some(frame) = source.next_frame().context("Failed to read image")? else {
            out.error("No image to scan");
            ctx.shutdown().await;
            std::process::exit(1);
        };
        scan_frame(&mut ctx, frame).await;
    }

    let scanner = ctx.compute::<ScannerCompute>().clone();
    if let Some(error) = &scanner.error {
        out.error(error);
        ctx.shutdown().await;
        std::process::exit(1);
    }
    let Some(first) = scanner.first() else {
        out.error(ScanError::NothingRecognized);
        ctx.shutdown().await;
        std::process::exit(1);
    };
    let display = ctx.compute::<ScanDisplayCompute>().display.clone();

    if options.json {
        out.print(serde_json::to_string_pretty(&json!({
            "barcodes": scanner.barcodes,
            "display": display,
        }))?);
    } else if let Some(display) = &display {
        out.scan_display(display);
        for extra in scanner.barcodes.iter().skip(1) {
            out.dim(format!("Also found: {}", extra.raw_value));
        }
    }

    if options.copy {
        copy_text_to_clipboard(&first.raw_value).context("Failed to copy to clipboard")?;
        out.success("Copied to clipboard");
    }

    ctx.shutdown().await;
    Ok(())
}

/// Poll `source` until a code is held or Ctrl+C is pressed.
async fn watch_clipboard(
    ctx: &mut StateCtx,
    source: &mut dyn FrameSource,
    interval: Duration,
    out: &Output,
) {
    out.info("Watching the clipboard for a QR code... (Ctrl+C to stop)");
    let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(50)));
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                out.dim("Stopped watching");
                return;
            }
            _ = ticker.tick() => {}
        }

        match source.next_frame() {
            Ok(Some(frame)) => scan_frame(ctx, frame).await,
            Ok(None) => {}
            Err(err) => debug!("Clipboard not readable yet: {err}"),
        }

        if ctx.compute::<ScannerCompute>().has_result() {
            return;
        }
    }
}
