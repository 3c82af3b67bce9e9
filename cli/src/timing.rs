//! Tracing setup, including span timing for `--timing`.
//!
//! Command entry points are `#[instrument]`ed; with `FmtSpan::CLOSE` each
//! span reports its busy and idle time when it ends. Records emitted through
//! the `log` facade by the library crates are forwarded into the same
//! subscriber.

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    prelude::*,
};

/// Default level for the given flags: DEBUG when verbose, INFO when timing
/// (span close events are INFO), WARN otherwise.
pub fn default_level(verbose: bool, timing: bool) -> LevelFilter {
    if verbose {
        LevelFilter::DEBUG
    } else if timing {
        LevelFilter::INFO
    } else {
        LevelFilter::WARN
    }
}

/// Install the global subscriber. `RUST_LOG` still refines the filter.
pub fn init_tracing(verbose: bool, timing: bool) {
    let filter = EnvFilter::builder()
        .with_default_directive(default_level(verbose, timing).into())
        .from_env_lossy();

    let span_events = if timing {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(verbose)
                .with_level(true)
                .with_span_events(span_events)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}
