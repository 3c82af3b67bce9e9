//! `lumiqr`: generate styled QR codes from a description, or scan them.

#![allow(clippy::exit)]

mod cli;
mod commands;
mod config;
mod context;
mod output;
mod timing;

use std::time::Duration;

use anyhow::Result;
use clap::Parser as _;
use lumiqr_states::StateCtx;

use crate::cli::{Cli, Commands};
use crate::commands::{Delivery, ScanOptions};
use crate::config::{Config, Overrides};
use crate::context::build_state_ctx;

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env is the normal case.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    timing::init_tracing(cli.verbose, cli.timing);

    let overrides = Overrides::from(&cli);
    let config_path = Config::resolve_path(cli.config.as_deref())?;
    let load_ctx = || -> Result<StateCtx> {
        let config = Config::load_from(&config_path)?;
        Ok(build_state_ctx(config.business_config(&overrides)))
    };

    match cli.command {
        Commands::Generate {
            prompt,
            output,
            no_save,
            preview,
        } => {
            let delivery = Delivery {
                output: output.as_deref(),
                no_save,
                preview,
            };
            commands::run_generate(load_ctx()?, prompt, delivery).await
        }
        Commands::Scan {
            path,
            stdin,
            clipboard,
            watch,
            interval_ms,
            copy,
            json,
        } => {
            let options = ScanOptions {
                path,
                stdin,
                clipboard,
                watch,
                interval: Duration::from_millis(interval_ms),
                copy,
                json,
            };
            commands::run_scan(load_ctx()?, options).await
        }
        Commands::Inspect { text, stdin, json } => commands::run_inspect(text, stdin, json),
        Commands::Render {
            spec,
            output,
            no_save,
            preview,
        } => {
            let delivery = Delivery {
                output: output.as_deref(),
                no_save,
                preview,
            };
            commands::run_render(load_ctx()?, &spec, delivery).await
        }
        Commands::Config { action } => commands::run_config(action, &config_path, &overrides),
        Commands::Completions { shell } => commands::generate_completions(shell),
    }
}
