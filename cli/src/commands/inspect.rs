//! Classify and describe text without scanning an image.

use std::io::{IsTerminal as _, Read as _};

use anyhow::{Context as _, Result, bail};
use inquire::Text;
use lumiqr_business::ScanDisplay;
use tracing::instrument;

use crate::output::Output;

#[instrument(skip_all, name = "inspect")]
pub fn run_inspect(text: Option<String>, stdin: bool, json: bool) -> Result<()> {
    let out = Output::new();

    let content = match text {
        Some(text) => text,
        None if stdin || !std::io::stdin().is_terminal() => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer.trim_end_matches(['\r', '\n']).to_owned()
        }
        None => Text::new("Text to inspect:")
            .prompt()
            .context("Failed to read text")?,
    };
    if content.trim().is_empty() {
        bail!("Nothing to inspect");
    }

    let display = ScanDisplay::for_content(&content);
    if json {
        out.print(serde_json::to_string_pretty(&display)?);
    } else {
        out.scan_display(&display);
    }
    Ok(())
}
