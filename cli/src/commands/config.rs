//! `lumiqr config`: manage the stored key and settings.

use std::path::Path;

use anyhow::{Context as _, Result, bail};
use inquire::{Password, PasswordDisplayMode};
use tabled::settings::Style;
use tabled::{Table, Tabled};
use tracing::instrument;

use crate::cli::ConfigAction;
use crate::config::{Config, Overrides, mask_key};
use crate::output::Output;

#[derive(Tabled)]
struct SettingRow {
    #[tabled(rename = "Setting")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

#[instrument(skip_all, name = "config")]
pub fn run_config(action: ConfigAction, path: &Path, overrides: &Overrides) -> Result<()> {
    let out = Output::new();
    let mut config = Config::load_from(path)?;

    match action {
        ConfigAction::SetKey { key } => {
            let key = match key {
                Some(key) => key,
                None => Password::new("Gemini API key:")
                    .with_display_mode(PasswordDisplayMode::Masked)
                    .without_confirmation()
                    .prompt()
                    .context("Failed to read API key")?,
            };
            if key.trim().is_empty() {
                bail!("API key cannot be empty");
            }
            config.set_api_key(&key);
            config.save_to(path)?;
            out.success(format!("API key saved to {}", path.display()));
        }
        ConfigAction::ClearKey => {
            if config.clear_api_key() {
                config.save_to(path)?;
                out.success("API key removed");
            } else {
                out.dim("No API key was stored");
            }
        }
        ConfigAction::SetAlbum { dir } => {
            out.success(format!("Images will be saved to {}", dir.display()));
            config.output.album_dir = Some(dir);
            config.save_to(path)?;
        }
        ConfigAction::Show => {
            let effective = config.business_config(overrides);
            let album = lumiqr_business::media_store::album_dir(effective.album_dir.as_deref())
                .map_or_else(|err| err.to_string(), |dir| dir.display().to_string());
            let rows = vec![
                SettingRow {
                    name: "Config file",
                    value: path.display().to_string(),
                },
                SettingRow {
                    name: "API key",
                    value: effective
                        .api_key()
                        .map_or_else(|| "(not set)".to_owned(), mask_key),
                },
                SettingRow {
                    name: "Model",
                    value: effective.model.clone(),
                },
                SettingRow {
                    name: "Endpoint",
                    value: effective.generate_url(),
                },
                SettingRow {
                    name: "Album",
                    value: album,
                },
            ];
            let mut table = Table::new(&rows);
            table.with(Style::rounded());
            out.print(table);
        }
    }
    Ok(())
}
