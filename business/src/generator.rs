//! Prompt-to-QR flow: generate a specification, then save the rendered image.

use std::any::Any;
use std::path::PathBuf;

use lumiqr_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, LatestOnlyUpdater,
    SnapshotClone, State, Updater, no_deps, state_assign_impl,
};
use tokio_util::sync::CancellationToken;

use crate::config::BusinessConfig;
use crate::gemini::request_qr_spec;
use crate::media_store::save_png;
use crate::payload::encode_payload;
use crate::qr_spec::QrContentSpec;

// ============================================================================
// Generate
// ============================================================================

/// The natural-language description typed by the user.
#[derive(Default, Debug, Clone)]
pub struct GenerateQrInput {
    pub prompt: String,
}

impl SnapshotClone for GenerateQrInput {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for GenerateQrInput {
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

#[derive(Debug, Clone, Default, PartialEq)]
pub enum GeneratorStatus {
    #[default]
    Idle,
    Loading,
    Success {
        spec: QrContentSpec,
        payload: String,
    },
    Error(String),
}

#[derive(Default, Debug, Clone)]
pub struct GeneratorCompute {
    pub status: GeneratorStatus,
}

impl GeneratorCompute {
    pub fn is_loading(&self) -> bool {
        self.status == GeneratorStatus::Loading
    }

    /// The generated specification and its payload, once available.
    pub fn result(&self) -> Option<(&QrContentSpec, &str)> {
        match &self.status {
            GeneratorStatus::Success { spec, payload } => Some((spec, payload.as_str())),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.status {
            GeneratorStatus::Error(message) => Some(message.as_str()),
            _ => None,
        }
    }
}

impl SnapshotClone for GeneratorCompute {}

impl State for GeneratorCompute {
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

impl Compute for GeneratorCompute {
    fn deps(&self) -> ComputeDeps {
        no_deps()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}
}

/// Sends the prompt to the model and serializes the returned specification.
#[derive(Default, Debug)]
pub struct GenerateQrCommand;

impl Command for GenerateQrCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let prompt = snap.state::<GenerateQrInput>().prompt.clone();
        let config = snap.state::<BusinessConfig>().clone();

        Box::pin(async move {
            if prompt.trim().is_empty() {
                updater.set(GeneratorCompute {
                    status: GeneratorStatus::Error("Describe the QR code to generate".to_owned()),
                });
                return;
            }

            updater.set(GeneratorCompute {
                status: GeneratorStatus::Loading,
            });

            let status = match request_qr_spec(&config, &prompt).await {
                Ok(spec) => {
                    let payload = encode_payload(&spec.content);
                    log::info!("Generated {} payload ({} bytes)", spec.content.kind, payload.len());
                    GeneratorStatus::Success { spec, payload }
                }
                Err(err) => {
                    log::error!("QR generation failed: {err}");
                    GeneratorStatus::Error(err.to_string())
                }
            };
            updater.set(GeneratorCompute { status });
        })
    }
}

// ============================================================================
// Save
// ============================================================================

/// Encoded PNG waiting to be written to the album.
#[derive(Default, Debug, Clone)]
pub struct SaveQrInput {
    pub png: Option<Vec<u8>>,
    /// Exact target directory, taking precedence over the configured album.
    pub directory: Option<PathBuf>,
}

impl SnapshotClone for SaveQrInput {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for SaveQrInput {
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

pub const SAVE_SUCCESS_MESSAGE: &str = "QR saved successfully";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SaveStatus {
    #[default]
    Idle,
    Saving,
    Saved(PathBuf),
    Error(String),
}

#[derive(Default, Debug, Clone)]
pub struct SaveQrCompute {
    pub status: SaveStatus,
}

impl SnapshotClone for SaveQrCompute {}

impl State for SaveQrCompute {
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

impl Compute for SaveQrCompute {
    fn deps(&self) -> ComputeDeps {
        no_deps()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}
}

#[derive(Default, Debug)]
pub struct SaveQrCommand;

impl Command for SaveQrCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let input = snap.state::<SaveQrInput>().clone();
        let directory = input
            .directory
            .or_else(|| snap.state::<BusinessConfig>().album_dir.clone());

        Box::pin(async move {
            updater.set(SaveQrCompute {
                status: SaveStatus::Saving,
            });
            let png = input.png.unwrap_or_default();
            let status = match save_png(&png, directory.as_deref()).await {
                Ok(path) => SaveStatus::Saved(path),
                Err(err) => {
                    log::error!("{err}");
                    SaveStatus::Error(err.to_string())
                }
            };
            updater.set(SaveQrCompute { status });
        })
    }
}
