//! Barcode recognition on frames and the scanner flow around it.

use std::any::{Any, TypeId};

use lumiqr_input::Frame;
use lumiqr_states::{
    Command, CommandFuture, CommandSnapshot, Compute, ComputeDeps, Dep, LatestOnlyUpdater,
    SnapshotClone, State, Updater, no_deps, state_assign_impl,
};
use serde::Serialize;
use tokio_util::sync::CancellationToken;

use crate::actions::{ContentAction, actions_for};
use crate::content_type::{ContentType, detect_content_type, starts_with_ignore_case};
use crate::error::ScanError;
use crate::fields::{Field, describe};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Symbology {
    #[default]
    QrCode,
}

/// Value-type hint attached to a decoded barcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Text,
    Url,
    Wifi,
    ContactInfo,
    Email,
    Phone,
    Sms,
    Geo,
    CalendarEvent,
    #[default]
    Unknown,
}

impl ValueType {
    pub fn from_content(content: &str) -> Self {
        let trimmed = content.trim_start();
        if trimmed.is_empty() {
            return Self::Unknown;
        }
        if starts_with_ignore_case(trimmed, "BEGIN:VEVENT")
            || starts_with_ignore_case(trimmed, "BEGIN:VCALENDAR")
        {
            return Self::CalendarEvent;
        }
        match detect_content_type(content) {
            ContentType::Url => Self::Url,
            ContentType::Wifi => Self::Wifi,
            ContentType::Contact => Self::ContactInfo,
            ContentType::Email => Self::Email,
            ContentType::Phone => Self::Phone,
            ContentType::Sms => Self::Sms,
            ContentType::Location => Self::Geo,
            ContentType::Json
            | ContentType::Markdown
            | ContentType::Code
            | ContentType::PlainText => Self::Text,
        }
    }
}

/// One decoded code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BarcodeModel {
    pub raw_value: String,
    pub format: Symbology,
    pub value_type: ValueType,
}

impl BarcodeModel {
    pub fn qr(raw_value: impl Into<String>) -> Self {
        let raw_value = raw_value.into();
        Self {
            value_type: ValueType::from_content(&raw_value),
            raw_value,
            format: Symbology::QrCode,
        }
    }
}

/// Find and decode every QR code in `frame`.
///
/// An empty result means nothing was recognized. Grids that fail to decode
/// are skipped, and only when all of them fail is the frame an error.
pub fn decode_frame(frame: Frame) -> Result<Vec<BarcodeModel>, ScanError> {
    let (width, height) = (frame.width() as usize, frame.height() as usize);
    let mut prepared =
        rqrr::PreparedImage::prepare_from_greyscale(width, height, |x, y| frame.luma_at(x, y));
    let grids = prepared.detect_grids();
    drop(frame);
    log::debug!("Detected {} candidate grid(s)", grids.len());

    let mut barcodes = Vec::new();
    let mut last_error = None;
    for grid in grids {
        match grid.decode() {
            Ok((meta, content)) => {
                log::debug!("Decoded version {} code", meta.version.0);
                barcodes.push(BarcodeModel::qr(content));
            }
            Err(err) => {
                log::warn!("Skipping undecodable grid: {err}");
                last_error = Some(err.to_string());
            }
        }
    }

    match last_error {
        Some(err) if barcodes.is_empty() => Err(ScanError::Undecodable(err)),
        _ => Ok(barcodes),
    }
}

// ============================================================================
// Scan flow
// ============================================================================

/// The next frame to analyze.
#[derive(Default, Debug, Clone)]
pub struct ScanFrameInput {
    pub frame: Option<Frame>,
}

impl SnapshotClone for ScanFrameInput {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for ScanFrameInput {
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

#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct ScannerCompute {
    pub is_loading: bool,
    pub barcodes: Vec<BarcodeModel>,
    pub error: Option<String>,
}

impl ScannerCompute {
    /// A held result pauses scanning until it is reset.
    pub fn has_result(&self) -> bool {
        !self.barcodes.is_empty()
    }

    pub fn first(&self) -> Option<&BarcodeModel> {
        self.barcodes.first()
    }
}

impl SnapshotClone for ScannerCompute {
    fn clone_boxed(&self) -> Option<Box<dyn Any + Send>> {
        Some(Box::new(self.clone()))
    }
}

impl State for ScannerCompute {
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

impl Compute for ScannerCompute {
    fn deps(&self) -> ComputeDeps {
        no_deps()
    }

    fn compute(&self, _deps: Dep<'_>, _updater: Updater) {}
}

/// Decodes the frame in [`ScanFrameInput`] unless a result is already held.
#[derive(Default, Debug)]
pub struct ScanFrameCommand;

impl Command for ScanFrameCommand {
    fn run(
        &self,
        snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        let previous = snap.compute::<ScannerCompute>().clone();
        let frame = snap.state::<ScanFrameInput>().frame.clone();

        Box::pin(async move {
            if previous.has_result() {
                log::debug!("Scanner paused, dropping frame");
                return;
            }
            let Some(frame) = frame else {
                return;
            };

            updater.set(ScannerCompute {
                is_loading: true,
                ..previous.clone()
            });

            let decoded = tokio::task::spawn_blocking(move || decode_frame(frame))
                .await
                .unwrap_or_else(|err| Err(ScanError::Undecodable(err.to_string())));

            let next = match decoded {
                Ok(barcodes) if barcodes.is_empty() => ScannerCompute {
                    is_loading: false,
                    ..previous
                },
                Ok(barcodes) => {
                    log::info!("Recognized {} code(s)", barcodes.len());
                    ScannerCompute {
                        is_loading: false,
                        barcodes,
                        error: None,
                    }
                }
                Err(err) => ScannerCompute {
                    is_loading: false,
                    error: Some(err.to_string()),
                    ..previous
                },
            };
            updater.set(next);
        })
    }
}

/// Clears the held result so scanning resumes.
#[derive(Default, Debug)]
pub struct ResetScannerCommand;

impl Command for ResetScannerCommand {
    fn run(
        &self,
        _snap: CommandSnapshot,
        updater: LatestOnlyUpdater,
        _cancel: CancellationToken,
    ) -> CommandFuture {
        Box::pin(async move {
            updater.set(ScannerCompute::default());
        })
    }
}

// ============================================================================
// Display
// ============================================================================

/// What the view shows for a decoded code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScanDisplay {
    pub raw_value: String,
    pub content_type: ContentType,
    pub fields: Vec<Field>,
    pub actions: Vec<ContentAction>,
}

impl ScanDisplay {
    pub fn for_content(content: &str) -> Self {
        let content_type = detect_content_type(content);
        Self {
            raw_value: content.to_owned(),
            content_type,
            fields: describe(content, content_type),
            actions: actions_for(content, content_type),
        }
    }
}

/// Display model derived from the first held barcode.
#[derive(Default, Debug, Clone)]
pub struct ScanDisplayCompute {
    pub display: Option<ScanDisplay>,
}

impl SnapshotClone for ScanDisplayCompute {}

impl State for ScanDisplayCompute {
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

impl Compute for ScanDisplayCompute {
    fn deps(&self) -> ComputeDeps {
        (Vec::new(), vec![TypeId::of::<ScannerCompute>()])
    }

    fn compute(&self, deps: Dep<'_>, updater: Updater) {
        let display = deps
            .get_compute_ref::<ScannerCompute>()
            .and_then(ScannerCompute::first)
            .map(|barcode| ScanDisplay::for_content(&barcode.raw_value));
        if display != self.display {
            updater.set(Self { display });
        }
    }
}
