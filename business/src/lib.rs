//! LumiQR business layer.
//!
//! Text side: [`detect_content_type`] classifies decoded payloads,
//! [`describe`] and [`actions_for`] turn them into labeled fields and
//! actions, and [`encode_payload`] serializes an AI-produced
//! [`QrContentSpec`] into the string stored in the symbol.
//!
//! Image side: [`QrRenderer`] paints codes, [`decode_frame`] reads them back.
//!
//! The generator and scanner flows are exposed as states, computes and
//! commands for a [`lumiqr_states::StateCtx`].

pub mod actions;
pub mod color;
pub mod config;
pub mod content_type;
pub mod error;
pub mod fields;
pub mod gemini;
pub mod generator;
mod glyphs;
pub mod http;
pub mod media_store;
pub mod payload;
pub mod qr_spec;
pub mod render;
pub mod scanner;
mod test_utils;

pub use actions::{ActionKind, ContentAction, actions_for};
pub use color::Color;
pub use config::BusinessConfig;
pub use content_type::{ContentType, detect_content_type};
pub use error::{GenerateError, SaveError, ScanError};
pub use fields::{Field, describe};
pub use generator::{
    GenerateQrCommand, GenerateQrInput, GeneratorCompute, GeneratorStatus, SaveQrCommand,
    SaveQrCompute, SaveQrInput, SaveStatus,
};
pub use payload::encode_payload;
pub use qr_spec::{
    Colors, ErrorCorrection, Fill, FillKind, ModuleStyle, PayloadKind, QrContent, QrContentSpec,
};
pub use render::{QrRenderer, RenderError, RenderedQr, terminal_preview};
pub use scanner::{
    BarcodeModel, ResetScannerCommand, ScanDisplay, ScanDisplayCompute, ScanFrameCommand,
    ScanFrameInput, ScannerCompute, Symbology, ValueType, decode_frame,
};
