use std::path::PathBuf;

use crate::http::HttpError;

/// Failures while turning a prompt into a QR content specification.
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    #[error("No API key configured; run `lumiqr config set-key` or set LUMIQR_API_KEY")]
    MissingApiKey,
    #[error("AI response was empty")]
    EmptyResponse,
    #[error("No valid JSON object found in the response")]
    NoJsonObject,
    #[error("AI response did not match the QR specification: {0}")]
    InvalidSpec(#[source] serde_json::Error),
    #[error("AI service returned {status}: {message}")]
    Api { status: u16, message: String },
    #[error(transparent)]
    Http(#[from] HttpError),
    #[error("Failed to encode request: {0}")]
    Request(#[source] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("A QR code was found but could not be decoded: {0}")]
    Undecodable(String),
    #[error("No barcode recognized")]
    NothingRecognized,
}

#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("Error saving image: no pictures directory available")]
    NoPicturesDir,
    #[error("Error saving image: {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error saving image: nothing to save")]
    Empty,
}
