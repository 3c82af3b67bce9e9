//! Encoded image bytes piped on stdin.
//!
//! ```ignore
//! // lumiqr scan --stdin < screenshot.png
//! let mut source = StdinSource::new();
//! let frame = source.next_frame()?;
//! ```

use std::io::{self, Read};

use crate::{Frame, FrameSource, InputError};

/// Reads everything from a reader until EOF and decodes it as one image.
///
/// The reader is consumed on the first call; later calls return `Ok(None)`.
pub struct StdinSource<R: Read = io::Stdin> {
    reader: Option<R>,
}

impl StdinSource<io::Stdin> {
    pub fn new() -> Self {
        Self {
            reader: Some(io::stdin()),
        }
    }
}

impl Default for StdinSource<io::Stdin> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Read> StdinSource<R> {
    /// Read from any byte source instead of the process stdin.
    pub fn with_reader(reader: R) -> Self {
        Self {
            reader: Some(reader),
        }
    }
}

impl<R: Read> FrameSource for StdinSource<R> {
    fn next_frame(&mut self) -> Result<Option<Frame>, InputError> {
        let Some(mut reader) = self.reader.take() else {
            return Ok(None);
        };

        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes).map_err(InputError::Stdin)?;
        if bytes.is_empty() {
            return Ok(None);
        }
        Frame::from_encoded(&bytes).map(Some)
    }
}
