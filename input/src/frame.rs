//! Grayscale frames and the [`FrameSource`] abstraction.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};

use image::{DynamicImage, GrayImage, RgbaImage};

/// Errors raised while acquiring a frame.
#[derive(Debug, thiserror::Error)]
pub enum InputError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to read stdin: {0}")]
    Stdin(#[source] std::io::Error),
    #[error("Unsupported or corrupt image: {0}")]
    Decode(#[from] image::ImageError),
    #[error("Pixel buffer of {actual} bytes does not match {width}x{height}")]
    BufferSize {
        width: u32,
        height: u32,
        actual: usize,
    },
    #[error("Clipboard access error: {0}")]
    Clipboard(String),
}

/// One grayscale image, row-major, one byte per pixel.
///
/// Frames are owned and consumed by the scanner, so a processed frame is
/// released as soon as decoding finishes.
#[derive(Clone, PartialEq, Eq)]
pub struct Frame {
    width: u32,
    height: u32,
    luma: Vec<u8>,
}

impl std::fmt::Debug for Frame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Frame")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Frame {
    pub fn new(width: u32, height: u32, luma: Vec<u8>) -> Result<Self, InputError> {
        if luma.len() != width as usize * height as usize {
            return Err(InputError::BufferSize {
                width,
                height,
                actual: luma.len(),
            });
        }
        Ok(Self {
            width,
            height,
            luma,
        })
    }

    pub fn from_image(image: &DynamicImage) -> Self {
        Self::from_gray(image.to_luma8())
    }

    pub fn from_gray(gray: GrayImage) -> Self {
        Self {
            width: gray.width(),
            height: gray.height(),
            luma: gray.into_raw(),
        }
    }

    /// Build a frame from tightly packed RGBA bytes, as handed out by clipboards.
    pub fn from_rgba(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, InputError> {
        let actual = rgba.len();
        let image = RgbaImage::from_raw(width, height, rgba).ok_or(InputError::BufferSize {
            width,
            height,
            actual,
        })?;
        Ok(Self::from_image(&DynamicImage::ImageRgba8(image)))
    }

    /// Decode an encoded image (PNG, JPEG, ...) held in memory.
    pub fn from_encoded(bytes: &[u8]) -> Result<Self, InputError> {
        Ok(Self::from_image(&image::load_from_memory(bytes)?))
    }

    pub fn open(path: &Path) -> Result<Self, InputError> {
        let bytes = std::fs::read(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_encoded(&bytes)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Luma at `(x, y)`; out-of-range coordinates read as white.
    pub fn luma_at(&self, x: usize, y: usize) -> u8 {
        if x >= self.width as usize {
            return u8::MAX;
        }
        self.luma
            .get(y * self.width as usize + x)
            .copied()
            .unwrap_or(u8::MAX)
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.luma
    }
}

/// Anything that can hand out frames for scanning.
pub trait FrameSource {
    /// Returns `Ok(None)` when the source is reachable but currently holds no image.
    fn next_frame(&mut self) -> Result<Option<Frame>, InputError>;
}

/// Reads a single image file.
#[derive(Debug, Clone)]
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl FrameSource for FileSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, InputError> {
        Frame::open(&self.path).map(Some)
    }
}

/// Hands out a fixed sequence of frames, then `None`.
#[derive(Debug, Default, Clone)]
pub struct MockSource {
    frames: VecDeque<Frame>,
}

impl MockSource {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }
}

impl FrameSource for MockSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, InputError> {
        Ok(self.frames.pop_front())
    }
}
