//! Frame sources for LumiQR.
//!
//! A [`Frame`] is one grayscale image handed to the QR scanner. Frames come
//! from a [`FrameSource`]:
//!
//! - [`FileSource`]: an image file on disk
//! - [`StdinSource`]: encoded image bytes piped on stdin
//! - [`ClipboardSource`]: the system clipboard (bitmap or `file://` URI)
//! - [`MockSource`]: predetermined frames for tests
//!
//! All sources decode through the `image` crate, so any format it supports works.

pub mod clipboard;
pub mod frame;
pub mod stdin;

pub use clipboard::{ClipboardSource, copy_text_to_clipboard};
pub use frame::{FileSource, Frame, FrameSource, InputError, MockSource};
pub use stdin::StdinSource;
