//! System clipboard as a frame source, plus copying decoded text back.
//!
//! The clipboard may hold a bitmap (a screenshot) or, when a file was copied
//! from a file manager, a `file://` URI pointing at an image on disk. Both are
//! turned into a [`Frame`].

use std::path::{Path, PathBuf};

use crate::{Frame, FrameSource, InputError};

const IMAGE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "bmp", "webp",
];

/// Reads the current clipboard image on every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct ClipboardSource;

#[cfg(not(target_arch = "wasm32"))]
impl FrameSource for ClipboardSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, InputError> {
        use arboard::Clipboard;

        let mut clipboard =
            Clipboard::new().map_err(|e| InputError::Clipboard(e.to_string()))?;

        match clipboard.get_image() {
            Ok(image) => {
                let width = u32::try_from(image.width)
                    .map_err(|e| InputError::Clipboard(e.to_string()))?;
                let height = u32::try_from(image.height)
                    .map_err(|e| InputError::Clipboard(e.to_string()))?;
                Frame::from_rgba(width, height, image.bytes.into_owned()).map(Some)
            }
            Err(err) => {
                if let Ok(text) = clipboard.get_text()
                    && let Some(frame) = frame_from_file_uris(&text)
                {
                    return Ok(Some(frame));
                }
                match err {
                    arboard::Error::ContentNotAvailable => Ok(None),
                    other => Err(InputError::Clipboard(other.to_string())),
                }
            }
        }
    }
}

#[cfg(target_arch = "wasm32")]
impl FrameSource for ClipboardSource {
    fn next_frame(&mut self) -> Result<Option<Frame>, InputError> {
        Ok(None)
    }
}

/// Put decoded QR content on the clipboard.
#[cfg(not(target_arch = "wasm32"))]
pub fn copy_text_to_clipboard(text: &str) -> Result<(), InputError> {
    let mut clipboard =
        arboard::Clipboard::new().map_err(|e| InputError::Clipboard(e.to_string()))?;
    clipboard
        .set_text(text.to_owned())
        .map_err(|e| InputError::Clipboard(e.to_string()))
}

#[cfg(target_arch = "wasm32")]
pub fn copy_text_to_clipboard(_text: &str) -> Result<(), InputError> {
    Err(InputError::Clipboard("not supported on this platform".to_owned()))
}

/// First decodable image among the `file://` URIs in clipboard text.
fn frame_from_file_uris(text: &str) -> Option<Frame> {
    text.lines()
        .filter_map(extract_file_path_from_uri)
        .filter(|path| is_image_path(path))
        .find_map(|path| match Frame::open(&path) {
            Ok(frame) => Some(frame),
            Err(e) => {
                log::debug!("Clipboard file {} is not a usable image: {e}", path.display());
                None
            }
        })
}

fn extract_file_path_from_uri(line: &str) -> Option<PathBuf> {
    let line = line.trim();
    let prefix = line.get(..7)?;
    if !prefix.eq_ignore_ascii_case("file://") {
        return None;
    }
    let decoded = urlencoding::decode(&line[7..]).ok()?;
    let path = PathBuf::from(decoded.as_ref());
    path.is_file().then_some(path)
}

fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            IMAGE_EXTENSIONS
                .iter()
                .any(|known| known.eq_ignore_ascii_case(ext))
        })
}

#[cfg(test)]
mod tests {
    use image::{GrayImage, Luma};

    use super::*;

    #[test]
    fn file_uri_with_escaped_space_resolves() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("my code.png");
        GrayImage::from_pixel(4, 4, Luma([0])).save(&path).unwrap();

        let uri = format!(
            "FILE://{}",
            path.display().to_string().replace(' ', "%20")
        );
        assert_eq!(extract_file_path_from_uri(&uri), Some(path.clone()));

        let frame = frame_from_file_uris(&format!("\n{uri}\n")).unwrap();
        assert_eq!(frame.width(), 4);
    }

    #[test]
    fn non_uri_text_is_ignored() {
        assert!(extract_file_path_from_uri("https://example.com/a.png").is_none());
        assert!(extract_file_path_from_uri("file://").is_none());
        assert!(frame_from_file_uris("hello world").is_none());
    }

    #[test]
    fn only_image_extensions_are_considered() {
        assert!(is_image_path(Path::new("/tmp/qr.PNG")));
        assert!(is_image_path(Path::new("/tmp/qr.jpeg")));
        assert!(!is_image_path(Path::new("/tmp/notes.txt")));
        assert!(!is_image_path(Path::new("/tmp/no_extension")));
    }
}
