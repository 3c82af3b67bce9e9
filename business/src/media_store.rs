//! Saving rendered codes into the user's album.

use std::path::{Path, PathBuf};

use chrono::Utc;
use directories::UserDirs;

use crate::error::SaveError;

pub const ALBUM_NAME: &str = "LumiQR";

/// `<Pictures>/LumiQR`, or `override_dir` when given.
pub fn album_dir(override_dir: Option<&Path>) -> Result<PathBuf, SaveError> {
    if let Some(dir) = override_dir {
        return Ok(dir.to_path_buf());
    }
    let user_dirs = UserDirs::new().ok_or(SaveError::NoPicturesDir)?;
    let pictures = user_dirs
        .picture_dir()
        .map_or_else(|| user_dirs.home_dir().join("Pictures"), Path::to_path_buf);
    Ok(pictures.join(ALBUM_NAME))
}

/// `QR_<epoch millis>.png`.
pub fn file_name_at(millis: i64) -> String {
    format!("QR_{millis}.png")
}

/// Write `png` into the album and return the saved path.
pub async fn save_png(png: &[u8], override_dir: Option<&Path>) -> Result<PathBuf, SaveError> {
    if png.is_empty() {
        return Err(SaveError::Empty);
    }
    let dir = album_dir(override_dir)?;
    tokio::fs::create_dir_all(&dir)
        .await
        .map_err(|source| SaveError::Io {
            path: dir.clone(),
            source,
        })?;

    let path = unused_path(&dir, Utc::now().timestamp_millis()).await;
    tokio::fs::write(&path, png)
        .await
        .map_err(|source| SaveError::Io {
            path: path.clone(),
            source,
        })?;
    log::info!("Saved QR image to {}", path.display());
    Ok(path)
}

async fn unused_path(dir: &Path, millis: i64) -> PathBuf {
    let mut path = dir.join(file_name_at(millis));
    let mut suffix = 1;
    while tokio::fs::try_exists(&path).await.unwrap_or(false) {
        path = dir.join(format!("QR_{millis}_{suffix}.png"));
        suffix += 1;
    }
    path
}
