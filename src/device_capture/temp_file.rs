use crate::device_capture::interface::CaptureError;
use std::path::{Path, PathBuf};

/// Creates an empty `JPEG_<timestamp>_*.jpg` file for the camera to write
/// into. The file is kept after this returns; cache eviction is left to the OS.
pub fn create_image_file(cache_dir: &Path) -> Result<PathBuf, CaptureError> {
    std::fs::create_dir_all(cache_dir).map_err(|e| CaptureError::TempFile(e.to_string()))?;

    let prefix = format!("JPEG_{}_", chrono::Local::now().format("%Y%m%d_%H%M%S"));

    let file = tempfile::Builder::new()
        .prefix(&prefix)
        .suffix(".jpg")
        .tempfile_in(cache_dir)
        .map_err(|e| CaptureError::TempFile(e.to_string()))?;

    let (_, path) = file
        .keep()
        .map_err(|e| CaptureError::TempFile(e.to_string()))?;

    Ok(path)
}
