use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

pub type RequestId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureSource {
    Camera,
    Gallery,
}

impl fmt::Display for CaptureSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CaptureSource::Camera => write!(f, "camera"),
            CaptureSource::Gallery => write!(f, "photo library"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureRequest {
    pub id: RequestId,
    pub source: CaptureSource,
    /// Where the camera should write the photo. Always `None` for the gallery.
    pub output: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStatus {
    Ok,
    Cancelled,
}

#[derive(Clone, PartialEq, Eq)]
pub enum CapturePayload {
    File(PathBuf),
    Content(Vec<u8>),
}

impl fmt::Debug for CapturePayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapturePayload::File(path) => f.debug_tuple("File").field(path).finish(),
            CapturePayload::Content(bytes) => write!(f, "Content({} bytes)", bytes.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureResponse {
    pub status: CaptureStatus,
    pub payload: Option<CapturePayload>,
}

impl CaptureResponse {
    pub fn cancelled() -> Self {
        Self {
            status: CaptureStatus::Cancelled,
            payload: None,
        }
    }

    pub fn ok(payload: CapturePayload) -> Self {
        Self {
            status: CaptureStatus::Ok,
            payload: Some(payload),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CaptureError {
    #[error("Unable to save image to run classification: {0}")]
    TempFile(String),
    #[error("Unable to open the {capture_source}: {message}")]
    Launch {
        capture_source: CaptureSource,
        message: String,
    },
    #[error("Unable to read the selected image: {0}")]
    Decode(String),
}

/// Platform camera and photo picker. `launch` blocks until the user
/// finishes or cancels.
pub trait DeviceCapture: Send + Sync {
    fn launch(
        &self,
        request: &CaptureRequest,
    ) -> Result<CaptureResponse, Box<dyn std::error::Error + Send + Sync>>;
}
