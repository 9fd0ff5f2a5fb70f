use crate::device_capture::interface::{CaptureError, CapturePayload};
use image::{DynamicImage, RgbaImage};
use std::fmt;
use std::path::PathBuf;

#[derive(Clone, PartialEq, Eq)]
pub struct CapturedImage {
    pub width: u32,
    pub height: u32,
    /// Row-major RGBA, `width * height * 4` bytes.
    pub rgba: Vec<u8>,
    pub source_path: Option<PathBuf>,
}

impl fmt::Debug for CapturedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CapturedImage")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("source_path", &self.source_path)
            .finish()
    }
}

impl CapturedImage {
    pub fn from_dynamic(image: DynamicImage, source_path: Option<PathBuf>) -> Self {
        let rgba = image.to_rgba8();
        Self {
            width: rgba.width(),
            height: rgba.height(),
            rgba: rgba.into_raw(),
            source_path,
        }
    }

    pub fn decode(payload: &CapturePayload) -> Result<Self, CaptureError> {
        match payload {
            CapturePayload::File(path) => {
                let image = image::open(path).map_err(|e| CaptureError::Decode(e.to_string()))?;
                Ok(Self::from_dynamic(image, Some(path.clone())))
            }
            CapturePayload::Content(bytes) => {
                let image = image::load_from_memory(bytes)
                    .map_err(|e| CaptureError::Decode(e.to_string()))?;
                Ok(Self::from_dynamic(image, None))
            }
        }
    }

    pub fn to_dynamic(&self) -> Option<DynamicImage> {
        RgbaImage::from_raw(self.width, self.height, self.rgba.clone()).map(DynamicImage::ImageRgba8)
    }
}
