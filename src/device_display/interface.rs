use crate::device_capture::captured_image::CapturedImage;
use std::error::Error;

/// The two surfaces a capture cycle writes to: the photo preview and the
/// result text block.
pub trait DeviceDisplay: Send + Sync {
    /// Replace the preview with `image`
    fn show_preview(&mut self, image: &CapturedImage) -> Result<(), Box<dyn Error + Send + Sync>>;

    /// Replace the result text. Lines are separated by `\n`.
    fn show_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>>;
}
