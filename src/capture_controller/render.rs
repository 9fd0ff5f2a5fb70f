use crate::capture_controller::core::Model;
use crate::device_capture::captured_image::CapturedImage;
use crate::device_display::interface::DeviceDisplay;
use std::sync::{Arc, Mutex};

/// Writes the model to the display, touching only the surfaces that changed.
pub struct Render {
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    shown_preview: Option<Arc<CapturedImage>>,
    shown_text: String,
}

impl Render {
    pub fn new(device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>) -> Self {
        Self {
            device_display,
            shown_preview: None,
            shown_text: String::new(),
        }
    }

    pub fn render(&mut self, model: &Model) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut device_display = self.device_display.lock().map_err(|e| e.to_string())?;

        let preview_changed = match (&self.shown_preview, &model.preview) {
            (Some(shown), Some(current)) => !Arc::ptr_eq(shown, current),
            (None, Some(_)) => true,
            _ => false,
        };

        if preview_changed {
            if let Some(preview) = &model.preview {
                device_display.show_preview(preview)?;
                self.shown_preview = Some(preview.clone());
            }
        }

        if self.shown_text != model.text {
            device_display.show_text(&model.text)?;
            self.shown_text = model.text.clone();
        }

        Ok(())
    }
}
