use crate::device_capture::captured_image::CapturedImage;
use crate::device_display::interface::DeviceDisplay;
use crate::library::logger::interface::Logger;
use std::error::Error;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FakeScreen {
    /// `(width, height, source_path)` of every preview shown.
    pub previews: Vec<(u32, u32, Option<PathBuf>)>,
    pub texts: Vec<String>,
}

impl FakeScreen {
    pub fn text(&self) -> Option<&str> {
        self.texts.last().map(String::as_str)
    }
}

pub struct DeviceDisplayFake {
    logger: Arc<dyn Logger + Send + Sync>,
    screen: Arc<Mutex<FakeScreen>>,
}

impl DeviceDisplayFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("display").with_namespace("fake"),
            screen: Arc::new(Mutex::new(FakeScreen::default())),
        }
    }

    pub fn screen(&self) -> Arc<Mutex<FakeScreen>> {
        self.screen.clone()
    }
}

/// Polls `screen` until `predicate` holds or `timeout` elapses.
pub fn wait_for_screen(
    screen: &Arc<Mutex<FakeScreen>>,
    timeout: Duration,
    predicate: impl Fn(&FakeScreen) -> bool,
) -> Option<FakeScreen> {
    let deadline = Instant::now() + timeout;
    loop {
        if let Ok(current) = screen.lock() {
            if predicate(&current) {
                return Some(current.clone());
            }
        }
        if Instant::now() >= deadline {
            return None;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
}

impl DeviceDisplay for DeviceDisplayFake {
    fn show_preview(&mut self, image: &CapturedImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger.info(&format!(
            "DeviceDisplayFake::show_preview({}x{})",
            image.width, image.height
        ))?;
        let mut screen = self.screen.lock().map_err(|e| e.to_string())?;
        screen
            .previews
            .push((image.width, image.height, image.source_path.clone()));
        Ok(())
    }

    fn show_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.logger
            .info(&format!("DeviceDisplayFake::show_text({:?})", text))?;
        let mut screen = self.screen.lock().map_err(|e| e.to_string())?;
        screen.texts.push(text.to_string());
        Ok(())
    }
}
