use crate::device_capture::interface::{
    CapturePayload, CaptureRequest, CaptureResponse, CaptureSource, CaptureStatus, DeviceCapture,
};
use crate::library::logger::interface::Logger;
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use rand::Rng;
use std::collections::VecDeque;
use std::io::Cursor;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What the fake user does with the next launched capture.
#[derive(Debug, Clone, PartialEq)]
pub enum FakeCapture {
    Photo { width: u32, height: u32 },
    /// Camera writes the photo to the output file but returns no payload.
    PhotoInOutputOnly { width: u32, height: u32 },
    Cancel,
    Corrupt,
    Fail(String),
}

pub struct DeviceCaptureFake {
    logger: Arc<dyn Logger + Send + Sync>,
    script: Mutex<VecDeque<FakeCapture>>,
    launched: Mutex<Vec<CaptureRequest>>,
    delay: Duration,
}

impl DeviceCaptureFake {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            logger: logger.with_namespace("capture").with_namespace("fake"),
            script: Mutex::new(VecDeque::new()),
            launched: Mutex::new(Vec::new()),
            delay: Duration::ZERO,
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Queues outcomes; once the queue is empty every launch yields a random photo.
    pub fn push(&self, outcome: FakeCapture) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(outcome);
        }
    }

    pub fn launched(&self) -> Vec<CaptureRequest> {
        self.launched
            .lock()
            .map(|launched| launched.clone())
            .unwrap_or_default()
    }

    fn next_outcome(&self) -> FakeCapture {
        self.script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front())
            .unwrap_or(FakeCapture::Photo {
                width: 64,
                height: 48,
            })
    }
}

fn encode_photo(
    source: CaptureSource,
    width: u32,
    height: u32,
) -> Result<Vec<u8>, Box<dyn std::error::Error + Send + Sync>> {
    let format = match source {
        CaptureSource::Camera => ImageFormat::Jpeg,
        CaptureSource::Gallery => ImageFormat::Png,
    };
    let mut bytes = Vec::new();
    random_photo(width, height).write_to(&mut Cursor::new(&mut bytes), format)?;
    Ok(bytes)
}

fn random_photo(width: u32, height: u32) -> DynamicImage {
    let mut rng = rand::rng();
    let color = Rgb([rng.random(), rng.random(), rng.random()]);
    DynamicImage::ImageRgb8(RgbImage::from_pixel(width, height, color))
}

impl DeviceCapture for DeviceCaptureFake {
    fn launch(
        &self,
        request: &CaptureRequest,
    ) -> Result<CaptureResponse, Box<dyn std::error::Error + Send + Sync>> {
        self.logger.info(&format!(
            "Launching {} for request {}",
            request.source, request.id
        ))?;

        if let Ok(mut launched) = self.launched.lock() {
            launched.push(request.clone());
        }

        std::thread::sleep(self.delay);

        let outcome = self.next_outcome();

        self.logger
            .info(&format!("Request {} outcome: {:?}", request.id, outcome))?;

        let (bytes, with_payload) = match outcome {
            FakeCapture::Cancel => return Ok(CaptureResponse::cancelled()),
            FakeCapture::Fail(message) => return Err(message.into()),
            FakeCapture::Corrupt => (b"\xff\xd8 truncated".to_vec(), true),
            FakeCapture::Photo { width, height } => (encode_photo(request.source, width, height)?, true),
            FakeCapture::PhotoInOutputOnly { width, height } => {
                (encode_photo(request.source, width, height)?, false)
            }
        };

        match (request.source, &request.output) {
            (CaptureSource::Camera, Some(output)) => {
                std::fs::write(output, bytes)?;
                if with_payload {
                    Ok(CaptureResponse::ok(CapturePayload::File(output.clone())))
                } else {
                    Ok(CaptureResponse {
                        status: CaptureStatus::Ok,
                        payload: None,
                    })
                }
            }
            (CaptureSource::Camera, None) => Err("camera launched without an output file".into()),
            (CaptureSource::Gallery, _) => Ok(CaptureResponse::ok(CapturePayload::Content(bytes))),
        }
    }
}
