use crate::capture_controller::core::{Effect, Msg};
use crate::config::Config;
use crate::device_capture::captured_image::CapturedImage;
use crate::device_capture::interface::{
    CaptureError, CapturePayload, CaptureRequest, CaptureSource, CaptureStatus, DeviceCapture,
    RequestId,
};
use crate::device_capture::temp_file::create_image_file;
use crate::image_classifier::classifier::ImageClassifier;
use crate::library::logger::interface::Logger;
use crate::permission_gate::gate::PermissionGate;
use std::sync::mpsc::Sender;
use std::sync::Arc;

#[derive(Clone)]
pub struct RunEffect {
    config: Config,
    logger: Arc<dyn Logger + Send + Sync>,
    permission_gate: Arc<PermissionGate>,
    device_capture: Arc<dyn DeviceCapture + Send + Sync>,
    image_classifier: Arc<ImageClassifier>,
    msg_sender: Sender<Msg>,
}

impl RunEffect {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        permission_gate: Arc<PermissionGate>,
        device_capture: Arc<dyn DeviceCapture + Send + Sync>,
        image_classifier: Arc<ImageClassifier>,
        msg_sender: Sender<Msg>,
    ) -> Self {
        Self {
            config,
            logger,
            permission_gate,
            device_capture,
            image_classifier,
            msg_sender,
        }
    }

    fn send(&self, msg: Msg) {
        if self.msg_sender.send(msg).is_err() {
            let _ = self.logger.info("Controller stopped; dropping message");
        }
    }

    pub fn run_effect(&self, effect: Effect) {
        let _ = self.logger.info(&format!("Running effect: {:?}", effect));

        match effect {
            Effect::EnsurePermissions => {
                let (check, results) = self.permission_gate.ensure();
                self.send(Msg::PermissionsChecked(check));

                if let Some(results) = results {
                    if let Ok(results) = results.recv() {
                        self.permission_gate.on_permissions_result(&results);
                        self.send(Msg::PermissionsResult(results));
                    }
                }
            }
            Effect::InitializeClassifier => {
                let initialized = self.image_classifier.initialize();
                self.send(Msg::ClassifierInitDone(initialized));
            }
            Effect::LaunchCapture { request_id, source } => {
                self.launch_capture(request_id, source);
            }
            Effect::DecodeImage {
                request_id,
                payload,
            } => {
                let result = CapturedImage::decode(&payload).map(Arc::new);
                self.send(Msg::DecodeDone { request_id, result });
            }
            Effect::Classify { request_id, image } => {
                let result = self.image_classifier.classify(image).wait();
                self.send(Msg::ClassifyDone { request_id, result });
            }
            Effect::ShutdownClassifier => {
                self.image_classifier.shutdown();
            }
        }
    }

    fn launch_capture(&self, request_id: RequestId, source: CaptureSource) {
        let output = match source {
            CaptureSource::Camera => match create_image_file(&self.config.cache_dir) {
                Ok(path) => Some(path),
                Err(error) => {
                    let _ = self.logger.error(&format!("{}", error));
                    self.send(Msg::CaptureFailed { request_id, error });
                    return;
                }
            },
            CaptureSource::Gallery => None,
        };

        let request = CaptureRequest {
            id: request_id,
            source,
            output: output.clone(),
        };

        match self.device_capture.launch(&request) {
            Ok(response) => {
                // The camera reports success without a payload; the photo is in our file.
                let payload = match (response.status, response.payload, output) {
                    (CaptureStatus::Ok, None, Some(path)) => Some(CapturePayload::File(path)),
                    (_, payload, _) => payload,
                };
                self.send(Msg::CaptureResult {
                    request_id,
                    status: response.status,
                    payload,
                });
            }
            Err(e) => {
                self.send(Msg::CaptureFailed {
                    request_id,
                    error: CaptureError::Launch {
                        capture_source: source,
                        message: e.to_string(),
                    },
                });
            }
        }
    }
}
