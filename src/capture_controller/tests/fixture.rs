use crate::capture_controller::core::Model;
use crate::capture_controller::main::{CaptureController, ControllerHandle};
use crate::config::Config;
use crate::device_capture::impl_fake::DeviceCaptureFake;
use crate::device_display::impl_fake::{DeviceDisplayFake, FakeScreen};
use crate::image_classifier::classifier::ImageClassifier;
use crate::image_classifier::impl_fake::{FakeEngineStats, LabelEngineFake};
use crate::library::logger::impl_console::LoggerConsole;
use crate::library::logger::interface::Logger;
use crate::permission_gate::gate::PermissionGate;
use crate::permission_gate::impl_fake::DevicePermissionsFake;
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

pub type RunResult = Result<Model, Box<dyn std::error::Error + Send + Sync>>;

#[allow(dead_code)]
pub struct Fixture {
    pub config: Config,
    pub cache_dir: tempfile::TempDir,
    pub logger: Arc<dyn Logger + Send + Sync>,
    pub device_permissions: Arc<DevicePermissionsFake>,
    pub device_capture: Arc<DeviceCaptureFake>,
    pub screen: Arc<Mutex<FakeScreen>>,
    pub stats: Arc<FakeEngineStats>,
    pub image_classifier: Arc<ImageClassifier>,
    pub capture_controller: CaptureController,
}

impl Fixture {
    pub fn new(configure: impl FnOnce(LabelEngineFake) -> LabelEngineFake) -> Self {
        let cache_dir = tempfile::tempdir().unwrap();
        let config = Config {
            cache_dir: cache_dir.path().join("cache"),
            ..Config::default()
        };
        let logger: Arc<dyn Logger + Send + Sync> =
            Arc::new(LoggerConsole::new(config.logger_timezone));

        let device_permissions = Arc::new(
            DevicePermissionsFake::new(vec!["CAMERA", "WRITE_EXTERNAL_STORAGE"], vec!["CAMERA"])
                .answering(vec!["WRITE_EXTERNAL_STORAGE"]),
        );
        let permission_gate = Arc::new(PermissionGate::new(
            device_permissions.clone(),
            logger.clone(),
        ));
        let device_capture = Arc::new(DeviceCaptureFake::new(logger.clone()));
        let device_display = DeviceDisplayFake::new(logger.clone());
        let screen = device_display.screen();

        let engine = configure(LabelEngineFake::new(logger.clone()));
        let stats = engine.stats();
        let image_classifier = Arc::new(ImageClassifier::new(
            config.clone(),
            logger.clone(),
            Arc::new(engine),
        ));

        let capture_controller = CaptureController::new(
            config.clone(),
            logger.clone(),
            permission_gate,
            device_capture.clone(),
            Arc::new(Mutex::new(device_display)),
            image_classifier.clone(),
        );

        Self {
            config,
            cache_dir,
            logger,
            device_permissions,
            device_capture,
            screen,
            stats,
            image_classifier,
            capture_controller,
        }
    }

    /// Runs the controller on its own thread.
    pub fn start(self) -> Started {
        let handle = self.capture_controller.handle();
        let controller = self.capture_controller;
        let join = std::thread::spawn(move || controller.run());

        Started {
            handle,
            join,
            cache_dir: self.cache_dir,
            device_permissions: self.device_permissions,
            device_capture: self.device_capture,
            screen: self.screen,
            stats: self.stats,
            image_classifier: self.image_classifier,
        }
    }
}

#[allow(dead_code)]
pub struct Started {
    pub handle: ControllerHandle,
    pub join: JoinHandle<RunResult>,
    pub cache_dir: tempfile::TempDir,
    pub device_permissions: Arc<DevicePermissionsFake>,
    pub device_capture: Arc<DeviceCaptureFake>,
    pub screen: Arc<Mutex<FakeScreen>>,
    pub stats: Arc<FakeEngineStats>,
    pub image_classifier: Arc<ImageClassifier>,
}

impl Started {
    pub fn stop(self) -> Model {
        self.handle.teardown().unwrap();
        self.join.join().unwrap().unwrap()
    }
}
