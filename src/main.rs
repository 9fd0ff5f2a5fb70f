use capture_controller::main::{CaptureController, ControllerHandle};
use config::Config;
use device_capture::impl_fake::DeviceCaptureFake;
use device_capture::interface::CaptureSource;
use device_display::impl_console::DeviceDisplayConsole;
use device_display::impl_gui::DeviceDisplayGui;
use device_display::interface::DeviceDisplay;
use image_classifier::classifier::ImageClassifier;
use image_classifier::impl_fake::LabelEngineFake;
use image_classifier::impl_tract_onnx::LabelEngineTractOnnx;
use image_classifier::interface::LabelEngine;
use library::logger::impl_console::LoggerConsole;
use library::logger::interface::Logger;
use permission_gate::gate::PermissionGate;
use permission_gate::impl_fake::DevicePermissionsFake;
use std::io::BufRead;
use std::sync::{Arc, Mutex};
use std::time::Duration;

mod capture_controller;
mod config;
mod device_capture;
mod device_display;
mod image_classifier;
mod library;
mod permission_gate;

type MainError = Box<dyn std::error::Error + Send + Sync>;

fn main() -> Result<(), MainError> {
    let config = Config::default();

    let logger: Arc<dyn Logger + Send + Sync> =
        Arc::new(LoggerConsole::new(config.logger_timezone));

    let gui = std::env::args().any(|arg| arg == "--gui");

    let engine: Arc<dyn LabelEngine + Send + Sync> = if config.model_path().is_file() {
        Arc::new(LabelEngineTractOnnx::new(logger.clone()))
    } else {
        logger.info(&format!(
            "No model at {}, labeling with the fake engine",
            config.model_path().display()
        ))?;
        Arc::new(LabelEngineFake::new(logger.clone()))
    };

    let image_classifier = Arc::new(ImageClassifier::new(config.clone(), logger.clone(), engine));

    let device_permissions = Arc::new(
        DevicePermissionsFake::new(
            vec![
                "android.permission.CAMERA",
                "android.permission.WRITE_EXTERNAL_STORAGE",
            ],
            vec![],
        )
        .answering(vec![
            "android.permission.CAMERA",
            "android.permission.WRITE_EXTERNAL_STORAGE",
        ]),
    );

    let permission_gate = Arc::new(PermissionGate::new(device_permissions, logger.clone()));

    let device_capture =
        Arc::new(DeviceCaptureFake::new(logger.clone()).with_delay(Duration::from_millis(300)));

    let device_display_gui = DeviceDisplayGui::new(logger.clone());

    let device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>> = if gui {
        Arc::new(Mutex::new(device_display_gui.clone()))
    } else {
        Arc::new(Mutex::new(DeviceDisplayConsole::new()))
    };

    let capture_controller = CaptureController::new(
        config,
        logger.clone(),
        permission_gate,
        device_capture,
        device_display,
        image_classifier,
    );

    let handle = capture_controller.handle();

    let controller_thread = std::thread::spawn(move || capture_controller.run());

    if gui {
        device_display_gui.run(handle.clone())?;
    } else {
        read_commands(&handle, logger.clone())?;
    }

    handle.teardown().map_err(|e| e.to_string())?;

    let model = controller_thread
        .join()
        .map_err(|_| "capture controller thread panicked")??;

    logger.info(&format!("Stopped after {} captures", model.last_request_id))?;

    Ok(())
}

/// `c` takes a photo, `g` picks one from the library, `q` quits.
fn read_commands(
    handle: &ControllerHandle,
    logger: Arc<dyn Logger + Send + Sync>,
) -> Result<(), MainError> {
    logger.info("Commands: [c]amera, [g]allery, [q]uit")?;

    for line in std::io::stdin().lock().lines() {
        let source = match line?.trim() {
            "c" => CaptureSource::Camera,
            "g" => CaptureSource::Gallery,
            "q" => break,
            other => {
                logger.error(&format!("Unknown command: {:?}", other))?;
                continue;
            }
        };

        handle.request_capture(source).map_err(|e| e.to_string())?;
    }

    Ok(())
}
