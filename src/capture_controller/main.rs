use crate::capture_controller::core::{init, transition, Effect, Model, Msg};
use crate::capture_controller::render::Render;
use crate::capture_controller::run_effect::RunEffect;
use crate::config::Config;
use crate::device_capture::interface::{CaptureSource, DeviceCapture};
use crate::device_display::interface::DeviceDisplay;
use crate::image_classifier::classifier::ImageClassifier;
use crate::library::logger::interface::Logger;
use crate::permission_gate::gate::PermissionGate;
use std::sync::mpsc::{channel, Receiver, SendError, Sender};
use std::sync::{Arc, Mutex};

/// Posts user actions to the controller thread.
#[derive(Clone)]
pub struct ControllerHandle {
    msg_sender: Sender<Msg>,
}

impl ControllerHandle {
    pub fn request_capture(&self, source: CaptureSource) -> Result<(), SendError<Msg>> {
        self.msg_sender.send(Msg::CaptureRequested(source))
    }

    pub fn teardown(&self) -> Result<(), SendError<Msg>> {
        self.msg_sender.send(Msg::Teardown)
    }
}

pub struct CaptureController {
    logger: Arc<dyn Logger + Send + Sync>,
    device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
    run_effect: RunEffect,
    msg_sender: Sender<Msg>,
    msg_receiver: Receiver<Msg>,
}

impl CaptureController {
    pub fn new(
        config: Config,
        logger: Arc<dyn Logger + Send + Sync>,
        permission_gate: Arc<PermissionGate>,
        device_capture: Arc<dyn DeviceCapture + Send + Sync>,
        device_display: Arc<Mutex<dyn DeviceDisplay + Send + Sync>>,
        image_classifier: Arc<ImageClassifier>,
    ) -> Self {
        let logger = logger.with_namespace("capture_controller");
        let (msg_sender, msg_receiver) = channel();
        let run_effect = RunEffect::new(
            config,
            logger.clone(),
            permission_gate,
            device_capture,
            image_classifier,
            msg_sender.clone(),
        );

        Self {
            logger,
            device_display,
            run_effect,
            msg_sender,
            msg_receiver,
        }
    }

    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            msg_sender: self.msg_sender.clone(),
        }
    }

    fn spawn_effects(&self, effects: Vec<Effect>) {
        for effect in effects {
            let run_effect = self.run_effect.clone();
            std::thread::spawn(move || run_effect.run_effect(effect));
        }
    }

    /// Processes messages until teardown. The classifier is shut down before
    /// this returns the final model.
    pub fn run(self) -> Result<Model, Box<dyn std::error::Error + Send + Sync>> {
        let mut render = Render::new(self.device_display.clone());
        let (mut current_model, effects) = init();

        self.spawn_effects(effects);

        loop {
            let msg = self.msg_receiver.recv()?;

            let _ = self.logger.info(&format!(
                "\nold model:\n\t{:?}\n\nmsg:\n\t{:?}",
                current_model, msg,
            ));

            let (new_model, effects) = transition(current_model, msg);

            let _ = self.logger.info(&format!(
                "\nnew model:\n\t{:?}\n\neffects:\n\t{:?}",
                new_model, effects
            ));

            current_model = new_model;

            if let Err(e) = render.render(&current_model) {
                let _ = self.logger.error(&format!("Render failed: {}", e));
            }

            if current_model.torn_down {
                for effect in effects {
                    self.run_effect.run_effect(effect);
                }
                return Ok(current_model);
            }

            self.spawn_effects(effects);
        }
    }
}
