use crate::capture_controller::main::ControllerHandle;
use crate::device_capture::captured_image::CapturedImage;
use crate::device_capture::interface::CaptureSource;
use crate::device_display::interface::DeviceDisplay;
use crate::library::logger::interface::Logger;
use eframe::egui;
use std::error::Error;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Screen {
    preview: Option<CapturedImage>,
    /// Bumped on every new preview so the window knows to reupload the texture.
    preview_version: u64,
    text: String,
    ctx: Option<egui::Context>,
}

struct RecognizerWindow {
    screen: Arc<Mutex<Screen>>,
    handle: ControllerHandle,
    logger: Arc<dyn Logger + Send + Sync>,
    texture: Option<egui::TextureHandle>,
    shown_version: u64,
}

impl RecognizerWindow {
    fn request_capture(&self, source: CaptureSource) {
        if let Err(e) = self.handle.request_capture(source) {
            let _ = self
                .logger
                .error(&format!("Controller is gone, dropping {} request: {}", source, e));
        }
    }
}

impl eframe::App for RecognizerWindow {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let text = match self.screen.lock() {
            Ok(screen) => {
                if screen.preview_version != self.shown_version {
                    self.texture = screen.preview.as_ref().map(|image| {
                        let pixels = egui::ColorImage::from_rgba_unmultiplied(
                            [image.width as usize, image.height as usize],
                            &image.rgba,
                        );
                        ctx.load_texture("preview", pixels, egui::TextureOptions::default())
                    });
                    self.shown_version = screen.preview_version;
                }
                screen.text.clone()
            }
            Err(_) => return,
        };

        egui::TopBottomPanel::bottom("actions").show(ctx, |ui| {
            ui.horizontal(|ui| {
                if ui.button("Take photo").clicked() {
                    self.request_capture(CaptureSource::Camera);
                }
                if ui.button("Choose from library").clicked() {
                    self.request_capture(CaptureSource::Gallery);
                }
            });
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                if let Some(texture) = &self.texture {
                    ui.add(
                        egui::Image::new(egui::load::SizedTexture::from_handle(texture))
                            .max_height(ui.available_height() * 0.7)
                            .shrink_to_fit(),
                    );
                }

                ui.add_space(12.0);

                for line in text.lines() {
                    ui.label(egui::RichText::new(line).monospace().size(16.0));
                }
            });
        });
    }
}

/// Desktop window with a preview area, a result text block and the two
/// capture buttons.
#[derive(Clone)]
pub struct DeviceDisplayGui {
    screen: Arc<Mutex<Screen>>,
    logger: Arc<dyn Logger + Send + Sync>,
}

impl DeviceDisplayGui {
    pub fn new(logger: Arc<dyn Logger + Send + Sync>) -> Self {
        Self {
            screen: Arc::new(Mutex::new(Screen::default())),
            logger: logger.with_namespace("display").with_namespace("gui"),
        }
    }

    /// Opens the window and blocks until it is closed. Must run on the main thread.
    pub fn run(&self, handle: ControllerHandle) -> Result<(), Box<dyn Error + Send + Sync>> {
        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default().with_inner_size([420.0, 640.0]),
            ..Default::default()
        };

        let window = RecognizerWindow {
            screen: self.screen.clone(),
            handle,
            logger: self.logger.clone(),
            texture: None,
            shown_version: 0,
        };
        let screen = self.screen.clone();

        eframe::run_native(
            "Barrel Recognizer",
            options,
            Box::new(move |cc| {
                if let Ok(mut screen) = screen.lock() {
                    screen.ctx = Some(cc.egui_ctx.clone());
                }
                Box::new(window)
            }),
        )
        .map_err(|e| e.to_string())?;

        self.logger.info("Window closed")?;
        Ok(())
    }

    fn update(&self, apply: impl FnOnce(&mut Screen)) -> Result<(), Box<dyn Error + Send + Sync>> {
        let mut screen = self.screen.lock().map_err(|e| e.to_string())?;
        apply(&mut screen);
        if let Some(ctx) = &screen.ctx {
            ctx.request_repaint();
        }
        Ok(())
    }
}

impl DeviceDisplay for DeviceDisplayGui {
    fn show_preview(&mut self, image: &CapturedImage) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.update(|screen| {
            screen.preview = Some(image.clone());
            screen.preview_version += 1;
        })
    }

    fn show_text(&mut self, text: &str) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.update(|screen| screen.text = text.to_string())
    }
}
