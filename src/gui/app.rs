//! Main application state and UI implementation

use eframe::egui;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};

use super::dialogs::{self, DialogPrompt, DialogResult, DriveChooser, SettingsDialog};
use crate::api::{spawn_artwork_fetch, ArtworkOutcome, IgdbClient};
use crate::burn::{plan_drive, prepare_burn, BurnError, BurnJob, BurnStatus, DrivePlan};
use crate::config::{AppConfig, Settings, Theme, ToolPaths};
use crate::disc::{supported_extensions, DiscFormat, DiscSelection};
use crate::drives::{find_optical_drives, OpticalDrive, SystemDrives};
use crate::payload::ProcessPatchRunner;

/// Cover preview area size
const COVER_SIZE: egui::Vec2 = egui::vec2(250.0, 300.0);

/// Main application state
pub struct App {
    /// Settings in effect for this run
    settings: Settings,
    /// External tool locations
    tools: ToolPaths,
    /// Authenticated IGDB client
    igdb: IgdbClient,
    /// Currently selected disc image
    selection: Option<DiscSelection>,
    /// Receiver for the in-flight artwork fetch
    artwork_receiver: Option<Receiver<ArtworkOutcome>>,
    /// IGDB display name of the matched game
    matched_name: Option<String>,
    /// Cover texture
    cover_texture: Option<egui::TextureHandle>,
    /// Text shown in the cover area when there is no texture
    cover_placeholder: String,
    /// Drive selection window, when open
    drive_chooser: Option<DriveChooser>,
    /// Settings window, when open
    settings_dialog: Option<SettingsDialog>,
    /// Running or finished ImgBurn process
    burn_job: Option<BurnJob>,
    /// Receiver for lines from the global logger
    log_receiver: Option<Receiver<String>>,
    /// Status/log messages
    log_messages: Vec<LogMessage>,
    /// Whether to show the log window
    show_log_window: bool,
    /// Dropped files (for drag-and-drop)
    dropped_files: Vec<egui::DroppedFile>,
}

/// A log message with severity level
#[derive(Clone)]
struct LogMessage {
    text: String,
    level: LogLevel,
}

#[derive(Clone, Copy, PartialEq)]
enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
}

impl App {
    /// Create a new App instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        igdb: IgdbClient,
        settings: Settings,
    ) -> Self {
        apply_settings(&cc.egui_ctx, &settings);

        Self {
            settings,
            tools: config.tool_paths(),
            igdb,
            selection: None,
            artwork_receiver: None,
            matched_name: None,
            cover_texture: None,
            cover_placeholder: "No game selected".to_string(),
            drive_chooser: None,
            settings_dialog: None,
            burn_job: None,
            log_receiver: super::take_log_receiver(),
            log_messages: Vec::new(),
            show_log_window: false,
            dropped_files: Vec::new(),
        }
    }

    /// Add a log message
    fn log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.log_messages.push(LogMessage {
            text: message.into(),
            level,
        });
        // Keep only last 200 messages
        if self.log_messages.len() > 200 {
            self.log_messages.remove(0);
        }
    }

    /// Move lines from the global logger into the log window
    fn drain_log_receiver(&mut self) {
        let lines: Vec<String> = match self.log_receiver {
            Some(ref receiver) => receiver.try_iter().collect(),
            None => return,
        };
        for line in lines {
            let level = if line.starts_with("[ERROR]") {
                LogLevel::Error
            } else if line.starts_with("[WARN]") {
                LogLevel::Warning
            } else {
                LogLevel::Info
            };
            self.log(level, line);
        }
    }

    /// Open file picker dialog
    fn open_file_picker(&mut self) {
        if let Some(path) = rfd::FileDialog::new()
            .add_filter("Game Images", supported_extensions())
            .pick_file()
        {
            self.select_file(path);
        }
    }

    /// Identify a disc image and start the cover art lookup
    fn select_file(&mut self, path: PathBuf) {
        let selection = DiscSelection::identify(&path);
        self.log(
            LogLevel::Info,
            format!(
                "Selected {} (console: {}, title: {:?})",
                path.display(),
                selection.console,
                selection.title
            ),
        );

        self.matched_name = None;
        self.cover_texture = None;

        if self.settings.fetch_box_art {
            self.cover_placeholder = "Loading box art...".to_string();
            // Replacing the receiver drops any older in-flight result
            self.artwork_receiver = Some(spawn_artwork_fetch(self.igdb.clone(), selection.title.clone()));
        } else {
            self.cover_placeholder = "Box art download disabled".to_string();
            self.artwork_receiver = None;
        }

        self.selection = Some(selection);
    }

    /// Poll for the artwork fetch result
    fn poll_artwork(&mut self, ctx: &egui::Context) {
        let Some(ref receiver) = self.artwork_receiver else {
            return;
        };

        match receiver.try_recv() {
            Ok(outcome) => {
                self.artwork_receiver = None;
                self.matched_name = outcome.metadata.map(|m| m.name);

                let texture = outcome.image.as_deref().and_then(|bytes| {
                    match load_image_from_bytes(bytes) {
                        Ok(image) => Some(ctx.load_texture("cover", image, egui::TextureOptions::LINEAR)),
                        Err(e) => {
                            log::debug!("{}", e);
                            None
                        }
                    }
                });

                if texture.is_some() {
                    self.log(LogLevel::Success, format!("Box art loaded for {:?}", outcome.title));
                } else {
                    self.cover_placeholder = "No box art found.".to_string();
                }
                self.cover_texture = texture;
            }
            Err(TryRecvError::Empty) => {
                // Still loading
            }
            Err(TryRecvError::Disconnected) => {
                self.artwork_receiver = None;
                self.cover_placeholder = "No box art found.".to_string();
            }
        }
    }

    /// Start a burn: enumerate drives and pick one
    fn start_burn(&mut self) {
        let drives = find_optical_drives(&SystemDrives);
        let source = self.selection.as_ref().map(|s| s.path.as_path());

        match plan_drive(source, drives) {
            Ok(DrivePlan::Confirm(drive)) => {
                let use_it = dialogs::confirm(
                    "Use Detected Drive",
                    &format!("Detected DVD drive: {}\nUse this drive?", drive),
                );
                if use_it {
                    self.burn_on(drive);
                } else {
                    self.drive_chooser = Some(DriveChooser::new(vec![drive]));
                }
            }
            Ok(DrivePlan::Choose(drives)) => {
                self.drive_chooser = Some(DriveChooser::new(drives));
            }
            Err(e @ BurnError::NoGameSelected) => {
                dialogs::warning("No Game", &e.to_string());
            }
            Err(e) => {
                self.log(LogLevel::Warning, e.to_string());
                dialogs::warning("No DVD Drive Found", &e.to_string());
            }
        }
    }

    /// Run the payload step and launch ImgBurn on `drive`
    fn burn_on(&mut self, drive: OpticalDrive) {
        let Some(selection) = self.selection.clone() else {
            return;
        };

        let prepared = match prepare_burn(
            &selection.path,
            selection.console,
            drive.clone(),
            &self.tools,
            &mut DialogPrompt,
            &ProcessPatchRunner,
        ) {
            Ok(prepared) => prepared,
            Err(e) => {
                self.log(LogLevel::Error, format!("Payload error: {}", e));
                dialogs::warning("Payload Error", &e.to_string());
                return;
            }
        };
        dialogs::info("Payload", &prepared.payload_message);

        match prepared.launch() {
            Ok(job) => {
                self.log(LogLevel::Success, format!("Burning started on drive {}", drive));
                if self.settings.show_instructions {
                    dialogs::info(
                        &format!("{} Instructions", selection.console),
                        selection.console.instructions(),
                    );
                }
                dialogs::info("Burning Started", &format!("Burning started on drive {}", drive));
                self.burn_job = Some(job);
            }
            Err(e) => {
                self.log(LogLevel::Error, e.to_string());
                let title = match e {
                    BurnError::BurnerMissing(_) => "ImgBurn Not Found",
                    _ => "Burn Failed",
                };
                dialogs::error(title, &e.to_string());
            }
        }
    }

    /// Poll the running burn, if any
    fn poll_burn(&mut self) {
        let Some(ref mut job) = self.burn_job else {
            return;
        };
        let was_running = job.status().is_running();
        let status = job.poll().clone();
        let drive = job.drive().clone();

        if was_running && !status.is_running() {
            match status {
                BurnStatus::Finished(Some(0)) => {
                    self.log(LogLevel::Success, format!("ImgBurn finished on drive {}", drive));
                }
                BurnStatus::Finished(code) => {
                    self.log(LogLevel::Warning, format!("ImgBurn exited on drive {} (code {:?})", drive, code));
                }
                BurnStatus::Failed(e) => {
                    self.log(LogLevel::Error, format!("Lost track of ImgBurn: {}", e));
                }
                BurnStatus::Cancelled | BurnStatus::Running => {}
            }
        }
    }

    fn cancel_burn(&mut self) {
        let result = match self.burn_job {
            Some(ref mut job) => job.cancel(),
            None => return,
        };
        match result {
            Ok(()) => self.log(LogLevel::Warning, "Burn cancelled"),
            Err(e) => self.log(LogLevel::Error, format!("Failed to cancel burn: {}", e)),
        }
    }

    fn show_dialogs(&mut self, ctx: &egui::Context) {
        if let Some(ref mut chooser) = self.drive_chooser {
            match chooser.show(ctx) {
                DialogResult::Open => {}
                DialogResult::Cancelled => self.drive_chooser = None,
                DialogResult::Accepted(drive) => {
                    self.drive_chooser = None;
                    let correct = dialogs::confirm(
                        "Confirm Drive",
                        &format!("You selected drive: {}\nIs this correct?", drive),
                    );
                    if correct {
                        self.burn_on(drive);
                    }
                }
            }
        }

        if let Some(ref mut dialog) = self.settings_dialog {
            match dialog.show(ctx) {
                DialogResult::Open => {}
                DialogResult::Cancelled => self.settings_dialog = None,
                DialogResult::Accepted(new_settings) => {
                    self.settings_dialog = None;
                    match new_settings.save() {
                        Ok(()) => dialogs::info("Saved", "Changes saved. Restart app to apply."),
                        Err(e) => {
                            self.log(LogLevel::Error, e.to_string());
                            dialogs::error("Settings", &e.to_string());
                        }
                    }
                }
            }
        }
    }
}

/// Apply theme and font size at startup
fn apply_settings(ctx: &egui::Context, settings: &Settings) {
    ctx.set_theme(match settings.theme {
        Theme::Dark => egui::Theme::Dark,
        Theme::Light => egui::Theme::Light,
    });

    let size = settings.font_size.points() as f32;
    ctx.style_mut(|style| {
        for (text_style, font_id) in style.text_styles.iter_mut() {
            font_id.size = match text_style {
                egui::TextStyle::Heading => size + 6.0,
                egui::TextStyle::Small => size - 2.0,
                _ => size,
            };
        }
    });
}

/// Load image from bytes into egui ColorImage
fn load_image_from_bytes(bytes: &[u8]) -> Result<egui::ColorImage, String> {
    let image = image::load_from_memory(bytes)
        .map_err(|e| format!("Failed to decode image: {}", e))?;

    let size = [image.width() as usize, image.height() as usize];
    let image_buffer = image.to_rgba8();
    let pixels = image_buffer.as_flat_samples();

    Ok(egui::ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()))
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.drain_log_receiver();
        self.poll_artwork(ctx);
        self.poll_burn();

        // Request repaint while background work is pending
        let burning = self.burn_job.as_ref().is_some_and(|j| j.status().is_running());
        if self.artwork_receiver.is_some() || burning {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }

        // Handle dropped files
        ctx.input(|i| {
            if !i.raw.dropped_files.is_empty() {
                self.dropped_files = i.raw.dropped_files.clone();
            }
        });

        if let Some(file) = self.dropped_files.pop() {
            self.dropped_files.clear();
            if let Some(path) = file.path {
                if DiscFormat::from_path(&path).is_some() {
                    self.select_file(path);
                } else {
                    self.log(LogLevel::Warning, format!("Not a game image: {}", path.display()));
                }
            }
        }

        // Top panel with title
        egui::TopBottomPanel::top("top_panel").show(ctx, |ui| {
            ui.add_space(4.0);
            ui.horizontal(|ui| {
                ui.heading("Game Disc Burner");
                ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                    if ui.button("⚙").on_hover_text("Settings").clicked() && self.settings_dialog.is_none() {
                        self.settings_dialog = Some(SettingsDialog::new(&self.settings));
                    }
                    let log_btn_text = if self.show_log_window { "Hide Log" } else { "Show Log" };
                    if ui.button(log_btn_text).clicked() {
                        self.show_log_window = !self.show_log_window;
                    }
                    ui.label(format!("v{}", env!("APP_VERSION")));
                });
            });
            ui.add_space(4.0);
        });

        // Log window (separate window, hidden by default)
        if self.show_log_window {
            egui::Window::new("Log")
                .open(&mut self.show_log_window)
                .default_size([500.0, 300.0])
                .resizable(true)
                .show(ctx, |ui| {
                    if ui.button("Clear").clicked() {
                        self.log_messages.clear();
                    }
                    ui.separator();

                    egui::ScrollArea::vertical()
                        .auto_shrink([false, false])
                        .stick_to_bottom(true)
                        .show(ui, |ui| {
                            for msg in &self.log_messages {
                                let color = match msg.level {
                                    LogLevel::Info => egui::Color32::GRAY,
                                    LogLevel::Success => egui::Color32::GREEN,
                                    LogLevel::Warning => egui::Color32::YELLOW,
                                    LogLevel::Error => egui::Color32::RED,
                                };
                                ui.colored_label(color, &msg.text);
                            }
                        });
                });
        }

        let mut pick_file = false;
        let mut burn = false;
        let mut cancel = false;

        egui::CentralPanel::default().show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                let console = self
                    .selection
                    .as_ref()
                    .map(|s| s.console.display_name())
                    .unwrap_or("None");
                match self.selection.as_ref().and_then(|s| s.format) {
                    Some(format) => {
                        ui.label(format!("Detected Console: {} ({})", console, format.display_name()));
                    }
                    None => {
                        ui.label(format!("Detected Console: {}", console));
                    }
                }

                match self.selection {
                    Some(ref selection) => {
                        ui.label(format!("Detected Game Title: {}", selection.title));
                        if let Some(ref name) = self.matched_name {
                            ui.label(egui::RichText::new(format!("IGDB: {}", name)).weak());
                        }
                    }
                    None => {
                        ui.label("No game selected");
                    }
                }
                ui.add_space(8.0);

                // Cover art area
                let (rect, _) = ui.allocate_exact_size(COVER_SIZE, egui::Sense::hover());
                ui.painter().rect_filled(rect, 2.0, egui::Color32::from_gray(34));
                ui.painter().rect_stroke(rect, 2.0, egui::Stroke::new(1.0, egui::Color32::GRAY));
                if let Some(ref texture) = self.cover_texture {
                    let size = texture.size_vec2();
                    let scale = (COVER_SIZE.x / size.x).min(COVER_SIZE.y / size.y);
                    let image_rect = egui::Rect::from_center_size(rect.center(), size * scale);
                    egui::Image::new((texture.id(), size * scale)).paint_at(ui, image_rect);
                } else {
                    if self.artwork_receiver.is_some() {
                        ui.put(
                            egui::Rect::from_center_size(rect.center() - egui::vec2(0.0, 24.0), egui::vec2(24.0, 24.0)),
                            egui::Spinner::new(),
                        );
                    }
                    ui.painter().text(
                        rect.center(),
                        egui::Align2::CENTER_CENTER,
                        &self.cover_placeholder,
                        egui::TextStyle::Body.resolve(ui.style()),
                        egui::Color32::LIGHT_GRAY,
                    );
                }
                ui.add_space(12.0);

                ui.horizontal(|ui| {
                    if ui.button("Select Game File (ISO, BIN, CUE)").clicked() {
                        pick_file = true;
                    }
                    let can_burn = self.selection.is_some() && !burning;
                    if ui.add_enabled(can_burn, egui::Button::new("Burn Game")).clicked() {
                        burn = true;
                    }
                });

                if let Some(ref job) = self.burn_job {
                    ui.add_space(8.0);
                    match job.status() {
                        BurnStatus::Running => {
                            ui.horizontal(|ui| {
                                ui.spinner();
                                let file = job
                                    .source()
                                    .file_name()
                                    .map(|n| n.to_string_lossy().into_owned())
                                    .unwrap_or_default();
                                ui.label(format!("Burning {} on {}...", file, job.drive()));
                                if ui.button("Cancel").clicked() {
                                    cancel = true;
                                }
                            });
                        }
                        BurnStatus::Finished(Some(0)) => {
                            ui.label(format!("ImgBurn finished on {}", job.drive()));
                        }
                        BurnStatus::Finished(code) => {
                            ui.label(format!("ImgBurn exited with code {:?}", code));
                        }
                        BurnStatus::Cancelled => {
                            ui.label("Burn cancelled");
                        }
                        BurnStatus::Failed(e) => {
                            ui.label(format!("Burn status unknown: {}", e));
                        }
                    }
                }
            });
        });

        if pick_file {
            self.open_file_picker();
        }
        if burn {
            self.start_burn();
        }
        if cancel {
            self.cancel_burn();
        }

        self.show_dialogs(ctx);
        preview_files_being_dropped(ctx);
    }
}

/// Preview files being dragged over the window
fn preview_files_being_dropped(ctx: &egui::Context) {
    use egui::{Align2, Color32, Id, LayerId, Order, TextStyle};

    if !ctx.input(|i| i.raw.hovered_files.is_empty()) {
        let painter =
            ctx.layer_painter(LayerId::new(Order::Foreground, Id::new("file_drop_target")));

        let screen_rect = ctx.screen_rect();
        painter.rect_filled(screen_rect, 0.0, Color32::from_black_alpha(192));
        painter.text(
            screen_rect.center(),
            Align2::CENTER_CENTER,
            "Drop game image to select",
            TextStyle::Heading.resolve(&ctx.style()),
            Color32::WHITE,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_failure_is_error() {
        assert!(load_image_from_bytes(b"not an image").is_err());
    }

    #[test]
    fn test_decode_png() {
        let mut png = Vec::new();
        image::RgbaImage::from_pixel(3, 2, image::Rgba([255, 0, 0, 255]))
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();

        let decoded = load_image_from_bytes(&png).unwrap();
        assert_eq!(decoded.size, [3, 2]);
    }
}
