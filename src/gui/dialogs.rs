//! Modal dialogs
//!
//! Native message boxes via rfd for confirmations and errors, plus the egui
//! windows for drive selection and settings.

use eframe::egui;
use rfd::{MessageButtons, MessageDialog, MessageDialogResult, MessageLevel};

use crate::config::{FontSize, Settings, Theme};
use crate::drives::OpticalDrive;
use crate::payload::Prompt;

/// Ask a yes/no question; blocks until answered
pub fn confirm(title: &str, message: &str) -> bool {
    MessageDialog::new()
        .set_level(MessageLevel::Info)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::YesNo)
        .show()
        == MessageDialogResult::Yes
}

pub fn info(title: &str, message: &str) {
    show(MessageLevel::Info, title, message);
}

pub fn warning(title: &str, message: &str) {
    show(MessageLevel::Warning, title, message);
}

pub fn error(title: &str, message: &str) {
    show(MessageLevel::Error, title, message);
}

fn show(level: MessageLevel, title: &str, message: &str) {
    MessageDialog::new()
        .set_level(level)
        .set_title(title)
        .set_description(message)
        .set_buttons(MessageButtons::Ok)
        .show();
}

/// Payload prompts answered through native message boxes
pub struct DialogPrompt;

impl Prompt for DialogPrompt {
    fn confirm(&mut self, title: &str, message: &str) -> bool {
        confirm(title, message)
    }
}

/// Result of one frame of an egui dialog
pub enum DialogResult<T> {
    Open,
    Cancelled,
    Accepted(T),
}

/// Drive selection window shown when the burner cannot pick a drive itself
pub struct DriveChooser {
    drives: Vec<OpticalDrive>,
    selected: usize,
}

impl DriveChooser {
    pub fn new(drives: Vec<OpticalDrive>) -> Self {
        Self { drives, selected: 0 }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogResult<OpticalDrive> {
        let mut result = DialogResult::Open;

        egui::Window::new("Select DVD Drive")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                ui.label("Choose the drive to burn to:");
                egui::ComboBox::from_id_salt("drive_combo")
                    .selected_text(
                        self.drives
                            .get(self.selected)
                            .map(|d| d.as_str())
                            .unwrap_or_default(),
                    )
                    .show_ui(ui, |ui| {
                        for (idx, drive) in self.drives.iter().enumerate() {
                            ui.selectable_value(&mut self.selected, idx, drive.as_str());
                        }
                    });

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        if let Some(drive) = self.drives.get(self.selected) {
                            result = DialogResult::Accepted(drive.clone());
                        }
                    }
                    if ui.button("Cancel").clicked() {
                        result = DialogResult::Cancelled;
                    }
                });
            });

        result
    }
}

/// Settings window editing a draft copy of the settings
pub struct SettingsDialog {
    draft: Settings,
}

impl SettingsDialog {
    pub fn new(current: &Settings) -> Self {
        Self {
            draft: current.clone(),
        }
    }

    pub fn show(&mut self, ctx: &egui::Context) -> DialogResult<Settings> {
        let mut result = DialogResult::Open;

        egui::Window::new("Settings")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, [0.0, 0.0])
            .show(ctx, |ui| {
                egui::Grid::new("settings_grid")
                    .num_columns(2)
                    .spacing([12.0, 8.0])
                    .show(ui, |ui| {
                        ui.label("Theme:");
                        egui::ComboBox::from_id_salt("theme_combo")
                            .selected_text(self.draft.theme.as_str())
                            .show_ui(ui, |ui| {
                                for theme in Theme::ALL {
                                    ui.selectable_value(&mut self.draft.theme, theme, theme.as_str());
                                }
                            });
                        ui.end_row();

                        ui.label("Font Size:");
                        egui::ComboBox::from_id_salt("font_size_combo")
                            .selected_text(self.draft.font_size.points().to_string())
                            .show_ui(ui, |ui| {
                                for size in FontSize::all() {
                                    ui.selectable_value(
                                        &mut self.draft.font_size,
                                        size,
                                        size.points().to_string(),
                                    );
                                }
                            });
                        ui.end_row();
                    });

                ui.checkbox(&mut self.draft.fetch_box_art, "Download box art");
                ui.checkbox(&mut self.draft.show_instructions, "Show console instructions after burning");

                ui.add_space(8.0);
                ui.horizontal(|ui| {
                    if ui.button("OK").clicked() {
                        result = DialogResult::Accepted(self.draft.clone());
                    }
                    if ui.button("Cancel").clicked() {
                        result = DialogResult::Cancelled;
                    }
                });
            });

        result
    }
}
