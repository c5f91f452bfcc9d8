//! Game Disc Burner
//!
//! A Windows GUI application that identifies console disc images, shows their
//! cover art and burns them to DVD with ImgBurn.

use eframe::egui;

use game_disc_burner::api::IgdbClient;
use game_disc_burner::config::{AppConfig, Settings};
use game_disc_burner::gui::{self, dialogs};
use game_disc_burner::logging::UiLogger;

fn main() -> eframe::Result<()> {
    match UiLogger::init() {
        Ok(receiver) => gui::set_log_receiver(receiver),
        Err(e) => eprintln!("Failed to install logger: {}", e),
    }
    log::info!("Game Disc Burner {}", env!("APP_VERSION"));

    let config = match AppConfig::load() {
        Ok(config) => config,
        Err(e) => fatal("Configuration Error", &e.to_string()),
    };

    let igdb = match IgdbClient::connect(&config) {
        Ok(client) => client,
        Err(e) => fatal("IGDB Error", &e.to_string()),
    };

    let settings = Settings::load();

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([600.0, 520.0])
            .with_min_inner_size([480.0, 460.0])
            .with_drag_and_drop(true),
        ..Default::default()
    };

    eframe::run_native(
        "Game Disc Burner",
        options,
        Box::new(|cc| Ok(Box::new(gui::App::new(cc, config, igdb, settings)))),
    )
}

/// Report a startup failure and exit
fn fatal(title: &str, message: &str) -> ! {
    log::error!("{}: {}", title, message);
    dialogs::error(title, message);
    std::process::exit(1);
}
