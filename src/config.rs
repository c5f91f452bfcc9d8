//! Application configuration
//!
//! Handles loading the required API credentials and tool paths from
//! config.json, and the user-editable display settings from settings.json.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::payload::PayloadLayout;

/// Name of the required configuration file
pub const CONFIG_FILE: &str = "config.json";

/// Name of the settings file written by the settings dialog
pub const SETTINGS_FILE: &str = "settings.json";

/// Errors that can occur when loading or saving configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("{0} not found in the working directory or next to the executable")]
    NotFound(&'static str),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Missing {0} in config.json")]
    MissingCredential(&'static str),
}

/// Root application configuration (config.json)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Twitch application client ID used for IGDB access
    #[serde(rename = "TWITCH_CLIENT_ID", default)]
    pub client_id: String,
    /// Twitch application client secret
    #[serde(rename = "TWITCH_CLIENT_SECRET", default)]
    pub client_secret: String,
    /// Location of ImgBurn.exe
    #[serde(default = "default_imgburn_path")]
    pub imgburn_path: PathBuf,
    /// Folder holding per-console payloads (PS2 patcher, Xbox SID files)
    #[serde(default = "default_payload_dir")]
    pub payload_dir: PathBuf,
    #[serde(default)]
    pub igdb: IgdbEndpoints,
}

fn default_imgburn_path() -> PathBuf {
    PathBuf::from(r"C:\Program Files (x86)\ImgBurn\ImgBurn.exe")
}

fn default_payload_dir() -> PathBuf {
    PathBuf::from("payload")
}

/// IGDB / Twitch endpoint URLs
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct IgdbEndpoints {
    /// OAuth2 client-credentials token URL
    #[serde(default = "default_token_url")]
    pub token_url: String,
    /// Game search URL
    #[serde(default = "default_games_url")]
    pub games_url: String,
    /// Cover image base URL
    #[serde(default = "default_image_base_url")]
    pub image_base_url: String,
}

fn default_token_url() -> String {
    "https://id.twitch.tv/oauth2/token".to_string()
}

fn default_games_url() -> String {
    "https://api.igdb.com/v4/games".to_string()
}

fn default_image_base_url() -> String {
    "https://images.igdb.com/igdb/image/upload".to_string()
}

impl Default for IgdbEndpoints {
    fn default() -> Self {
        Self {
            token_url: default_token_url(),
            games_url: default_games_url(),
            image_base_url: default_image_base_url(),
        }
    }
}

/// Paths of the external tools used during a burn
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub imgburn: PathBuf,
    pub payload: PayloadLayout,
}

impl AppConfig {
    /// Load configuration from config.json
    ///
    /// Looks in the current directory first, then next to the executable.
    /// A missing file, malformed JSON or empty credentials are errors.
    pub fn load() -> Result<Self, ConfigError> {
        let path = locate(CONFIG_FILE).ok_or(ConfigError::NotFound(CONFIG_FILE))?;
        let config = Self::load_from_path(&path)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Load and validate configuration from a specific file
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AppConfig = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::MissingCredential("TWITCH_CLIENT_ID"));
        }
        if self.client_secret.trim().is_empty() {
            return Err(ConfigError::MissingCredential("TWITCH_CLIENT_SECRET"));
        }
        Ok(())
    }

    /// External tool locations derived from this config
    pub fn tool_paths(&self) -> ToolPaths {
        ToolPaths {
            imgburn: self.imgburn_path.clone(),
            payload: PayloadLayout::new(&self.payload_dir),
        }
    }
}

/// Find a file in the current directory or the executable's directory
fn locate(file_name: &str) -> Option<PathBuf> {
    let local = PathBuf::from(file_name);
    if local.is_file() {
        return Some(local);
    }

    let exe_path = std::env::current_exe().ok()?;
    let candidate = exe_path.parent()?.join(file_name);
    candidate.is_file().then_some(candidate)
}

/// Color theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub const ALL: [Theme; 2] = [Theme::Dark, Theme::Light];

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Dark => "dark",
            Theme::Light => "light",
        }
    }
}

/// UI font size in points; only 10, 12, 14 and 16 are accepted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct FontSize(u32);

impl FontSize {
    pub const ALLOWED: [u32; 4] = [10, 12, 14, 16];

    pub fn points(&self) -> u32 {
        self.0
    }

    /// All selectable font sizes, smallest first
    pub fn all() -> impl Iterator<Item = FontSize> {
        Self::ALLOWED.into_iter().map(FontSize)
    }
}

impl Default for FontSize {
    fn default() -> Self {
        FontSize(12)
    }
}

impl TryFrom<u32> for FontSize {
    type Error = String;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        if Self::ALLOWED.contains(&value) {
            Ok(FontSize(value))
        } else {
            Err(format!("unsupported font size {} (expected one of {:?})", value, Self::ALLOWED))
        }
    }
}

impl From<FontSize> for u32 {
    fn from(size: FontSize) -> u32 {
        size.0
    }
}

/// User-editable display settings (settings.json)
///
/// Loaded once at startup and never mutated; the settings dialog builds a new
/// value and saves it, and the change takes effect on the next start.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub theme: Theme,
    #[serde(default)]
    pub font_size: FontSize,
    /// Show boot instructions for the console after a burn starts
    #[serde(default = "default_true")]
    pub show_instructions: bool,
    /// Look up cover art when a file is selected
    #[serde(default = "default_true")]
    pub fetch_box_art: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::default(),
            font_size: FontSize::default(),
            show_instructions: true,
            fetch_box_art: true,
        }
    }
}

impl Settings {
    /// Load settings.json from the current directory, falling back to defaults
    pub fn load() -> Self {
        Self::load_from_path(Path::new(SETTINGS_FILE))
    }

    /// Load settings from a specific file, falling back to defaults
    pub fn load_from_path(path: &Path) -> Self {
        if !path.exists() {
            log::info!("No {} found, using default settings", path.display());
            return Self::default();
        }

        match fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| serde_json::from_str::<Settings>(&content).map_err(|e| e.to_string()))
        {
            Ok(settings) => {
                log::info!("Loaded settings from {}", path.display());
                settings
            }
            Err(e) => {
                log::warn!("Ignoring invalid {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Save settings to settings.json in the current directory
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to_path(Path::new(SETTINGS_FILE))
    }

    /// Save settings to a specific file
    pub fn save_to_path(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        fs::write(path, json).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Saved settings to {}", path.display());
        Ok(())
    }
}
