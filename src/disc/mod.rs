//! Disc image identification
//!
//! Filename-based detection of the target console and the game title used
//! for the cover art lookup.

mod console;
mod formats;
mod title;

pub use console::{console_rules, detect_console, Console, ConsoleRule};
pub use formats::{supported_extensions, DiscFormat};
pub use title::normalize_title;

use std::path::{Path, PathBuf};

/// What the burner knows about the selected disc image
#[derive(Debug, Clone)]
pub struct DiscSelection {
    /// Path to the disc image file
    pub path: PathBuf,
    /// Detected console
    pub console: Console,
    /// Title derived from the filename
    pub title: String,
    /// Image format, if the extension is a known one
    pub format: Option<DiscFormat>,
}

impl DiscSelection {
    /// Identify a disc image from its path
    pub fn identify(path: &Path) -> Self {
        let path_str = path.to_string_lossy();
        Self {
            path: path.to_path_buf(),
            console: detect_console(&path_str),
            title: normalize_title(&path_str),
            format: DiscFormat::from_path(path),
        }
    }
}
