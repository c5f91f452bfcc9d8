//! Disc image formats accepted by the burner

use std::path::Path;

/// Supported disc image formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscFormat {
    /// ISO 9660 / UDF disc image (.iso)
    Iso,
    /// BIN/CUE format (raw binary with cue sheet)
    BinCue,
}

impl DiscFormat {
    /// Detect disc format from file extension
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_lowercase();
        match ext.as_str() {
            "iso" => Some(Self::Iso),
            "bin" | "cue" => Some(Self::BinCue),
            _ => None,
        }
    }

    /// Get the display name for this format
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Iso => "ISO",
            Self::BinCue => "BIN/CUE",
        }
    }
}

/// Get all supported file extensions for file dialogs
pub fn supported_extensions() -> &'static [&'static str] {
    &["iso", "bin", "cue"]
}
