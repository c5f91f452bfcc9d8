//! Game Disc Burner Library
//!
//! Disc image identification, cover art lookup and ImgBurn orchestration.

pub mod api;
pub mod burn;
pub mod config;
pub mod disc;
pub mod drives;
pub mod gui;
pub mod logging;
pub mod payload;
