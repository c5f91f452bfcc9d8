//! Logging setup
//!
//! Log records go to stderr and to the in-app log window.

mod ui_logger;

pub use ui_logger::UiLogger;
