use env_logger::{Env, Logger};
use log::{Log, Metadata, Record, SetLoggerError};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Mutex;

/// Logger that writes to stderr through env_logger and also forwards
/// formatted lines into an mpsc channel for the UI log window.
pub struct UiLogger {
    inner: Logger,
    sender: Mutex<Sender<String>>,
}

impl UiLogger {
    /// Install the UI logger and return the receiver to read log lines from.
    /// Filtering follows `RUST_LOG`, defaulting to `info`.
    pub fn init() -> Result<Receiver<String>, SetLoggerError> {
        let (logger, rx) = Self::new(Env::default().default_filter_or("info"));
        let max_level = logger.inner.filter();

        log::set_boxed_logger(Box::new(logger))?;
        log::set_max_level(max_level);
        Ok(rx)
    }

    fn new(env: Env<'_>) -> (Self, Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        let logger = UiLogger {
            inner: env_logger::Builder::from_env(env).build(),
            sender: Mutex::new(tx),
        };
        (logger, rx)
    }
}

/// Format a record the way the log window shows it
fn format_record(record: &Record) -> String {
    let mut msg = format!("[{}] {}: {}", record.level(), record.target(), record.args());
    if let (Some(file), Some(line)) = (record.file(), record.line()) {
        msg.push_str(&format!(" ({}:{})", file, line));
    }
    msg
}

impl Log for UiLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        self.inner.enabled(metadata)
    }

    fn log(&self, record: &Record) {
        if self.inner.matches(record) {
            self.inner.log(record);
            if let Ok(sender) = self.sender.lock() {
                let _ = sender.send(format_record(record));
            }
        }
    }

    fn flush(&self) {
        self.inner.flush();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use log::Level;

    #[test]
    fn test_forwards_enabled_records() {
        let env = Env::new().filter("GAME_DISC_BURNER_TEST_LOG").default_filter_or("info");
        let (logger, rx) = UiLogger::new(env);

        logger.log(
            &Record::builder()
                .level(Level::Info)
                .target("game_disc_burner::burn")
                .args(format_args!("Launching ImgBurn"))
                .file(Some("src/burn.rs"))
                .line(Some(42))
                .build(),
        );
        logger.log(
            &Record::builder()
                .level(Level::Debug)
                .target("game_disc_burner::drives")
                .args(format_args!("hidden"))
                .build(),
        );

        let lines: Vec<String> = rx.try_iter().collect();
        assert_eq!(
            lines,
            vec!["[INFO] game_disc_burner::burn: Launching ImgBurn (src/burn.rs:42)".to_string()]
        );
    }
}
