//! ImgBurn invocation
//!
//! A burn goes through three steps: pick a drive, run the console payload
//! step, then launch ImgBurn. Each step refuses to continue when the previous
//! one failed, so ImgBurn is never started without a drive or after a failed
//! payload step.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Child, Command};
use thiserror::Error;

use crate::config::ToolPaths;
use crate::disc::Console;
use crate::drives::OpticalDrive;
use crate::payload::{apply_payload, PatchRunner, PayloadError, Prompt};

/// Errors that stop a burn
#[derive(Error, Debug)]
pub enum BurnError {
    #[error("Please select a game file first.")]
    NoGameSelected,

    #[error("No DVD drive detected.")]
    NoOpticalDrive,

    #[error(transparent)]
    Payload(#[from] PayloadError),

    #[error("ImgBurn.exe not found at:\n{0}")]
    BurnerMissing(PathBuf),

    #[error("Failed to start ImgBurn: {0}")]
    LaunchFailed(#[source] std::io::Error),
}

/// How the target drive should be picked
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DrivePlan {
    /// Exactly one drive found; ask the user to confirm it
    Confirm(OpticalDrive),
    /// Several drives found; let the user choose one
    Choose(Vec<OpticalDrive>),
}

/// Decide how to pick the drive for a burn
pub fn plan_drive(source: Option<&Path>, mut drives: Vec<OpticalDrive>) -> Result<DrivePlan, BurnError> {
    if source.is_none() {
        return Err(BurnError::NoGameSelected);
    }

    match drives.len() {
        0 => Err(BurnError::NoOpticalDrive),
        1 => Ok(DrivePlan::Confirm(drives.remove(0))),
        _ => Ok(DrivePlan::Choose(drives)),
    }
}

/// ImgBurn command line for an ISO burn
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BurnCommand {
    pub burner: PathBuf,
    pub source: PathBuf,
    pub drive: OpticalDrive,
}

impl BurnCommand {
    /// Arguments passed to ImgBurn, in order
    pub fn args(&self) -> Vec<OsString> {
        vec![
            "/MODE".into(),
            "ISOBURN".into(),
            "/SRC".into(),
            self.source.clone().into_os_string(),
            "/DEST".into(),
            self.drive.as_str().into(),
            "/START".into(),
            "/CLOSE".into(),
        ]
    }
}

/// A burn that passed the payload step and is ready to launch
#[derive(Debug, Clone)]
pub struct PreparedBurn {
    pub command: BurnCommand,
    /// Advisory message from the payload step
    pub payload_message: String,
}

/// Run the payload step and build the ImgBurn command
///
/// Returns [`BurnError::Payload`] without building a command when the payload
/// step fails.
pub fn prepare_burn(
    source: &Path,
    console: Console,
    drive: OpticalDrive,
    tools: &ToolPaths,
    prompt: &mut dyn Prompt,
    runner: &dyn PatchRunner,
) -> Result<PreparedBurn, BurnError> {
    let payload_message = apply_payload(console, source, &tools.payload, prompt, runner)?;
    log::info!("Payload step for {}: {}", console, payload_message);

    Ok(PreparedBurn {
        command: BurnCommand {
            burner: tools.imgburn.clone(),
            source: source.to_path_buf(),
            drive,
        },
        payload_message,
    })
}

impl PreparedBurn {
    /// Start ImgBurn without waiting for it
    pub fn launch(self) -> Result<BurnJob, BurnError> {
        let command = self.command;
        if !command.burner.is_file() {
            return Err(BurnError::BurnerMissing(command.burner));
        }

        log::info!(
            "Launching {} {:?}",
            command.burner.display(),
            command.args()
        );

        let child = Command::new(&command.burner)
            .args(command.args())
            .spawn()
            .map_err(BurnError::LaunchFailed)?;

        Ok(BurnJob {
            drive: command.drive,
            source: command.source,
            child,
            status: BurnStatus::Running,
        })
    }
}

/// State of a launched burn
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BurnStatus {
    Running,
    /// ImgBurn exited; `None` when it was killed by a signal
    Finished(Option<i32>),
    Cancelled,
    /// The process could not be queried
    Failed(String),
}

impl BurnStatus {
    pub fn is_running(&self) -> bool {
        matches!(self, BurnStatus::Running)
    }
}

/// A running ImgBurn process
#[derive(Debug)]
pub struct BurnJob {
    drive: OpticalDrive,
    source: PathBuf,
    child: Child,
    status: BurnStatus,
}

impl BurnJob {
    pub fn drive(&self) -> &OpticalDrive {
        &self.drive
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn status(&self) -> &BurnStatus {
        &self.status
    }

    /// Check whether ImgBurn has exited, without blocking
    pub fn poll(&mut self) -> &BurnStatus {
        if self.status.is_running() {
            match self.child.try_wait() {
                Ok(Some(exit)) => {
                    log::info!("ImgBurn on {} exited with {}", self.drive, exit);
                    self.status = BurnStatus::Finished(exit.code());
                }
                Ok(None) => {}
                Err(e) => {
                    log::warn!("Lost track of ImgBurn on {}: {}", self.drive, e);
                    self.status = BurnStatus::Failed(e.to_string());
                }
            }
        }
        &self.status
    }

    /// Kill ImgBurn if it is still running
    pub fn cancel(&mut self) -> std::io::Result<()> {
        if !self.status.is_running() {
            return Ok(());
        }
        self.child.kill()?;
        // Reap the process so it does not linger as a zombie
        let _ = self.child.wait();
        log::info!("Cancelled burn on {}", self.drive);
        self.status = BurnStatus::Cancelled;
        Ok(())
    }
}
