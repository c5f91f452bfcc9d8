//! Console-specific payload handling before a burn
//!
//! Some consoles need the image patched or extra files added before a burned
//! disc will boot on real hardware. The policy here is keyed purely on the
//! detected console and keeps no state between calls.

use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

use crate::disc::Console;

/// File name of the PS2 ESR patcher inside `payload/PS2`
pub const ESR_PATCHER_EXE: &str = "FDVDB_ESR_Patcher.exe";

/// Errors from the payload step; any of these aborts the burn
#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("ESR patcher not found at {0}")]
    PatcherMissing(PathBuf),

    #[error("ESR patcher failed: {0}")]
    PatchFailed(String),

    #[error("SID payload folder missing: {0}")]
    PayloadFolderMissing(PathBuf),
}

/// Location of the payload folder and the files expected inside it
#[derive(Debug, Clone)]
pub struct PayloadLayout {
    base: PathBuf,
}

impl PayloadLayout {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn ps2_patcher(&self) -> PathBuf {
        self.base.join("PS2").join(ESR_PATCHER_EXE)
    }

    pub fn xbox_dir(&self) -> PathBuf {
        self.base.join("Xbox")
    }
}

/// Asks the user a yes/no question
pub trait Prompt {
    fn confirm(&mut self, title: &str, message: &str) -> bool;
}

/// Runs the external patcher on a disc image
pub trait PatchRunner {
    /// Run `patcher` with `image` as its only argument and wait for it
    fn run_patcher(&self, patcher: &Path, image: &Path) -> Result<(), PayloadError>;
}

/// Runs the patcher as a child process and blocks until it exits
pub struct ProcessPatchRunner;

impl PatchRunner for ProcessPatchRunner {
    fn run_patcher(&self, patcher: &Path, image: &Path) -> Result<(), PayloadError> {
        log::info!("Running {} on {}", patcher.display(), image.display());

        let status = Command::new(patcher)
            .arg(image)
            .status()
            .map_err(|e| PayloadError::PatchFailed(e.to_string()))?;

        if status.success() {
            Ok(())
        } else {
            Err(PayloadError::PatchFailed(format!("patcher exited with {}", status)))
        }
    }
}

/// Apply whatever payload the console needs before burning
///
/// Returns an advisory message to show the user on success. PS2 images are
/// patched in place after the user agrees; this blocks until the patcher
/// exits.
pub fn apply_payload(
    console: Console,
    image: &Path,
    layout: &PayloadLayout,
    prompt: &mut dyn Prompt,
    runner: &dyn PatchRunner,
) -> Result<String, PayloadError> {
    match console {
        Console::Ps2 => {
            let patcher = layout.ps2_patcher();
            if !patcher.is_file() {
                return Err(PayloadError::PatcherMissing(patcher));
            }

            let patch = prompt.confirm(
                "ESR Patch",
                "This PS2 game may require patching for FreeMcBoot. Patch it now?",
            );
            if !patch {
                log::info!("User skipped ESR patch for {}", image.display());
                return Ok("User skipped ESR patch.".to_string());
            }

            runner.run_patcher(&patcher, image)?;
            Ok("ESR patch applied.".to_string())
        }
        Console::Xbox => {
            let dir = layout.xbox_dir();
            if !dir.is_dir() {
                return Err(PayloadError::PayloadFolderMissing(dir));
            }
            Ok("Include SID manually on ISO root using DVD burning.".to_string())
        }
        Console::Wii => Ok(
            "Wii games typically do not need extra payloads if they are already scrubbed ISO."
                .to_string(),
        ),
        Console::Xbox360 => Ok(
            "Xbox 360 backups must be in .dvd/.iso format and burned using layer break settings \
             (ImgBurn does this automatically)."
                .to_string(),
        ),
        Console::Ps3 => Ok(
            "Requires CFW or HEN to install via USB or ISO mount. Not bootable directly from DVD."
                .to_string(),
        ),
        other => Ok(format!("No payload needed for {}.", other)),
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// Prompt that always gives the same answer and counts questions
    pub(crate) struct FixedPrompt {
        pub answer: bool,
        pub asked: usize,
    }

    impl FixedPrompt {
        pub fn new(answer: bool) -> Self {
            Self { answer, asked: 0 }
        }
    }

    impl Prompt for FixedPrompt {
        fn confirm(&mut self, _title: &str, _message: &str) -> bool {
            self.asked += 1;
            self.answer
        }
    }

    /// Patch runner that records calls instead of starting processes
    #[derive(Default)]
    pub(crate) struct RecordingRunner {
        pub calls: RefCell<Vec<(PathBuf, PathBuf)>>,
        pub fail: bool,
    }

    impl PatchRunner for RecordingRunner {
        fn run_patcher(&self, patcher: &Path, image: &Path) -> Result<(), PayloadError> {
            self.calls
                .borrow_mut()
                .push((patcher.to_path_buf(), image.to_path_buf()));
            if self.fail {
                Err(PayloadError::PatchFailed("exit code 1".to_string()))
            } else {
                Ok(())
            }
        }
    }

    fn layout_with_patcher() -> (TempDir, PayloadLayout) {
        let dir = TempDir::new().unwrap();
        let layout = PayloadLayout::new(dir.path());
        fs::create_dir_all(layout.ps2_patcher().parent().unwrap()).unwrap();
        fs::write(layout.ps2_patcher(), b"").unwrap();
        (dir, layout)
    }

    #[test]
    fn test_ps2_missing_patcher_fails_without_running() {
        let dir = TempDir::new().unwrap();
        let layout = PayloadLayout::new(dir.path());
        let mut prompt = FixedPrompt::new(true);
        let runner = RecordingRunner::default();

        let err = apply_payload(Console::Ps2, Path::new("game.iso"), &layout, &mut prompt, &runner)
            .unwrap_err();

        assert!(matches!(err, PayloadError::PatcherMissing(_)));
        assert!(err.to_string().contains("patcher"));
        assert_eq!(prompt.asked, 0);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_ps2_patch_accepted() {
        let (_dir, layout) = layout_with_patcher();
        let mut prompt = FixedPrompt::new(true);
        let runner = RecordingRunner::default();

        let msg = apply_payload(Console::Ps2, Path::new("okami.iso"), &layout, &mut prompt, &runner)
            .unwrap();

        assert_eq!(msg, "ESR patch applied.");
        assert_eq!(prompt.asked, 1);
        let calls = runner.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, layout.ps2_patcher());
        assert_eq!(calls[0].1, PathBuf::from("okami.iso"));
    }

    #[test]
    fn test_ps2_patch_declined() {
        let (_dir, layout) = layout_with_patcher();
        let mut prompt = FixedPrompt::new(false);
        let runner = RecordingRunner::default();

        let msg = apply_payload(Console::Ps2, Path::new("okami.iso"), &layout, &mut prompt, &runner)
            .unwrap();

        assert_eq!(msg, "User skipped ESR patch.");
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_ps2_patch_failure() {
        let (_dir, layout) = layout_with_patcher();
        let mut prompt = FixedPrompt::new(true);
        let runner = RecordingRunner {
            fail: true,
            ..Default::default()
        };

        let err = apply_payload(Console::Ps2, Path::new("okami.iso"), &layout, &mut prompt, &runner)
            .unwrap_err();
        assert!(matches!(err, PayloadError::PatchFailed(_)));
    }

    #[test]
    fn test_xbox_requires_payload_folder() {
        let dir = TempDir::new().unwrap();
        let layout = PayloadLayout::new(dir.path());
        let mut prompt = FixedPrompt::new(true);
        let runner = RecordingRunner::default();

        let err = apply_payload(Console::Xbox, Path::new("halo.iso"), &layout, &mut prompt, &runner)
            .unwrap_err();
        assert!(matches!(err, PayloadError::PayloadFolderMissing(_)));

        fs::create_dir_all(layout.xbox_dir()).unwrap();
        let msg = apply_payload(Console::Xbox, Path::new("halo.iso"), &layout, &mut prompt, &runner)
            .unwrap();
        assert!(msg.contains("SID"));
    }

    #[test]
    fn test_advisory_consoles_always_succeed() {
        let dir = TempDir::new().unwrap();
        let layout = PayloadLayout::new(dir.path().join("does-not-exist"));
        let mut prompt = FixedPrompt::new(false);
        let runner = RecordingRunner::default();

        for console in [Console::Wii, Console::Xbox360, Console::Ps3] {
            let msg = apply_payload(console, Path::new("x.iso"), &layout, &mut prompt, &runner);
            assert!(msg.is_ok(), "{} should not fail", console);
        }
        assert_eq!(prompt.asked, 0);
        assert!(runner.calls.borrow().is_empty());
    }

    #[test]
    fn test_other_consoles_need_nothing() {
        let layout = PayloadLayout::new("payload");
        let mut prompt = FixedPrompt::new(true);
        let runner = RecordingRunner::default();

        let msg = apply_payload(Console::Pc, Path::new("x.iso"), &layout, &mut prompt, &runner).unwrap();
        assert_eq!(msg, "No payload needed for PC.");
        let msg = apply_payload(Console::Unknown, Path::new("x"), &layout, &mut prompt, &runner).unwrap();
        assert_eq!(msg, "No payload needed for Unknown.");
    }

    #[test]
    fn test_process_runner_missing_executable() {
        let dir = TempDir::new().unwrap();
        let err = ProcessPatchRunner
            .run_patcher(&dir.path().join("nope.exe"), Path::new("game.iso"))
            .unwrap_err();
        assert!(matches!(err, PayloadError::PatchFailed(_)));
    }
}
