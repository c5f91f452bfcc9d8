//! Optical drive enumeration
//!
//! Drives are looked up fresh on every burn attempt since discs and USB
//! drives can come and go while the app is open.

use std::fmt;

/// Drive type code reported for CD/DVD/BD drives (`DRIVE_CDROM`)
pub const DRIVE_CDROM: u32 = 5;

/// An optical drive identified by its letter, e.g. `D:`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OpticalDrive(String);

impl OpticalDrive {
    pub fn from_letter(letter: char) -> Self {
        Self(format!("{}:", letter))
    }

    /// Drive identifier as passed to ImgBurn (`D:`)
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OpticalDrive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Source of logical drive information
pub trait DriveProbe {
    /// Bitmask of present drives; bit 0 is `A:`, bit 25 is `Z:`
    fn logical_drives(&self) -> u32;

    /// Drive type code for a root path such as `D:/`
    fn drive_type(&self, root: &str) -> u32;
}

/// Queries the operating system
pub struct SystemDrives;

#[cfg(windows)]
impl DriveProbe for SystemDrives {
    fn logical_drives(&self) -> u32 {
        // SAFETY: no arguments, returns a plain bitmask
        unsafe { windows::Win32::Storage::FileSystem::GetLogicalDrives() }
    }

    fn drive_type(&self, root: &str) -> u32 {
        use windows::core::PCWSTR;

        let wide: Vec<u16> = root.encode_utf16().chain(std::iter::once(0)).collect();
        // SAFETY: `wide` is NUL-terminated and outlives the call
        unsafe { windows::Win32::Storage::FileSystem::GetDriveTypeW(PCWSTR(wide.as_ptr())) }
    }
}

#[cfg(not(windows))]
impl DriveProbe for SystemDrives {
    fn logical_drives(&self) -> u32 {
        0
    }

    fn drive_type(&self, _root: &str) -> u32 {
        0
    }
}

/// List the optical drives reported by `probe`, in drive letter order
pub fn find_optical_drives(probe: &dyn DriveProbe) -> Vec<OpticalDrive> {
    let mask = probe.logical_drives();

    let drives: Vec<OpticalDrive> = ('A'..='Z')
        .enumerate()
        .filter(|(bit, _)| mask & (1 << bit) != 0)
        .filter(|(_, letter)| probe.drive_type(&format!("{}:/", letter)) == DRIVE_CDROM)
        .map(|(_, letter)| OpticalDrive::from_letter(letter))
        .collect();

    log::debug!("Drive mask {:#010x}, optical drives: {:?}", mask, drives);
    drives
}
