//! Data-at-rest encryption of the root filesystem

use super::common::{find_mount, run_command};
use super::DISK_ENCRYPTION;
use lexaudit_core::{Applicability, Check, CheckContext, CheckOutcome, Finding, OsType, Status};
use std::path::PathBuf;
use std::time::Duration;

/// Verifies that the root filesystem sits on an encrypted volume
/// (dm-crypt/LUKS on Linux, FileVault on macOS).
pub struct DiskEncryptionCheck {
    mounts_path: PathBuf,
    lsblk_program: String,
    fdesetup_program: String,
}

impl DiskEncryptionCheck {
    pub fn new() -> Self {
        Self {
            mounts_path: PathBuf::from("/proc/mounts"),
            lsblk_program: "lsblk".to_string(),
            fdesetup_program: "fdesetup".to_string(),
        }
    }

    /// Read the mount table from another file
    pub fn with_mounts_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.mounts_path = path.into();
        self
    }

    /// Use another `lsblk` binary
    pub fn with_lsblk_program(mut self, program: impl Into<String>) -> Self {
        self.lsblk_program = program.into();
        self
    }

    /// Use another `fdesetup` binary
    pub fn with_fdesetup_program(mut self, program: impl Into<String>) -> Self {
        self.fdesetup_program = program.into();
        self
    }

    fn run_linux(&self, timeout: Duration) -> CheckOutcome {
        let mounts = match std::fs::read_to_string(&self.mounts_path) {
            Ok(content) => content,
            Err(e) => {
                return CheckOutcome::Findings(vec![Finding::new("/").with_observation(
                    Status::Error,
                    format!("Could not read {}: {}", self.mounts_path.display(), e),
                )]);
            }
        };

        let Some((device, fstype)) = find_mount(&mounts, "/") else {
            return CheckOutcome::NoResource(format!(
                "No root filesystem entry found in {}",
                self.mounts_path.display()
            ));
        };

        let mut finding = Finding::new(format!("/ ({})", device));

        if !device.starts_with("/dev/") {
            finding.record(
                Status::Warning,
                format!(
                    "Root filesystem ({} on {}) is not backed by a block device; encryption cannot be verified",
                    fstype, device
                ),
            );
            return CheckOutcome::Findings(vec![finding]);
        }

        match run_command(&self.lsblk_program, &["-s", "-n", "-r", "-o", "TYPE", device], timeout) {
            Ok(output) => {
                let layers: Vec<&str> = output.split_whitespace().collect();
                if layers.contains(&"crypt") {
                    finding.record(
                        Status::Complies,
                        format!("Root device is backed by a dm-crypt layer ({})", layers.join(" <- ")),
                    );
                } else if layers.is_empty() {
                    finding.record(Status::Warning, "lsblk reported no device layers");
                } else {
                    finding.record(
                        Status::Fails,
                        format!("Root device is not encrypted (layers: {})", layers.join(" <- ")),
                    );
                }
            }
            Err(e) => finding.record(e.status(), format!("Could not inspect block device: {}", e)),
        }

        CheckOutcome::Findings(vec![finding])
    }

    fn run_macos(&self, timeout: Duration) -> CheckOutcome {
        let mut finding = Finding::new("/");

        match run_command(&self.fdesetup_program, &["status"], timeout) {
            Ok(output) if output.contains("FileVault is On") => {
                finding.record(Status::Complies, "FileVault disk encryption is enabled")
            }
            Ok(output) if output.contains("FileVault is Off") => finding.record(
                Status::Fails,
                "FileVault disk encryption is disabled; data is not encrypted at rest",
            ),
            Ok(output) => finding.record(Status::Warning, format!("FileVault status unclear: {}", output)),
            Err(e) => finding.record(e.status(), format!("Could not check FileVault status: {}", e)),
        }

        CheckOutcome::Findings(vec![finding])
    }
}

impl Default for DiskEncryptionCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl Check for DiskEncryptionCheck {
    fn key(&self) -> &str {
        DISK_ENCRYPTION
    }

    fn description(&self) -> &str {
        "The root filesystem must be encrypted at rest"
    }

    fn applicability(&self, ctx: &dyn CheckContext) -> Applicability {
        match ctx.os().os_type {
            OsType::Linux | OsType::MacOS => Applicability::Applicable,
            other => Applicability::NotApplicable(format!(
                "Disk encryption inspection is not implemented for {}",
                other
            )),
        }
    }

    fn run(&self, ctx: &dyn CheckContext) -> CheckOutcome {
        let timeout = ctx.config().command_timeout;
        match ctx.os().os_type {
            OsType::Linux => self.run_linux(timeout),
            OsType::MacOS => self.run_macos(timeout),
            other => CheckOutcome::Unsupported(format!(
                "Disk encryption inspection is not implemented for {}",
                other
            )),
        }
    }
}
