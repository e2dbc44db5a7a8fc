//! Privileged remote login over SSH

use super::common::{file_exists, parse_ssh_config, SSH_CONFIG_DIR};
use super::SSH_ROOT_LOGIN;
use lexaudit_core::{Applicability, Check, CheckContext, CheckOutcome, Finding, Status};
use std::path::{Path, PathBuf};

/// Inspects `PermitRootLogin` in the SSH daemon configuration
pub struct SshRootLoginCheck {
    config_path: PathBuf,
    include_dir: PathBuf,
}

impl SshRootLoginCheck {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            include_dir: PathBuf::from(SSH_CONFIG_DIR),
        }
    }

    /// Directory relative `Include` patterns are resolved against
    pub fn with_include_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.include_dir = dir.as_ref().to_path_buf();
        self
    }

    fn assess(value: Option<&str>) -> (Status, String) {
        match value.map(str::to_lowercase).as_deref() {
            Some("no") => (Status::Complies, "Root login via SSH is disabled".to_string()),
            Some(v @ ("prohibit-password" | "without-password" | "forced-commands-only")) => (
                Status::Warning,
                format!(
                    "PermitRootLogin is '{}': root can still log in with keys; set it to 'no'",
                    v
                ),
            ),
            Some(v) => (
                Status::Fails,
                format!("Root login via SSH is set to '{}'; should be 'no'", v),
            ),
            None => (
                Status::Warning,
                "PermitRootLogin is not set explicitly; the effective default depends on the OpenSSH version".to_string(),
            ),
        }
    }
}

impl Default for SshRootLoginCheck {
    fn default() -> Self {
        Self::new("/etc/ssh/sshd_config")
    }
}

impl Check for SshRootLoginCheck {
    fn key(&self) -> &str {
        SSH_ROOT_LOGIN
    }

    fn description(&self) -> &str {
        "Direct root login over SSH must be disabled"
    }

    fn applicability(&self, ctx: &dyn CheckContext) -> Applicability {
        if ctx.os().os_type.is_unix() {
            Applicability::Applicable
        } else {
            Applicability::NotApplicable("sshd configuration is only inspected on Unix hosts".to_string())
        }
    }

    fn run(&self, _ctx: &dyn CheckContext) -> CheckOutcome {
        if !file_exists(&self.config_path) {
            return CheckOutcome::NoResource(format!(
                "SSH server configuration not found at {}",
                self.config_path.display()
            ));
        }

        let resource = self.config_path.display().to_string();
        let config = match std::fs::read_to_string(&self.config_path)
            .and_then(|content| parse_ssh_config(&content, &self.include_dir))
        {
            Ok(config) => config,
            Err(e) => {
                return CheckOutcome::Findings(vec![Finding::new(resource)
                    .with_observation(Status::Error, format!("Could not read configuration: {}", e))]);
            }
        };

        let (status, detail) = Self::assess(config.get("permitrootlogin").map(String::as_str));
        CheckOutcome::Findings(vec![Finding::new(resource).with_observation(status, detail)])
    }
}
