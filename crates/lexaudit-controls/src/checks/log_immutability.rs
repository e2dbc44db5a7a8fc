//! Audit log immutability: restrictive permissions plus the append-only attribute

use super::common::{permission_bits, run_command, ProbeError};
use super::LOG_IMMUTABILITY;
use lexaudit_core::{Applicability, Check, CheckContext, CheckOutcome, Finding, OsType, Status};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// How the append-only attribute is read on this host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeProbe {
    /// Linux `lsattr`; the flag field contains `a` when append-only
    Lsattr { program: String },
    /// BSD `ls -lO`; the flags column contains `sappnd` or `uappnd`
    BsdFlags { program: String },
}

impl AttributeProbe {
    /// Native probe for an OS, if there is one
    pub fn for_os(os_type: OsType) -> Option<Self> {
        match os_type {
            OsType::Linux => Some(AttributeProbe::Lsattr {
                program: "lsattr".to_string(),
            }),
            OsType::MacOS => Some(AttributeProbe::BsdFlags {
                program: "ls".to_string(),
            }),
            OsType::Windows | OsType::Unknown => None,
        }
    }

    /// Whether `path` carries the append-only attribute
    pub fn has_append_only(&self, path: &Path, timeout: Duration) -> Result<bool, ProbeError> {
        let target = path.to_string_lossy();
        match self {
            AttributeProbe::Lsattr { program } => {
                let output = run_command(program, &[target.as_ref()], timeout)?;
                let flags = output.split_whitespace().next().ok_or_else(|| {
                    ProbeError::UnexpectedOutput {
                        tool: program.clone(),
                        output: output.clone(),
                    }
                })?;
                Ok(flags.contains('a'))
            }
            AttributeProbe::BsdFlags { program } => {
                let output = run_command(program, &["-lO", target.as_ref()], timeout)?;
                Ok(output.contains("sappnd") || output.contains("uappnd"))
            }
        }
    }
}

/// Inspects critical system logs for tamper resistance
pub struct LogImmutabilityCheck {
    targets: Vec<PathBuf>,
    permission_mask: u32,
    attribute_probe: Option<AttributeProbe>,
}

impl LogImmutabilityCheck {
    /// `permission_mask` is the widest permission set a log may carry;
    /// any bit outside it fails the resource.
    pub fn new(targets: Vec<PathBuf>, permission_mask: u32) -> Self {
        Self {
            targets,
            permission_mask: permission_mask & 0o777,
            attribute_probe: None,
        }
    }

    /// Use a specific attribute probe instead of the host's native one
    pub fn with_attribute_probe(mut self, probe: AttributeProbe) -> Self {
        self.attribute_probe = Some(probe);
        self
    }

    fn inspect(&self, path: &Path, probe: Option<&AttributeProbe>, timeout: Duration) -> Finding {
        let mut finding = Finding::new(path.display().to_string());

        match permission_bits(path) {
            Ok(mode) => {
                let excess = mode & !self.permission_mask;
                if excess != 0 {
                    finding.record(
                        Status::Fails,
                        format!(
                            "Insecure permissions {:04o} (at most {:04o} allowed; 0600 or 0640 recommended)",
                            mode, self.permission_mask
                        ),
                    );
                } else {
                    finding.record(Status::Complies, format!("Permissions {:04o} are restrictive", mode));
                }
            }
            Err(e) => finding.record(Status::Error, format!("Could not read permissions: {}", e)),
        }

        match probe {
            None => finding.record(
                Status::Warning,
                "No append-only attribute inspection is available on this platform",
            ),
            Some(probe) => match probe.has_append_only(path, timeout) {
                Ok(true) => finding.record(Status::Complies, "Append-only attribute (+a) is active"),
                Ok(false) => finding.record(
                    Status::Warning,
                    "Append-only attribute (+a) is missing; root can truncate or delete the log",
                ),
                Err(e) => {
                    debug!("Attribute probe failed for {}: {}", path.display(), e);
                    finding.record(
                        e.status(),
                        format!("Could not verify append-only attribute: {}", e),
                    )
                }
            },
        }

        finding
    }
}

impl Check for LogImmutabilityCheck {
    fn key(&self) -> &str {
        LOG_IMMUTABILITY
    }

    fn description(&self) -> &str {
        "Critical logs must be append-only and not writable beyond their owner"
    }

    fn applicability(&self, ctx: &dyn CheckContext) -> Applicability {
        if ctx.os().os_type.is_unix() {
            Applicability::Applicable
        } else {
            Applicability::NotApplicable(
                "This control can only be executed on Linux/Unix systems".to_string(),
            )
        }
    }

    fn run(&self, ctx: &dyn CheckContext) -> CheckOutcome {
        let timeout = ctx.config().command_timeout;
        let probe = self
            .attribute_probe
            .clone()
            .or_else(|| AttributeProbe::for_os(ctx.os().os_type));

        let findings: Vec<Finding> = self
            .targets
            .iter()
            .filter(|path| path.exists())
            .map(|path| self.inspect(path, probe.as_ref(), timeout))
            .collect();

        if findings.is_empty() {
            return CheckOutcome::NoResource(
                "No standard log files were found on the system".to_string(),
            );
        }

        CheckOutcome::Findings(findings)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::checks::common::testing::fake_tool;
    use lexaudit_core::{CheckConfig, RiskLevel, StaticCheckContext};
    use std::os::unix::fs::PermissionsExt;

    const LSATTR_APPEND: &str = "echo \"-----a--------e----- $1\"";
    const LSATTR_PLAIN: &str = "echo \"--------------e----- $1\"";

    fn ctx() -> StaticCheckContext {
        StaticCheckContext::new(OsType::Linux)
    }

    fn log_file(dir: &Path, name: &str, mode: u32) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, "Jan 01 00:00:00 host sshd[1]: Accepted publickey\n").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(mode)).unwrap();
        path
    }

    fn check_with_tool(targets: Vec<PathBuf>, tool: &Path) -> LogImmutabilityCheck {
        LogImmutabilityCheck::new(targets, 0o644).with_attribute_probe(AttributeProbe::Lsattr {
            program: tool.display().to_string(),
        })
    }

    fn single_finding(outcome: CheckOutcome) -> Finding {
        match outcome {
            CheckOutcome::Findings(mut findings) => {
                assert_eq!(findings.len(), 1);
                findings.remove(0)
            }
            other => panic!("expected findings, got {:?}", other),
        }
    }

    #[test]
    fn test_strict_permissions_and_append_only_complies() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_file(dir.path(), "auth.log", 0o640);
        let tool = fake_tool(dir.path(), "lsattr", LSATTR_APPEND);

        let finding = single_finding(check_with_tool(vec![log], &tool).run(&ctx()));
        assert_eq!(finding.status, Status::Complies);
        assert_eq!(finding.risk_level, RiskLevel::Low);
        assert!(finding.details_text().contains("(+a) is active"));
    }

    #[test]
    fn test_loose_permissions_fail() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_file(dir.path(), "syslog", 0o666);
        let tool = fake_tool(dir.path(), "lsattr", LSATTR_APPEND);

        let finding = single_finding(check_with_tool(vec![log], &tool).run(&ctx()));
        assert_eq!(finding.status, Status::Fails);
        assert_eq!(finding.risk_level, RiskLevel::High);
        assert!(finding.details_text().contains("0666"));
    }

    #[test]
    fn test_world_writable_below_threshold_still_fails() {
        // 0622 is numerically below 0644 but grants write to others.
        let dir = tempfile::tempdir().unwrap();
        let log = log_file(dir.path(), "messages", 0o622);
        let tool = fake_tool(dir.path(), "lsattr", LSATTR_APPEND);

        let finding = single_finding(check_with_tool(vec![log], &tool).run(&ctx()));
        assert_eq!(finding.status, Status::Fails);
    }

    #[test]
    fn test_missing_attribute_warns() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_file(dir.path(), "secure", 0o600);
        let tool = fake_tool(dir.path(), "lsattr", LSATTR_PLAIN);

        let finding = single_finding(check_with_tool(vec![log], &tool).run(&ctx()));
        assert_eq!(finding.status, Status::Warning);
        assert_eq!(finding.risk_level, RiskLevel::Medium);
    }

    #[test]
    fn test_failure_not_downgraded_by_missing_attribute() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_file(dir.path(), "syslog", 0o666);
        let tool = fake_tool(dir.path(), "lsattr", LSATTR_PLAIN);

        let finding = single_finding(check_with_tool(vec![log], &tool).run(&ctx()));
        assert_eq!(finding.status, Status::Fails);
        assert_eq!(finding.details.len(), 2);
    }

    #[test]
    fn test_missing_tool_warns() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_file(dir.path(), "auth.log", 0o640);
        let missing = dir.path().join("not-installed");

        let finding = single_finding(check_with_tool(vec![log], &missing).run(&ctx()));
        assert_eq!(finding.status, Status::Warning);
        assert!(finding.details_text().contains("not installed"));
    }

    #[test]
    fn test_tool_timeout_errors_only_that_resource() {
        let dir = tempfile::tempdir().unwrap();
        let log = log_file(dir.path(), "auth.log", 0o640);
        let tool = fake_tool(dir.path(), "lsattr", "exec sleep 5");
        let ctx = ctx().with_config(CheckConfig {
            command_timeout: Duration::from_millis(200),
        });

        let finding = single_finding(check_with_tool(vec![log], &tool).run(&ctx));
        assert_eq!(finding.status, Status::Error);
        assert!(finding.details_text().contains("timed out"));
    }

    #[test]
    fn test_missing_targets_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let present = log_file(dir.path(), "syslog", 0o640);
        let absent = dir.path().join("auth.log");
        let tool = fake_tool(dir.path(), "lsattr", LSATTR_APPEND);

        let outcome = check_with_tool(vec![absent, present.clone()], &tool).run(&ctx());
        let finding = single_finding(outcome);
        assert_eq!(finding.resource, present.display().to_string());
    }

    #[test]
    fn test_no_targets_is_no_resource() {
        let dir = tempfile::tempdir().unwrap();
        let check = LogImmutabilityCheck::new(vec![dir.path().join("nope.log")], 0o644);

        match check.run(&ctx()) {
            CheckOutcome::NoResource(reason) => assert!(reason.contains("No standard log files")),
            other => panic!("expected no resource, got {:?}", other),
        }
    }

    #[test]
    fn test_not_applicable_off_unix() {
        let check = LogImmutabilityCheck::new(Vec::new(), 0o644);
        let windows = StaticCheckContext::new(OsType::Windows);
        assert!(matches!(
            check.applicability(&windows),
            Applicability::NotApplicable(_)
        ));
        assert_eq!(check.applicability(&ctx()), Applicability::Applicable);
    }
}
