//! Host check implementations and their registry

pub mod common;
pub mod disk_encryption;
pub mod log_immutability;
pub mod ssh_root_login;

pub use disk_encryption::DiskEncryptionCheck;
pub use log_immutability::{AttributeProbe, LogImmutabilityCheck};
pub use ssh_root_login::SshRootLoginCheck;

use lexaudit_core::{Check, EvaluationConfig, Result};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Symbolic key of the disk encryption check
pub const DISK_ENCRYPTION: &str = "disk_encryption";
/// Symbolic key of the SSH root login check
pub const SSH_ROOT_LOGIN: &str = "ssh_root_login";
/// Symbolic key of the log immutability check
pub const LOG_IMMUTABILITY: &str = "log_immutability";

/// Category of a control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckCategory {
    /// Authentication and access control
    Authentication,
    /// Encryption and data protection
    Encryption,
    /// Audit and logging
    Audit,
}

impl std::fmt::Display for CheckCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckCategory::Authentication => write!(f, "authentication"),
            CheckCategory::Encryption => write!(f, "encryption"),
            CheckCategory::Audit => write!(f, "audit"),
        }
    }
}

impl std::str::FromStr for CheckCategory {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "authentication" | "auth" | "access" => Ok(CheckCategory::Authentication),
            "encryption" | "crypto" => Ok(CheckCategory::Encryption),
            "audit" | "logging" => Ok(CheckCategory::Audit),
            _ => Err(format!("Unknown category: {}", s)),
        }
    }
}

/// Checks indexed by symbolic key
#[derive(Default, Clone)]
pub struct CheckRegistry {
    checks: Vec<Arc<dyn Check>>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self { checks: Vec::new() }
    }

    /// Register a check. A check with the same key replaces the earlier one.
    pub fn register(&mut self, check: Arc<dyn Check>) {
        if let Some(slot) = self.checks.iter_mut().find(|c| c.key() == check.key()) {
            *slot = check;
        } else {
            self.checks.push(check);
        }
    }

    /// Builder form of [`CheckRegistry::register`]
    pub fn with(mut self, check: Arc<dyn Check>) -> Self {
        self.register(check);
        self
    }

    pub fn get(&self, key: &str) -> Option<Arc<dyn Check>> {
        self.checks.iter().find(|c| c.key() == key).cloned()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().map(|c| c.key())
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

impl std::fmt::Debug for CheckRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.keys()).finish()
    }
}

/// Build the checks backing the built-in catalog
pub fn default_checks(config: &EvaluationConfig) -> Result<CheckRegistry> {
    let mask = config.log_permission_bits()?;

    Ok(CheckRegistry::new()
        .with(Arc::new(DiskEncryptionCheck::new()))
        .with(Arc::new(SshRootLoginCheck::new(&config.sshd_config_path)))
        .with(Arc::new(LogImmutabilityCheck::new(
            config.log_targets.clone(),
            mask,
        ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexaudit_core::{CheckContext, CheckOutcome};

    struct Named(&'static str, &'static str);

    impl Check for Named {
        fn key(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            self.1
        }

        fn run(&self, _ctx: &dyn CheckContext) -> CheckOutcome {
            CheckOutcome::NoResource(self.1.to_string())
        }
    }

    #[test]
    fn test_default_checks_cover_builtin_keys() {
        let registry = default_checks(&EvaluationConfig::default()).unwrap();
        assert_eq!(registry.len(), 3);
        for key in [DISK_ENCRYPTION, SSH_ROOT_LOGIN, LOG_IMMUTABILITY] {
            assert!(registry.get(key).is_some(), "missing {}", key);
        }
    }

    #[test]
    fn test_default_checks_reject_bad_mask() {
        let config = EvaluationConfig {
            log_permission_mask: "0999".to_string(),
            ..EvaluationConfig::default()
        };
        assert!(default_checks(&config).is_err());
    }

    #[test]
    fn test_register_replaces_same_key() {
        let registry = CheckRegistry::new()
            .with(Arc::new(Named("probe", "first")))
            .with(Arc::new(Named("probe", "second")));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("probe").unwrap().description(), "second");
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("crypto".parse::<CheckCategory>(), Ok(CheckCategory::Encryption));
        assert_eq!("AUTH".parse::<CheckCategory>(), Ok(CheckCategory::Authentication));
        assert!("kernel".parse::<CheckCategory>().is_err());
    }
}
