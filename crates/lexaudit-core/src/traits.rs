//! Core traits that define the check abstraction layer.
//!
//! Every technical probe implements [`Check`]; the engine only ever sees this
//! interface and resolves implementations by their symbolic key.

use crate::report::Finding;
use std::time::Duration;

/// Represents the applicability of a check to the current system
#[derive(Debug, Clone, PartialEq)]
pub enum Applicability {
    /// Check is applicable and should be run
    Applicable,
    /// Check is not applicable (with reason)
    NotApplicable(String),
}

/// Operating system information
#[derive(Debug, Clone)]
pub struct OsInfo {
    /// Operating system type
    pub os_type: OsType,
    /// OS version string
    pub version: String,
    /// Architecture
    pub arch: String,
    /// Distribution (for Linux)
    pub distribution: Option<String>,
}

/// Supported operating system types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsType {
    Linux,
    MacOS,
    Windows,
    Unknown,
}

impl OsType {
    /// Whether the host follows Unix file permission and attribute semantics
    pub fn is_unix(&self) -> bool {
        matches!(self, OsType::Linux | OsType::MacOS)
    }
}

impl std::fmt::Display for OsType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OsType::Linux => write!(f, "Linux"),
            OsType::MacOS => write!(f, "macOS"),
            OsType::Windows => write!(f, "Windows"),
            OsType::Unknown => write!(f, "Unknown"),
        }
    }
}

/// Configuration for a check run
#[derive(Debug, Clone)]
pub struct CheckConfig {
    /// Timeout for each external tool invocation
    pub command_timeout: Duration,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            command_timeout: Duration::from_secs(5),
        }
    }
}

/// Context provided to checks containing host information
pub trait CheckContext: Send + Sync {
    /// Get the detected operating system info
    fn os(&self) -> &OsInfo;

    /// Get the configuration for this run
    fn config(&self) -> &CheckConfig;
}

/// A check context with fixed values, for embedding and tests
#[derive(Debug, Clone)]
pub struct StaticCheckContext {
    pub os: OsInfo,
    pub config: CheckConfig,
}

impl StaticCheckContext {
    pub fn new(os_type: OsType) -> Self {
        Self {
            os: OsInfo {
                os_type,
                version: "unknown".to_string(),
                arch: std::env::consts::ARCH.to_string(),
                distribution: None,
            },
            config: CheckConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CheckConfig) -> Self {
        self.config = config;
        self
    }
}

impl CheckContext for StaticCheckContext {
    fn os(&self) -> &OsInfo {
        &self.os
    }

    fn config(&self) -> &CheckConfig {
        &self.config
    }
}

/// What a check observed on the host
#[derive(Debug, Clone, PartialEq)]
pub enum CheckOutcome {
    /// One finding per inspected resource
    Findings(Vec<Finding>),
    /// None of the check's target resources exist on this host
    NoResource(String),
    /// The check cannot run on this host class
    Unsupported(String),
}

/// A technical probe backing one or more controls.
///
/// Implementations are read-only with respect to the host, bound every
/// external process by `ctx.config().command_timeout`, and report expected
/// absence conditions as data rather than panicking.
pub trait Check: Send + Sync {
    /// Symbolic key referenced by controls
    fn key(&self) -> &str;

    /// Detailed description of what this check inspects
    fn description(&self) -> &str;

    /// Determine if this check applies to the current system
    fn applicability(&self, ctx: &dyn CheckContext) -> Applicability {
        let _ = ctx;
        Applicability::Applicable
    }

    /// Inspect the host
    fn run(&self, ctx: &dyn CheckContext) -> CheckOutcome;
}
