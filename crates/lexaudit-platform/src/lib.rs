//! Platform abstraction layer for lexaudit
//!
//! Provides OS detection, privilege detection, and the default check context.

mod detection;

pub use detection::*;

use lexaudit_core::{CheckConfig, CheckContext, OsInfo, SystemInfo};

/// Default implementation of CheckContext
pub struct DefaultCheckContext {
    os_info: OsInfo,
    config: CheckConfig,
}

impl DefaultCheckContext {
    /// Create a new check context with auto-detected system information
    pub fn new(config: CheckConfig) -> Self {
        Self {
            os_info: detect_os(),
            config,
        }
    }
}

impl CheckContext for DefaultCheckContext {
    fn os(&self) -> &OsInfo {
        &self.os_info
    }

    fn config(&self) -> &CheckConfig {
        &self.config
    }
}

/// Get system information for evaluation results
pub fn get_system_info() -> SystemInfo {
    let os_info = detect_os();

    SystemInfo {
        os_name: os_info.os_type.to_string(),
        os_version: os_info.version.clone(),
        hostname: hostname(),
        architecture: os_info.arch.clone(),
        is_elevated: is_elevated(),
        kernel_version: kernel_version(),
    }
}

/// Get the hostname
fn hostname() -> String {
    sysinfo::System::host_name().unwrap_or_else(|| "unknown".to_string())
}

/// Get kernel version if available
fn kernel_version() -> Option<String> {
    sysinfo::System::kernel_version()
}
