//! OS and platform detection utilities

use lexaudit_core::{OsInfo, OsType};
use std::path::PathBuf;

/// Detect the current operating system
pub fn detect_os() -> OsInfo {
    OsInfo {
        os_type: detect_os_type(),
        version: detect_os_version(),
        arch: std::env::consts::ARCH.to_string(),
        distribution: detect_distribution(),
    }
}

/// Detect the OS type
pub fn detect_os_type() -> OsType {
    os_type_from(std::env::consts::OS)
}

fn os_type_from(os: &str) -> OsType {
    match os {
        "linux" => OsType::Linux,
        "macos" => OsType::MacOS,
        "windows" => OsType::Windows,
        _ => OsType::Unknown,
    }
}

/// Detect OS version
fn detect_os_version() -> String {
    sysinfo::System::os_version().unwrap_or_else(|| "unknown".to_string())
}

/// Detect Linux distribution (if applicable)
fn detect_distribution() -> Option<String> {
    #[cfg(target_os = "linux")]
    {
        let content = std::fs::read_to_string("/etc/os-release").ok()?;
        parse_os_release(&content)
    }

    #[cfg(not(target_os = "linux"))]
    {
        None
    }
}

/// Prefer `PRETTY_NAME`, fall back to `NAME`.
#[cfg_attr(not(target_os = "linux"), allow(dead_code))]
fn parse_os_release(content: &str) -> Option<String> {
    let field = |key: &str| {
        content
            .lines()
            .find_map(|line| line.strip_prefix(key))
            .map(|value| value.trim_matches('"').to_string())
    };
    field("PRETTY_NAME=").or_else(|| field("NAME="))
}

/// Check if running with elevated privileges
pub fn is_elevated() -> bool {
    #[cfg(unix)]
    {
        nix::unistd::geteuid().is_root()
    }

    #[cfg(not(unix))]
    {
        false
    }
}

/// Locate an executable on `PATH` without spawning anything
pub fn find_command(cmd: &str) -> Option<PathBuf> {
    let path = std::env::var_os("PATH")?;
    std::env::split_paths(&path)
        .map(|dir| dir.join(cmd))
        .find(|candidate| candidate.is_file())
}

/// Check if a specific command is available on the system
pub fn command_available(cmd: &str) -> bool {
    find_command(cmd).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_os() {
        let os = detect_os();
        assert!(!os.version.is_empty());
        assert!(!os.arch.is_empty());
    }

    #[test]
    fn test_os_type_mapping() {
        assert_eq!(os_type_from("linux"), OsType::Linux);
        assert_eq!(os_type_from("macos"), OsType::MacOS);
        assert_eq!(os_type_from("freebsd"), OsType::Unknown);
        assert!(OsType::MacOS.is_unix());
        assert!(!OsType::Windows.is_unix());
    }

    #[test]
    fn test_parse_os_release() {
        let content = "NAME=\"Debian GNU/Linux\"\nPRETTY_NAME=\"Debian GNU/Linux 12 (bookworm)\"\n";
        assert_eq!(
            parse_os_release(content).as_deref(),
            Some("Debian GNU/Linux 12 (bookworm)")
        );
        assert_eq!(parse_os_release("NAME=Alpine\n").as_deref(), Some("Alpine"));
        assert_eq!(parse_os_release("ID=x\n"), None);
    }

    #[test]
    fn test_missing_command() {
        assert!(!command_available("lexaudit-no-such-tool-5f1c"));
    }
}
