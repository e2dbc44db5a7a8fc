//! Configuration structures for lexaudit

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{LexauditError, Result};

/// Main configuration for lexaudit
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Control evaluation settings
    #[serde(default)]
    pub evaluation: EvaluationConfig,
}

/// General configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Verbose output
    #[serde(default)]
    pub verbose: bool,

    /// Output format (text, json)
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Maximum parallel check workers
    #[serde(default = "default_parallelism")]
    pub parallelism: usize,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            verbose: false,
            output_format: default_output_format(),
            parallelism: default_parallelism(),
        }
    }
}

fn default_output_format() -> String {
    "text".to_string()
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(4)
}

/// Settings that shape how controls are evaluated on this host
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Control ids reported as skipped without running their check
    #[serde(default)]
    pub skip_controls: Vec<String>,

    /// Upper bound for any external diagnostic tool, in seconds
    #[serde(default = "default_command_timeout_secs")]
    pub command_timeout_secs: u64,

    /// Log files inspected by the log immutability check
    #[serde(default = "default_log_targets")]
    pub log_targets: Vec<PathBuf>,

    /// Highest permission bits a protected log may carry, as an octal string
    #[serde(default = "default_log_permission_mask")]
    pub log_permission_mask: String,

    /// SSH daemon configuration file
    #[serde(default = "default_sshd_config_path")]
    pub sshd_config_path: PathBuf,

    /// Run checks concurrently
    #[serde(default = "default_true")]
    pub parallel: bool,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            skip_controls: Vec::new(),
            command_timeout_secs: default_command_timeout_secs(),
            log_targets: default_log_targets(),
            log_permission_mask: default_log_permission_mask(),
            sshd_config_path: default_sshd_config_path(),
            parallel: true,
        }
    }
}

impl EvaluationConfig {
    /// Timeout applied to each external tool invocation
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs.max(1))
    }

    /// Parse `log_permission_mask` as octal permission bits.
    pub fn log_permission_bits(&self) -> Result<u32> {
        parse_octal_mode(&self.log_permission_mask)
    }
}

/// Parse an octal permission string such as `"0640"`, `"640"` or `"0o640"`.
pub fn parse_octal_mode(raw: &str) -> Result<u32> {
    let trimmed = raw.trim();
    let digits = trimmed.strip_prefix("0o").unwrap_or(trimmed);
    let mode = u32::from_str_radix(digits, 8).map_err(|e| {
        LexauditError::Config(format!("invalid octal permission mask '{}': {}", raw, e))
    })?;
    if mode > 0o777 {
        return Err(LexauditError::Config(format!(
            "permission mask '{}' exceeds 0777",
            raw
        )));
    }
    Ok(mode)
}

fn default_command_timeout_secs() -> u64 {
    5
}

fn default_log_targets() -> Vec<PathBuf> {
    [
        "/var/log/auth.log",
        "/var/log/secure",
        "/var/log/syslog",
        "/var/log/messages",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

fn default_log_permission_mask() -> String {
    "0644".to_string()
}

fn default_sshd_config_path() -> PathBuf {
    PathBuf::from("/etc/ssh/sshd_config")
}

fn default_true() -> bool {
    true
}

impl Config {
    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;

        let config: Config = if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::from_str(&content).map_err(|e| LexauditError::Parse {
                context: path.display().to_string(),
                message: e.to_string(),
            })?
        } else {
            // Assume YAML for other extensions
            serde_yaml::from_str(&content).map_err(|e| LexauditError::Parse {
                context: path.display().to_string(),
                message: e.to_string(),
            })?
        };

        config.evaluation.log_permission_bits()?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = if path.extension().map(|e| e == "json").unwrap_or(false) {
            serde_json::to_string_pretty(self)?
        } else {
            serde_yaml::to_string(self)
                .map_err(|e| LexauditError::Serialization(e.to_string()))?
        };

        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_octal_mode() {
        assert_eq!(parse_octal_mode("0644").unwrap(), 0o644);
        assert_eq!(parse_octal_mode("640").unwrap(), 0o640);
        assert_eq!(parse_octal_mode("0o600").unwrap(), 0o600);
        assert!(parse_octal_mode("689").is_err());
        assert!(parse_octal_mode("1777").is_err());
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.evaluation.command_timeout(), Duration::from_secs(5));
        assert_eq!(config.evaluation.log_permission_bits().unwrap(), 0o644);
        assert_eq!(config.evaluation.log_targets.len(), 4);
        assert!(config.evaluation.parallel);
    }

    #[test]
    fn test_yaml_partial_config() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexaudit.yaml");
        std::fs::write(
            &path,
            "evaluation:\n  skip_controls: [TECH_ENC_001]\n  log_permission_mask: \"0640\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.evaluation.skip_controls, vec!["TECH_ENC_001"]);
        assert_eq!(config.evaluation.log_permission_bits().unwrap(), 0o640);
        assert_eq!(config.evaluation.command_timeout_secs, 5);
        assert_eq!(config.general.output_format, "text");
    }

    #[test]
    fn test_invalid_mask_rejected_on_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lexaudit.json");
        std::fs::write(&path, r#"{"evaluation": {"log_permission_mask": "rw-r--r--"}}"#).unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, LexauditError::Config(_)));
    }

    #[test]
    fn test_json_round_trip_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        let mut config = Config::default();
        config.evaluation.command_timeout_secs = 9;
        config.to_file(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.evaluation.command_timeout_secs, 9);
    }
}
