//! CLI command implementations

pub mod controls;
pub mod evaluate;
pub mod info;
pub mod matrix;

use anyhow::{bail, Context};
use lexaudit_core::Config;
use std::path::Path;

/// Output format selected with `--format`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn parse(raw: &str) -> anyhow::Result<Self> {
        match raw.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            other => bail!("Unknown output format '{}' (expected text or json)", other),
        }
    }

    /// The `--format` flag when given, else `general.output_format`
    pub fn resolve(flag: Option<&str>, config: &Config) -> anyhow::Result<Self> {
        Self::parse(flag.unwrap_or(&config.general.output_format))
    }
}

/// Load the configuration file, or defaults when none is given
pub fn load_config(path: Option<&Path>, verbose: bool) -> anyhow::Result<Config> {
    let mut config = match path {
        Some(path) => Config::from_file(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display()))?,
        None => Config::default(),
    };
    config.general.verbose |= verbose;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_overrides_configured_format() {
        let mut config = Config::default();
        config.general.output_format = "json".to_string();

        assert_eq!(OutputFormat::resolve(None, &config).unwrap(), OutputFormat::Json);
        assert_eq!(
            OutputFormat::resolve(Some("text"), &config).unwrap(),
            OutputFormat::Text
        );
        assert_eq!(
            OutputFormat::resolve(None, &Config::default()).unwrap(),
            OutputFormat::Text
        );
    }

    #[test]
    fn test_unknown_format_rejected() {
        let mut config = Config::default();
        config.general.output_format = "yaml".to_string();
        assert!(OutputFormat::resolve(None, &config).is_err());
        assert!(OutputFormat::parse("JSON").is_ok());
    }
}
