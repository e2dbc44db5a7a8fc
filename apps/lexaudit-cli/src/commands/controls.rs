//! Control catalog listing

use super::OutputFormat;
use lexaudit_controls::ControlRegistry;
use lexaudit_engine::{format_controls_text, format_json};

pub fn run(format: OutputFormat) -> anyhow::Result<()> {
    let registry = ControlRegistry::builtin()?;

    match format {
        OutputFormat::Json => println!("{}", format_json(registry.all(), true)?),
        OutputFormat::Text => print!("{}", format_controls_text(&registry)),
    }

    Ok(())
}
