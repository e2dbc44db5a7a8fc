//! Legal coverage matrix command

use super::OutputFormat;
use clap::Args;
use lexaudit_controls::LegalMatrixBuilder;
use lexaudit_core::Config;
use lexaudit_engine::{format_json, format_matrix_text, EvaluationEngine};

#[derive(Args)]
pub struct MatrixArgs {
    /// Evaluate the host first and only include evidenced controls
    #[arg(long)]
    evidenced: bool,
}

pub fn run(args: MatrixArgs, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let engine = EvaluationEngine::from_config(config)?;

    let matrix = if args.evidenced {
        let reports = engine.evaluate_all();
        LegalMatrixBuilder::build_evidenced(engine.registry(), &reports)
    } else {
        LegalMatrixBuilder::build(engine.registry())
    };

    match format {
        OutputFormat::Json => println!("{}", format_json(&matrix, true)?),
        OutputFormat::Text => print!("{}", format_matrix_text(&matrix)),
    }

    Ok(())
}
