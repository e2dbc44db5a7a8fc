//! Control evaluation command

use super::OutputFormat;
use anyhow::anyhow;
use clap::Args;
use lexaudit_controls::CheckCategory;
use lexaudit_core::{Config, EvaluationResults};
use lexaudit_engine::{format_json, format_text, EvaluationEngine};
use lexaudit_platform::get_system_info;

/// Exit code when a control fails or cannot be evidenced
const VIOLATION_EXIT_CODE: i32 = 2;

#[derive(Args)]
pub struct EvaluateArgs {
    /// Control ids to evaluate (all when omitted)
    #[arg(long = "control", value_delimiter = ',')]
    controls: Vec<String>,

    /// Control categories to evaluate
    #[arg(long = "category", value_delimiter = ',')]
    categories: Vec<String>,

    /// Control ids to skip
    #[arg(long, value_delimiter = ',')]
    skip: Vec<String>,

    /// Run checks one at a time
    #[arg(long)]
    sequential: bool,

    /// Exit with status 2 when any control fails or lacks evidence
    #[arg(long)]
    fail_on_violation: bool,
}

pub fn run(args: EvaluateArgs, config: &Config, format: OutputFormat) -> anyhow::Result<()> {
    let categories = args
        .categories
        .iter()
        .map(|c| c.parse::<CheckCategory>().map_err(|e| anyhow!(e)))
        .collect::<anyhow::Result<Vec<_>>>()?;

    let mut engine = EvaluationEngine::from_config(config)?
        .skip(args.skip)
        .with_categories(categories);
    if args.sequential {
        engine = engine.parallel(false);
    }

    let results = if args.controls.is_empty() {
        engine.run()
    } else {
        let mut results = EvaluationResults::new(get_system_info());
        for id in &args.controls {
            results.add_report(engine.evaluate(id)?);
        }
        results.complete();
        results
    };

    match format {
        OutputFormat::Json => println!("{}", format_json(&results, true)?),
        OutputFormat::Text => println!("{}", format_text(&results, config.general.verbose)),
    }

    if args.fail_on_violation && results.summary.has_violations() {
        std::process::exit(VIOLATION_EXIT_CODE);
    }

    Ok(())
}
