//! Lexaudit CLI
//!
//! Evaluates host controls and maps their verdicts to legal provisions.

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Lexaudit - technical control evaluation with legal mapping
#[derive(Parser)]
#[command(name = "lexaudit")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (text, json); defaults to the configured format
    #[arg(short, long, global = true)]
    format: Option<String>,

    /// Configuration file (YAML or JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate controls against this host
    Evaluate(commands::evaluate::EvaluateArgs),

    /// List the control catalog with its citations
    Controls,

    /// Show the norm to control coverage matrix
    Matrix(commands::matrix::MatrixArgs),

    /// Show system information
    Info,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config = commands::load_config(cli.config.as_deref(), cli.verbose)?;
    let format = commands::OutputFormat::resolve(cli.format.as_deref(), &config)?;

    match cli.command {
        Commands::Evaluate(args) => commands::evaluate::run(args, &config, format),
        Commands::Controls => commands::controls::run(format),
        Commands::Matrix(args) => commands::matrix::run(args, &config, format),
        Commands::Info => commands::info::run(&config),
    }
}
