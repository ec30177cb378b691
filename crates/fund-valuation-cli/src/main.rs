mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;
use tracing_subscriber::EnvFilter;

use commands::growth::GrowthArgs;
use commands::scenario::{ScenarioDeleteArgs, ScenarioListArgs, ScenarioSaveArgs};
use commands::summary::SummaryArgs;
use commands::valuation::CorrectArgs;

/// Inflation-indexed fund portfolio valuation
#[derive(Parser)]
#[command(
    name = "fva",
    version,
    about = "Inflation-indexed fund portfolio valuation",
    long_about = "A CLI for valuing private-equity-style fund portfolios with decimal \
                  precision: index-corrected target values per company, growth/uplift \
                  analysis against fair value, fund-level aggregation, and named \
                  what-if scenarios."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Index-correct a single amount (index + excess rate)
    Correct(CorrectArgs),
    /// Per-company growth analysis against fair value
    Growth(GrowthArgs),
    /// Fund-level portfolio summary
    Summary(SummaryArgs),
    /// Save a named scenario snapshot from an investments table
    ScenarioSave(ScenarioSaveArgs),
    /// List stored scenarios
    ScenarioList(ScenarioListArgs),
    /// Delete a stored scenario
    ScenarioDelete(ScenarioDeleteArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Correct(args) => commands::valuation::run_correct(args),
        Commands::Growth(args) => commands::growth::run_growth(args),
        Commands::Summary(args) => commands::summary::run_summary(args),
        Commands::ScenarioSave(args) => commands::scenario::run_save(args),
        Commands::ScenarioList(args) => commands::scenario::run_list(args),
        Commands::ScenarioDelete(args) => commands::scenario::run_delete(args),
        Commands::Version => {
            println!("fva {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
