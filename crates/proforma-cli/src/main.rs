mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analysis::{BreakEvenArgs, StressArgs};
use commands::mix::MixArgs;
use commands::proforma::ProformaArgs;
use commands::waterfall::WaterfallArgs;

/// Real-estate investment pro forma analysis
#[derive(Parser)]
#[command(
    name = "rea",
    version,
    about = "Real-estate investment pro forma analysis",
    long_about = "A CLI for real-estate investment analysis with decimal precision. \
                  Runs multi-year pro formas (multifamily, hotel, SFR), break-even \
                  and stress sweeps, unit-mix resolution, and waterfall decompositions."
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
    /// Run the full year-by-year pro forma
    Proforma(ProformaArgs),
    /// Solve the break-even value of one input dimension for a target IRR
    BreakEven(BreakEvenArgs),
    /// Re-run the pro forma under named stress scenarios
    Stress(StressArgs),
    /// Decompose a computed run into an exactly-summing waterfall
    Waterfall(WaterfallArgs),
    /// Resolve percentage unit-mix weights into integer counts
    Mix(MixArgs),
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
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Proforma(args) => commands::proforma::run_proforma(args),
        Commands::BreakEven(args) => commands::analysis::run_break_even(args),
        Commands::Stress(args) => commands::analysis::run_stress(args),
        Commands::Waterfall(args) => commands::waterfall::run_waterfall(args),
        Commands::Mix(args) => commands::mix::run_mix(args),
        Commands::Version => {
            println!("rea {}", env!("CARGO_PKG_VERSION"));
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
