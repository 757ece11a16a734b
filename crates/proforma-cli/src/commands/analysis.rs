use clap::Args;
use serde_json::Value;

use proforma_core::breakeven::{self, BreakEvenInput};
use proforma_core::stress::{self, StressTestInput};

use crate::input;

/// Arguments for break-even solving
#[derive(Args)]
pub struct BreakEvenArgs {
    /// Path to JSON or YAML input file ({pro_forma, dimension, target_irr})
    #[arg(long)]
    pub input: Option<String>,
}

/// Arguments for stress testing
#[derive(Args)]
pub struct StressArgs {
    /// Path to JSON or YAML input file ({pro_forma, scenarios})
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_break_even(args: BreakEvenArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let be_input: BreakEvenInput = input::read_required(&args.input, "break-even analysis")?;
    let result = breakeven::solve_break_even(&be_input)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_stress(args: StressArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let st_input: StressTestInput = input::read_required(&args.input, "stress testing")?;
    let result = stress::run_stress_tests(&st_input)?;
    Ok(serde_json::to_value(result)?)
}
