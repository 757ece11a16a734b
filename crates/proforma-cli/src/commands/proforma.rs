use clap::Args;
use serde_json::Value;

use proforma_core::proforma::{self, ProFormaInput};

use crate::input;

/// Arguments for the full pro forma run
#[derive(Args)]
pub struct ProformaArgs {
    /// Path to JSON or YAML input file
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_proforma(args: ProformaArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pf_input: ProFormaInput = input::read_required(&args.input, "the pro forma")?;
    let result = proforma::compute_pro_forma(&pf_input)?;
    Ok(serde_json::to_value(result)?)
}
