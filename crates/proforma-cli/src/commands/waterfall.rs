use clap::{Args, ValueEnum};
use serde_json::Value;

use proforma_core::proforma::{self, ProFormaInput};
use proforma_core::waterfall;

use crate::input;

#[derive(Debug, Clone, ValueEnum)]
pub enum WaterfallKind {
    /// Equity → cash flow → debt paydown → appreciation → proceeds
    Returns,
    /// Gross revenue down to NOI for one year
    Noi,
    /// NOI down to distributable cash for one year
    CashFlow,
}

/// Arguments for waterfall decomposition
#[derive(Args)]
pub struct WaterfallArgs {
    /// Path to JSON or YAML pro forma input file
    #[arg(long)]
    pub input: Option<String>,

    /// Which decomposition to build
    #[arg(long, default_value = "returns")]
    pub kind: WaterfallKind,

    /// Projection year for per-year waterfalls (default: year 1)
    #[arg(long, default_value_t = 1)]
    pub year: u32,
}

pub fn run_waterfall(args: WaterfallArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let pf_input: ProFormaInput = input::read_required(&args.input, "the waterfall")?;
    let run = proforma::compute_pro_forma(&pf_input)?;
    let output = &run.result;

    let wf = match args.kind {
        WaterfallKind::Returns => waterfall::returns_waterfall(&pf_input, output),
        WaterfallKind::Noi | WaterfallKind::CashFlow => {
            let year = output
                .years
                .iter()
                .find(|y| y.year == args.year)
                .ok_or_else(|| {
                    format!(
                        "Year {} is outside the {}-year projection",
                        args.year,
                        output.years.len()
                    )
                })?;
            match args.kind {
                WaterfallKind::Noi => waterfall::noi_waterfall(year),
                _ => waterfall::cash_flow_waterfall(year),
            }
        }
    };

    Ok(serde_json::to_value(wf)?)
}
