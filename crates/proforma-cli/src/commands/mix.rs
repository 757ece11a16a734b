use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use proforma_core::mix::{resolve_unit_mix, UnitCategory};

use crate::input;

/// Arguments for unit-mix resolution
#[derive(Args)]
pub struct MixArgs {
    /// Path to JSON or YAML input file ({total_units, categories})
    #[arg(long)]
    pub input: Option<String>,

    /// Total unit count (inline alternative to --input)
    #[arg(long)]
    pub units: Option<u32>,

    /// Comma-separated percentage weights, e.g. "30,50,20"
    #[arg(long)]
    pub weights: Option<String>,
}

#[derive(serde::Deserialize)]
struct MixRequest {
    total_units: u32,
    categories: Vec<UnitCategory>,
}

pub fn run_mix(args: MixArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request = match (args.units, &args.weights) {
        (Some(units), Some(weights)) => {
            let categories = weights
                .split(',')
                .enumerate()
                .map(|(i, w)| {
                    let weight_pct: Decimal = w
                        .trim()
                        .parse()
                        .map_err(|_| format!("Invalid weight '{}'", w.trim()))?;
                    Ok(UnitCategory {
                        name: format!("Type {}", i + 1),
                        weight_pct,
                    })
                })
                .collect::<Result<Vec<_>, String>>()?;
            MixRequest {
                total_units: units,
                categories,
            }
        }
        _ => input::read_required(&args.input, "unit-mix resolution")?,
    };

    let resolved = resolve_unit_mix(request.total_units, &request.categories)?;
    Ok(serde_json::to_value(resolved)?)
}
