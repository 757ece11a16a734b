use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ProFormaError;
use crate::proforma::{compute_pro_forma, ExpenseBasis, ProFormaInput, ProFormaOutput};
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Rate};
use crate::ProFormaResult;

/// Typed input overrides for one stress scenario. Every field is
/// optional; an empty delta set reproduces the base case exactly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScenarioDelta {
    /// Scales all occupancy-adjusted income bases (0.9 = -10% rent)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rent_multiplier: Option<Decimal>,
    /// Added to the vacancy rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vacancy_rate_delta: Option<Rate>,
    /// Scales every operating expense item
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expense_multiplier: Option<Decimal>,
    /// Added to the loan rate (and any refinance rate)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interest_rate_delta: Option<Rate>,
    /// Added to the exit cap rate
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exit_cap_rate_delta: Option<Rate>,
}

/// A named what-if applied on top of the base input.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressScenario {
    pub name: String,
    #[serde(default)]
    pub deltas: ScenarioDelta,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestInput {
    pub pro_forma: ProFormaInput,
    pub scenarios: Vec<StressScenario>,
}

/// Summary metrics collected from one full engine run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressScenarioResult {
    pub name: String,
    pub year_one_noi: Money,
    pub annual_debt_service: Money,
    pub dscr: Decimal,
    pub irr: Option<Rate>,
    pub exit_value: Money,
    pub equity_multiple: Multiple,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressTestOutput {
    pub base: StressScenarioResult,
    pub scenarios: Vec<StressScenarioResult>,
}

/// Re-run the full engine once per scenario. Every run is an independent
/// pure evaluation on a fresh clone; neither the base input nor any
/// scenario's derived input is shared or mutated.
pub fn run_stress_tests(
    input: &StressTestInput,
) -> ProFormaResult<ComputationOutput<StressTestOutput>> {
    let start = Instant::now();
    let warnings: Vec<String> = Vec::new();

    if input.scenarios.is_empty() {
        return Err(ProFormaError::InsufficientData(
            "At least one stress scenario is required".into(),
        ));
    }

    let base_run = compute_pro_forma(&input.pro_forma)?;
    let base = summarize("Base Case", &base_run.result);

    let mut scenarios = Vec::with_capacity(input.scenarios.len());
    for scenario in &input.scenarios {
        let derived = apply_deltas(&input.pro_forma, &scenario.deltas);
        let run = compute_pro_forma(&derived)?;
        scenarios.push(summarize(&scenario.name, &run.result));
    }

    let output = StressTestOutput { base, scenarios };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Stress Test (Scenario Re-Runs)",
        &serde_json::json!({
            "num_scenarios": input.scenarios.len(),
            "property": input.pro_forma.property_name,
        }),
        warnings,
        elapsed,
        output,
    ))
}

fn summarize(name: &str, output: &ProFormaOutput) -> StressScenarioResult {
    StressScenarioResult {
        name: name.to_string(),
        year_one_noi: output.year_one.noi,
        annual_debt_service: output.year_one.annual_debt_service,
        dscr: output.year_one.dscr,
        irr: output.irr,
        exit_value: output.exit.exit_value,
        equity_multiple: output.equity_multiple,
    }
}

/// Clone the base input with the scenario's deltas applied.
fn apply_deltas(base: &ProFormaInput, deltas: &ScenarioDelta) -> ProFormaInput {
    let mut derived = base.clone();

    if let Some(mult) = deltas.rent_multiplier {
        for stream in derived.income_streams.iter_mut() {
            if stream.occupancy_adjusted {
                stream.annual_base *= mult;
            }
        }
    }

    if let Some(delta) = deltas.vacancy_rate_delta {
        derived.losses.vacancy_rate += delta;
    }

    if let Some(mult) = deltas.expense_multiplier {
        for item in derived.expenses.iter_mut() {
            item.basis = match item.basis {
                ExpenseBasis::FixedAnnual(amount) => ExpenseBasis::FixedAnnual(amount * mult),
                ExpenseBasis::PerUnitAnnual(amount) => ExpenseBasis::PerUnitAnnual(amount * mult),
                ExpenseBasis::PercentOfRevenue(rate) => {
                    ExpenseBasis::PercentOfRevenue(rate * mult)
                }
            };
        }
    }

    if let Some(delta) = deltas.interest_rate_delta {
        if let Some(ref mut fin) = derived.financing {
            fin.interest_rate += delta;
            if let Some(ref mut refi) = fin.refinance {
                refi.new_interest_rate += delta;
            }
        }
    }

    if let Some(delta) = deltas.exit_cap_rate_delta {
        derived.exit.exit_cap_rate += delta;
    }

    derived
}
