use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::proforma::{compute_pro_forma, ProFormaInput};
use crate::types::{with_metadata, ComputationOutput, Rate};
use crate::ProFormaResult;

/// Bisection stops once the recomputed IRR is within this of the target.
const TARGET_TOLERANCE: Decimal = dec!(0.0001);
/// Loose acceptance bound when the interval collapses first.
const FALLBACK_TOLERANCE: Decimal = dec!(0.005);
const MAX_BISECTION_ITERATIONS: u32 = 100;

/// The single free input dimension searched over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakEvenDimension {
    /// Economic occupancy (1 - vacancy rate), searched over [0, 1]
    Occupancy,
    /// Multiplier on all occupancy-adjusted income bases, over [0, 3]
    RentLevel,
    /// Exit cap rate, over [0.001, 0.30]
    ExitCapRate,
}

impl BreakEvenDimension {
    fn bounds(&self) -> (Decimal, Decimal) {
        match self {
            BreakEvenDimension::Occupancy => (Decimal::ZERO, Decimal::ONE),
            BreakEvenDimension::RentLevel => (Decimal::ZERO, dec!(3)),
            BreakEvenDimension::ExitCapRate => (dec!(0.001), dec!(0.30)),
        }
    }

    /// Whether a larger value of this dimension means a safer deal.
    fn higher_is_better(&self) -> bool {
        !matches!(self, BreakEvenDimension::ExitCapRate)
    }

    fn label(&self) -> &'static str {
        match self {
            BreakEvenDimension::Occupancy => "occupancy",
            BreakEvenDimension::RentLevel => "rent level",
            BreakEvenDimension::ExitCapRate => "exit cap rate",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenInput {
    pub pro_forma: ProFormaInput,
    pub dimension: BreakEvenDimension,
    pub target_irr: Rate,
}

/// Solved break-even point for one dimension.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BreakEvenMetric {
    pub dimension: BreakEvenDimension,
    pub target_irr: Rate,
    pub current_value: Decimal,
    /// None when no value within the search bounds achieves the target;
    /// callers render "N/A"
    pub break_even_value: Option<Decimal>,
    /// Signed distance from current to break-even, in percent; positive
    /// means cushion
    pub safety_margin_pct: Option<Decimal>,
    /// First year cumulative cash flow turns non-negative
    pub years_to_break_even: Option<u32>,
}

/// Search the dimension for the value at which the recomputed IRR meets
/// the target, by bisection over a monotonic-in-IRR range.
pub fn solve_break_even(
    input: &BreakEvenInput,
) -> ProFormaResult<ComputationOutput<BreakEvenMetric>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    let base = compute_pro_forma(&input.pro_forma)?;
    let years_to_break_even = base
        .result
        .years
        .iter()
        .find(|y| y.cumulative_cash_flow >= Decimal::ZERO)
        .map(|y| y.year);

    let dimension = input.dimension;
    let current_value = current_value_of(&input.pro_forma, dimension);
    let (lo, hi) = dimension.bounds();

    let gap_lo = irr_gap(&input.pro_forma, dimension, lo, input.target_irr);
    let gap_hi = irr_gap(&input.pro_forma, dimension, hi, input.target_irr);

    let break_even_value = if (gap_lo > Decimal::ZERO) == (gap_hi > Decimal::ZERO) {
        warnings.push(format!(
            "Target IRR {} is not reachable by {} within [{lo}, {hi}]",
            input.target_irr,
            dimension.label()
        ));
        None
    } else {
        bisect(&input.pro_forma, dimension, input.target_irr, lo, hi, gap_lo)
    };

    let safety_margin_pct = break_even_value.and_then(|be| {
        if be.is_zero() {
            return None;
        }
        let margin = if dimension.higher_is_better() {
            (current_value - be) / be * dec!(100)
        } else {
            (be - current_value) / be * dec!(100)
        };
        Some(margin)
    });

    let metric = BreakEvenMetric {
        dimension,
        target_irr: input.target_irr,
        current_value,
        break_even_value,
        safety_margin_pct,
        years_to_break_even,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Break-Even Analysis (Bisection over IRR)",
        &serde_json::json!({
            "dimension": dimension.label(),
            "target_irr": input.target_irr.to_string(),
            "search_bounds": [lo.to_string(), hi.to_string()],
        }),
        warnings,
        elapsed,
        metric,
    ))
}

fn bisect(
    base: &ProFormaInput,
    dimension: BreakEvenDimension,
    target: Rate,
    mut lo: Decimal,
    mut hi: Decimal,
    gap_lo: Decimal,
) -> Option<Decimal> {
    // Moving lo only when the mid gap shares its sign keeps this invariant
    let lo_is_negative = gap_lo < Decimal::ZERO;
    let mut mid = (lo + hi) / dec!(2);

    for _ in 0..MAX_BISECTION_ITERATIONS {
        mid = (lo + hi) / dec!(2);
        let gap = irr_gap(base, dimension, mid, target);

        if gap.abs() < TARGET_TOLERANCE {
            return Some(mid);
        }

        if (gap < Decimal::ZERO) == lo_is_negative {
            lo = mid;
        } else {
            hi = mid;
        }
    }

    // Interval collapsed without hitting the tolerance. Accept only if
    // the residual gap is still small; non-convergent IRR regions can
    // leave a discontinuity the bisection cannot cross.
    let residual = irr_gap(base, dimension, mid, target);
    if residual.abs() < FALLBACK_TOLERANCE {
        Some(mid)
    } else {
        None
    }
}

/// Recomputed IRR at `value` minus the target. Non-convergent IRR counts
/// as deeply below target.
fn irr_gap(base: &ProFormaInput, dimension: BreakEvenDimension, value: Decimal, target: Rate) -> Decimal {
    let derived = apply_dimension(base, dimension, value);
    match compute_pro_forma(&derived) {
        Ok(output) => match output.result.irr {
            Some(rate) => rate - target,
            None => dec!(-1000),
        },
        Err(_) => dec!(-1000),
    }
}

fn current_value_of(input: &ProFormaInput, dimension: BreakEvenDimension) -> Decimal {
    match dimension {
        BreakEvenDimension::Occupancy => Decimal::ONE - input.losses.vacancy_rate,
        BreakEvenDimension::RentLevel => Decimal::ONE,
        BreakEvenDimension::ExitCapRate => input.exit.exit_cap_rate,
    }
}

/// Pure what-if: a fresh input with one dimension set. The base is never
/// mutated.
fn apply_dimension(
    base: &ProFormaInput,
    dimension: BreakEvenDimension,
    value: Decimal,
) -> ProFormaInput {
    let mut derived = base.clone();
    match dimension {
        BreakEvenDimension::Occupancy => {
            derived.losses.vacancy_rate = Decimal::ONE - value;
        }
        BreakEvenDimension::RentLevel => {
            for stream in derived.income_streams.iter_mut() {
                if stream.occupancy_adjusted {
                    stream.annual_base *= value;
                }
            }
        }
        BreakEvenDimension::ExitCapRate => {
            derived.exit.exit_cap_rate = value;
        }
    }
    derived
}
