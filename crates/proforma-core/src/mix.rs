use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ProFormaError;
use crate::ProFormaResult;

/// One unit-type category and its share of the building.
/// Weights are percentages as entered (0-100 scale); user input drifts,
/// so they need not sum to exactly 100.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCategory {
    pub name: String,
    pub weight_pct: Decimal,
}

/// A resolved integer unit count for one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedUnitCount {
    pub name: String,
    pub units: u32,
}

/// Resolve percentage weights into integer unit counts summing exactly to
/// `total_units`.
///
/// Policy: weights are normalized; every category but the last takes
/// `round(total * weight)` (midpoint away from zero), clamped to the
/// running remainder; the last category absorbs whatever remains and
/// with it all rounding error. This is a deterministic tie-break, not
/// largest-remainder apportionment. All-zero weights fall back to an
/// equal split.
pub fn resolve_unit_mix(
    total_units: u32,
    categories: &[UnitCategory],
) -> ProFormaResult<Vec<ResolvedUnitCount>> {
    let weights: Vec<Decimal> = categories.iter().map(|c| c.weight_pct).collect();
    let counts = allocate_counts(total_units, &weights)?;

    Ok(categories
        .iter()
        .zip(counts)
        .map(|(c, units)| ResolvedUnitCount {
            name: c.name.clone(),
            units,
        })
        .collect())
}

/// Core allocation: K weights to K integer counts summing to `total`.
pub fn allocate_counts(total: u32, weights: &[Decimal]) -> ProFormaResult<Vec<u32>> {
    if weights.is_empty() {
        return Err(ProFormaError::InvalidInput {
            field: "weights".into(),
            reason: "At least one mix category is required".into(),
        });
    }

    // Negative weights are user-input noise; treat as zero.
    let cleaned: Vec<Decimal> = weights.iter().map(|w| *w.max(&Decimal::ZERO)).collect();
    let weight_sum: Decimal = cleaned.iter().copied().sum();

    let normalized: Vec<Decimal> = if weight_sum.is_zero() {
        // Fall back to the default mix: equal weighting
        let equal = Decimal::ONE / Decimal::from(cleaned.len() as u32);
        vec![equal; cleaned.len()]
    } else {
        cleaned.iter().map(|w| w / weight_sum).collect()
    };

    let total_dec = Decimal::from(total);
    let mut remaining = total;
    let mut counts = Vec::with_capacity(normalized.len());

    for w in &normalized[..normalized.len() - 1] {
        let raw = (total_dec * w)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        let count = raw.to_u32().unwrap_or(0).min(remaining);
        remaining -= count;
        counts.push(count);
    }
    counts.push(remaining);

    Ok(counts)
}
