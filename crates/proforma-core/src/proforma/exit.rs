use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::proforma::inputs::{Disposition, ProFormaInput};
use crate::proforma::projection::YearProjection;
use crate::types::Money;

/// Condo-conversion alternative at exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondoConversionResult {
    /// Capitalized per-unit value scaled by the conversion premium
    pub per_unit_value: Money,
    pub units_converted: Decimal,
    pub gross_proceeds: Money,
    pub conversion_costs: Money,
    /// Gross proceeds net of conversion costs (before selling costs)
    pub net_value: Money,
}

/// Terminal disposition of the property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitMetrics {
    pub exit_year: u32,
    pub exit_noi: Money,
    /// Direct capitalization of exit-year NOI
    pub exit_value: Money,
    pub selling_costs: Money,
    pub loan_payoff: Money,
    /// Proceeds of the chosen disposition net of selling costs and payoff
    pub net_sale_proceeds: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condo_conversion: Option<CondoConversionResult>,
}

/// Compute disposition economics at the (already clamped) exit year.
pub(crate) fn compute_exit(
    input: &ProFormaInput,
    years: &[YearProjection],
    warnings: &mut Vec<String>,
) -> ExitMetrics {
    let exit_year = input.exit.exit_year;
    let exit_projection = &years[exit_year as usize - 1];
    let exit_noi = exit_projection.noi;
    let loan_payoff = exit_projection.loan_balance;
    let cap = input.exit.exit_cap_rate;

    let exit_value = if cap > Decimal::ZERO {
        exit_noi / cap
    } else {
        warnings.push(format!(
            "Exit cap rate {cap} is not positive; exit value reported as 0"
        ));
        Decimal::ZERO
    };

    let (gross_disposition, condo_conversion) = match input.exit.disposition {
        Disposition::Sale => (exit_value, None),
        Disposition::CondoConversion {
            premium,
            fraction_converted,
            conversion_cost_per_unit,
        } => {
            let units = Decimal::from(input.total_units);
            let per_unit_value = if cap > Decimal::ZERO && !units.is_zero() {
                (exit_noi / units) / cap * premium
            } else {
                Decimal::ZERO
            };
            let units_converted = units * fraction_converted;
            let gross_proceeds = per_unit_value * units_converted;
            let conversion_costs = conversion_cost_per_unit * units_converted;

            // Unconverted units sell in bulk at the capitalized value
            let remainder = exit_value * (Decimal::ONE - fraction_converted);

            let condo = CondoConversionResult {
                per_unit_value,
                units_converted,
                gross_proceeds,
                conversion_costs,
                net_value: gross_proceeds - conversion_costs,
            };
            (condo.net_value + remainder, Some(condo))
        }
    };

    let selling_costs = gross_disposition * input.exit.selling_cost_rate;
    let net_sale_proceeds = gross_disposition - selling_costs - loan_payoff;

    if net_sale_proceeds < Decimal::ZERO {
        warnings.push(
            "Net sale proceeds are negative — disposition value does not cover the loan payoff"
                .into(),
        );
    }

    ExitMetrics {
        exit_year,
        exit_noi,
        exit_value,
        selling_costs,
        loan_payoff,
        net_sale_proceeds,
        condo_conversion,
    }
}
