use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::ProFormaError;
use crate::mix::{resolve_unit_mix, ResolvedUnitCount};
use crate::proforma::debt::build_debt_schedule;
use crate::proforma::exit::{compute_exit, ExitMetrics};
use crate::proforma::inputs::ProFormaInput;
use crate::proforma::projection::{project_years, YearProjection};
use crate::time_value;
use crate::types::{with_metadata, ComputationOutput, Money, Multiple, Rate};
use crate::ProFormaResult;

/// First-year operating and leverage snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearOneMetrics {
    pub noi: Money,
    pub effective_gross_income: Money,
    /// OpEx / EGI
    pub operating_expense_ratio: Decimal,
    pub annual_debt_service: Money,
    pub dscr: Decimal,
    /// Year-1 cash flow / initial equity
    pub cash_on_cash: Decimal,
    /// Loan / total capitalization
    pub ltv: Decimal,
}

/// Complete pro forma result: the full year sequence plus the aggregates
/// derived from it. Constructed atomically; callers never observe a
/// partial result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProFormaOutput {
    pub years: Vec<YearProjection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_mix: Option<Vec<ResolvedUnitCount>>,
    pub year_one: YearOneMetrics,
    pub exit: ExitMetrics,
    /// Levered IRR through the exit year. `None` means the solver did not
    /// converge or equity was degenerate, which is distinct from a true
    /// 0% return.
    pub irr: Option<Rate>,
    pub equity_multiple: Multiple,
    /// Year-1 NOI / total capitalization
    pub going_in_cap_rate: Rate,
    pub total_capitalization: Money,
}

/// Run the full pro forma: unit mix, debt schedule, year-by-year
/// projection, exit/disposition, and return aggregates.
///
/// Total over numerically degenerate inputs (zero equity, zero cap rate,
/// zero debt service yield 0/None sentinels with warnings); `Err` is
/// reserved for structurally malformed input.
pub fn compute_pro_forma(
    input: &ProFormaInput,
) -> ProFormaResult<ComputationOutput<ProFormaOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.income_streams.is_empty() {
        return Err(ProFormaError::InsufficientData(
            "At least one income stream is required".into(),
        ));
    }

    let input = input.sanitized(&mut warnings);

    let unit_mix = match input.unit_mix {
        Some(ref categories) => Some(resolve_unit_mix(input.total_units, categories)?),
        None => None,
    };

    let debt = match input.financing {
        Some(ref fin) => build_debt_schedule(fin, input.horizon_years)?,
        None => Vec::new(),
    };

    let years = project_years(&input, &debt);
    let exit = compute_exit(&input, &years, &mut warnings);

    // --- Year-1 metrics ---
    let y1 = &years[0];
    let loan_amount = input
        .financing
        .as_ref()
        .map(|f| f.loan_amount)
        .unwrap_or(Decimal::ZERO);
    let total_capitalization = input.initial_equity + loan_amount;

    let year_one = YearOneMetrics {
        noi: y1.noi,
        effective_gross_income: y1.effective_gross_income,
        operating_expense_ratio: if y1.effective_gross_income.is_zero() {
            Decimal::ZERO
        } else {
            y1.operating_expenses / y1.effective_gross_income
        },
        annual_debt_service: y1.debt_service,
        dscr: time_value::dscr(y1.noi, y1.debt_service),
        cash_on_cash: if input.initial_equity.is_zero() {
            Decimal::ZERO
        } else {
            y1.cash_flow / input.initial_equity
        },
        ltv: if total_capitalization.is_zero() {
            Decimal::ZERO
        } else {
            loan_amount / total_capitalization
        },
    };

    // --- Returns through the exit year ---
    // The IRR vector stops at the exit year even when the horizon runs on.
    let exit_idx = exit.exit_year as usize;
    let hold_cash_flows: Vec<Money> = years[..exit_idx].iter().map(|y| y.cash_flow).collect();
    let total_distributions: Money =
        hold_cash_flows.iter().copied().sum::<Decimal>() + exit.net_sale_proceeds;

    let irr = if input.initial_equity <= Decimal::ZERO {
        warnings.push("Initial equity is not positive; IRR not computed".into());
        None
    } else {
        let mut cfs = Vec::with_capacity(exit_idx + 1);
        cfs.push(-input.initial_equity);
        cfs.extend_from_slice(&hold_cash_flows);
        if let Some(last) = cfs.last_mut() {
            *last += exit.net_sale_proceeds;
        }
        match time_value::irr(&cfs, dec!(0.10)) {
            Ok(rate) => Some(rate),
            Err(e) => {
                warnings.push(format!("IRR calculation warning: {e}"));
                None
            }
        }
    };

    let equity_multiple = time_value::equity_multiple(total_distributions, input.initial_equity);
    let going_in_cap_rate = time_value::cap_rate(y1.noi, total_capitalization);

    // --- Warnings for unusual metrics ---
    if year_one.dscr > Decimal::ZERO && year_one.dscr < dec!(1.2) {
        warnings.push(format!(
            "DSCR of {:.2} is below 1.20x — lender covenant risk",
            year_one.dscr
        ));
    }
    if year_one.ltv > dec!(0.80) {
        warnings.push(format!(
            "LTV of {:.1}% exceeds 80% — high leverage",
            year_one.ltv * dec!(100)
        ));
    }
    if input.exit.exit_cap_rate > Decimal::ZERO {
        if input.exit.exit_cap_rate < dec!(0.03) {
            warnings.push(format!(
                "Exit cap rate {} is below 3% — unusually low, verify market data",
                input.exit.exit_cap_rate
            ));
        } else if input.exit.exit_cap_rate > dec!(0.12) {
            warnings.push(format!(
                "Exit cap rate {} exceeds 12% — unusually high, may indicate elevated risk",
                input.exit.exit_cap_rate
            ));
        }
    }

    let output = ProFormaOutput {
        years,
        unit_mix,
        year_one,
        exit,
        irr,
        equity_multiple,
        going_in_cap_rate,
        total_capitalization,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Real Estate Investment Pro Forma (Direct Capitalization Exit)",
        &input,
        warnings,
        elapsed,
        output,
    ))
}
