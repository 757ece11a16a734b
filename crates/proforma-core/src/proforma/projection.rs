use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::proforma::debt::DebtYear;
use crate::proforma::inputs::{ExpenseBasis, ProFormaInput};
use crate::types::Money;

/// One year of the pro forma.
///
/// Invariants maintained by the projector:
/// `noi = effective_gross_income - operating_expenses`;
/// `cash_flow = noi - capital_reserves - debt_service + refinance_proceeds`;
/// `cumulative_cash_flow[y] = cumulative_cash_flow[y-1] + cash_flow[y]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct YearProjection {
    pub year: u32,
    /// Gross potential revenue of occupancy-adjusted streams
    pub gross_revenue: Money,
    pub vacancy_loss: Money,
    pub concession_loss: Money,
    pub bad_debt_loss: Money,
    /// Streams not subject to occupancy haircuts
    pub other_income: Money,
    pub effective_gross_income: Money,
    pub operating_expenses: Money,
    pub noi: Money,
    pub capital_reserves: Money,
    pub debt_service: Money,
    pub refinance_proceeds: Money,
    pub cash_flow: Money,
    pub cumulative_cash_flow: Money,
    pub loan_balance: Money,
    /// Indicative value: this year's NOI capitalized at the exit cap rate
    pub property_value: Money,
    pub equity: Money,
}

/// Drive the year-by-year projection over the (sanitized) horizon.
/// `debt` is the precomputed annual schedule; empty for all-cash deals.
pub(crate) fn project_years(input: &ProFormaInput, debt: &[DebtYear]) -> Vec<YearProjection> {
    let units = Decimal::from(input.total_units);

    // Per-stream and per-item running values, compounded each year
    let mut streams: Vec<(Money, Decimal, bool)> = input
        .income_streams
        .iter()
        .map(|s| (s.annual_base, Decimal::ONE + s.growth, s.occupancy_adjusted))
        .collect();

    let mut amount_expenses: Vec<(Money, Decimal)> = Vec::new();
    let mut pct_expenses: Vec<Decimal> = Vec::new();
    for item in &input.expenses {
        match item.basis {
            ExpenseBasis::FixedAnnual(amount) => {
                amount_expenses.push((amount, Decimal::ONE + item.growth));
            }
            ExpenseBasis::PerUnitAnnual(amount) => {
                amount_expenses.push((amount * units, Decimal::ONE + item.growth));
            }
            ExpenseBasis::PercentOfRevenue(rate) => pct_expenses.push(rate),
        }
    }

    let mut reserves = input
        .capital_reserves
        .as_ref()
        .map(|r| (r.annual_amount, Decimal::ONE + r.growth));

    let mut cumulative = Decimal::ZERO;
    let mut years = Vec::with_capacity(input.horizon_years as usize);

    for year in 1..=input.horizon_years {
        if year > 1 {
            for (current, factor, _) in streams.iter_mut() {
                *current *= *factor;
            }
            for (current, factor) in amount_expenses.iter_mut() {
                *current *= *factor;
            }
            if let Some((current, factor)) = reserves.as_mut() {
                *current *= *factor;
            }
        }

        let gross_revenue: Money = streams
            .iter()
            .filter(|(_, _, occ)| *occ)
            .map(|(v, _, _)| *v)
            .sum();
        let other_income: Money = streams
            .iter()
            .filter(|(_, _, occ)| !*occ)
            .map(|(v, _, _)| *v)
            .sum();

        // All haircuts come off the same gross base, not off each other
        let vacancy_loss = gross_revenue * input.losses.vacancy_rate;
        let concession_loss = gross_revenue * input.losses.concession_rate;
        let bad_debt_loss = gross_revenue * input.losses.bad_debt_rate;

        let effective_gross_income =
            gross_revenue - vacancy_loss - concession_loss - bad_debt_loss + other_income;

        let operating_expenses: Money = amount_expenses.iter().map(|(v, _)| *v).sum::<Decimal>()
            + pct_expenses
                .iter()
                .map(|rate| effective_gross_income * rate)
                .sum::<Decimal>();

        let noi = effective_gross_income - operating_expenses;
        let capital_reserves = reserves.map(|(v, _)| v).unwrap_or(Decimal::ZERO);

        let (debt_service, refinance_proceeds, loan_balance) = match debt.get(year as usize - 1) {
            Some(d) => (d.debt_service, d.refinance_proceeds, d.end_balance),
            None => (Decimal::ZERO, Decimal::ZERO, Decimal::ZERO),
        };

        let cash_flow = noi - capital_reserves - debt_service + refinance_proceeds;
        cumulative += cash_flow;

        let property_value = if input.exit.exit_cap_rate > Decimal::ZERO {
            noi / input.exit.exit_cap_rate
        } else {
            Decimal::ZERO
        };

        years.push(YearProjection {
            year,
            gross_revenue,
            vacancy_loss,
            concession_loss,
            bad_debt_loss,
            other_income,
            effective_gross_income,
            operating_expenses,
            noi,
            capital_reserves,
            debt_service,
            refinance_proceeds,
            cash_flow,
            cumulative_cash_flow: cumulative,
            loan_balance,
            property_value,
            equity: property_value - loan_balance,
        });
    }

    years
}
