use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::proforma::{ProFormaInput, ProFormaOutput, YearProjection};
use crate::types::Money;

/// One signed contribution in a waterfall, with the running total after
/// applying it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WaterfallStep {
    pub label: String,
    pub delta: Money,
    pub running_total: Money,
}

/// An ordered decomposition of a total into named, exactly-summing steps.
/// Contract: base value plus the sum of deltas equals the total exactly,
/// zero residual.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Waterfall {
    pub title: String,
    pub base_label: String,
    pub base_value: Money,
    pub steps: Vec<WaterfallStep>,
    pub total_label: String,
    pub total: Money,
}

impl Waterfall {
    /// Whether the declared total matches the running sum exactly.
    pub fn is_exact(&self) -> bool {
        let summed: Money = self.base_value + self.steps.iter().map(|s| s.delta).sum::<Decimal>();
        summed == self.total
    }
}

/// Assemble a waterfall from a base value and ordered signed
/// contributions. The total is the running sum itself, so the exactness
/// contract holds by construction.
pub fn build_waterfall(
    title: &str,
    base_label: &str,
    base_value: Money,
    contributions: &[(String, Money)],
    total_label: &str,
) -> Waterfall {
    let mut running = base_value;
    let steps = contributions
        .iter()
        .map(|(label, delta)| {
            running += delta;
            WaterfallStep {
                label: label.clone(),
                delta: *delta,
                running_total: running,
            }
        })
        .collect();

    Waterfall {
        title: title.to_string(),
        base_label: base_label.to_string(),
        base_value,
        steps,
        total_label: total_label.to_string(),
        total: running,
    }
}

/// Decompose total proceeds over the hold: equity in, operating cash flow,
/// debt paydown, appreciation, selling costs out.
pub fn returns_waterfall(input: &ProFormaInput, output: &ProFormaOutput) -> Waterfall {
    let equity = input.initial_equity;
    let loan_amount = output.total_capitalization - equity;
    let exit = &output.exit;

    let hold_cash_flow: Money = output.years[..exit.exit_year as usize]
        .iter()
        .map(|y| y.cash_flow)
        .sum();

    // Gross disposition value = net proceeds + selling costs + payoff
    let gross_disposition = exit.net_sale_proceeds + exit.selling_costs + exit.loan_payoff;
    let appreciation = gross_disposition - output.total_capitalization;
    let debt_paydown = loan_amount - exit.loan_payoff;

    build_waterfall(
        "Returns Waterfall",
        "Initial Equity",
        equity,
        &[
            ("Operating Cash Flow".to_string(), hold_cash_flow),
            ("Debt Paydown".to_string(), debt_paydown),
            ("Appreciation".to_string(), appreciation),
            ("Selling Costs".to_string(), -exit.selling_costs),
        ],
        "Total Proceeds",
    )
}

/// Decompose one year's NOI from gross revenue down.
pub fn noi_waterfall(year: &YearProjection) -> Waterfall {
    build_waterfall(
        "NOI Buildup",
        "Gross Revenue",
        year.gross_revenue,
        &[
            ("Vacancy".to_string(), -year.vacancy_loss),
            ("Concessions".to_string(), -year.concession_loss),
            ("Bad Debt".to_string(), -year.bad_debt_loss),
            ("Other Income".to_string(), year.other_income),
            ("Operating Expenses".to_string(), -year.operating_expenses),
        ],
        "NOI",
    )
}

/// Decompose one year's distributable cash flow from NOI down.
pub fn cash_flow_waterfall(year: &YearProjection) -> Waterfall {
    build_waterfall(
        "Cash Flow Buildup",
        "NOI",
        year.noi,
        &[
            ("Debt Service".to_string(), -year.debt_service),
            ("Capital Reserves".to_string(), -year.capital_reserves),
            ("Refinance Proceeds".to_string(), year.refinance_proceeds),
        ],
        "Cash Flow",
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_build_waterfall_exact_for_signed_inputs() {
        let wf = build_waterfall(
            "Test",
            "Base",
            dec!(100),
            &[
                ("Up".to_string(), dec!(37.55)),
                ("Down".to_string(), dec!(-120.01)),
                ("Zero".to_string(), Decimal::ZERO),
                ("Up again".to_string(), dec!(2.46)),
            ],
            "Total",
        );

        assert!(wf.is_exact());
        assert_eq!(wf.total, dec!(20));
        // Running totals track step by step
        assert_eq!(wf.steps[0].running_total, dec!(137.55));
        assert_eq!(wf.steps[1].running_total, dec!(17.54));
        assert_eq!(wf.steps[3].running_total, dec!(20));
    }

    #[test]
    fn test_empty_contributions() {
        let wf = build_waterfall("Test", "Base", dec!(42), &[], "Total");
        assert!(wf.is_exact());
        assert_eq!(wf.total, dec!(42));
    }

    mod with_engine {
        use super::*;
        use crate::proforma::{
            compute_pro_forma, Disposition, ExitAssumptions, ExpenseBasis, ExpenseItem,
            Financing, IncomeStream, LossAssumptions, ProFormaInput,
        };

        fn sample_input() -> ProFormaInput {
            ProFormaInput {
                property_name: "Waterfall Test".into(),
                total_units: 12,
                unit_mix: None,
                horizon_years: 5,
                income_streams: vec![
                    IncomeStream {
                        name: "Rent".into(),
                        annual_base: dec!(180000),
                        growth: dec!(0.03),
                        occupancy_adjusted: true,
                    },
                    IncomeStream {
                        name: "Other".into(),
                        annual_base: dec!(9000),
                        growth: Decimal::ZERO,
                        occupancy_adjusted: false,
                    },
                ],
                losses: LossAssumptions {
                    vacancy_rate: dec!(0.06),
                    concession_rate: dec!(0.01),
                    bad_debt_rate: dec!(0.005),
                },
                expenses: vec![ExpenseItem {
                    name: "Operating".into(),
                    basis: ExpenseBasis::FixedAnnual(dec!(70000)),
                    growth: dec!(0.02),
                }],
                capital_reserves: None,
                initial_equity: dec!(500000),
                financing: Some(Financing {
                    loan_amount: dec!(1000000),
                    interest_rate: dec!(0.06),
                    amortization_years: 30,
                    interest_only_years: 1,
                    refinance: None,
                }),
                exit: ExitAssumptions {
                    exit_year: 5,
                    exit_cap_rate: dec!(0.06),
                    selling_cost_rate: dec!(0.025),
                    disposition: Disposition::Sale,
                },
            }
        }

        #[test]
        fn test_returns_waterfall_exact_and_matches_distributions() {
            let result = compute_pro_forma(&sample_input()).unwrap();
            let out = &result.result;
            let wf = returns_waterfall(&sample_input(), out);

            assert!(wf.is_exact());

            // Total equals hold cash flows plus net sale proceeds
            let expected: Decimal = out.years[..5].iter().map(|y| y.cash_flow).sum::<Decimal>()
                + out.exit.net_sale_proceeds;
            assert_eq!(wf.total, expected);
        }

        #[test]
        fn test_noi_waterfall_lands_on_noi() {
            let result = compute_pro_forma(&sample_input()).unwrap();
            for year in &result.result.years {
                let wf = noi_waterfall(year);
                assert!(wf.is_exact());
                assert_eq!(wf.total, year.noi);
            }
        }

        #[test]
        fn test_cash_flow_waterfall_lands_on_cash_flow() {
            let result = compute_pro_forma(&sample_input()).unwrap();
            for year in &result.result.years {
                let wf = cash_flow_waterfall(year);
                assert!(wf.is_exact());
                assert_eq!(wf.total, year.cash_flow);
            }
        }
    }
}
