use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::proforma::inputs::Financing;
use crate::time_value::{annuity_payment, remaining_balance};
use crate::types::{Money, Rate};
use crate::ProFormaResult;

/// One year of the annual debt schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DebtYear {
    pub year: u32,
    pub debt_service: Money,
    pub end_balance: Money,
    /// Non-zero only in a refinance year: new principal - old balance - costs
    pub refinance_proceeds: Money,
}

/// The loan currently in force. The amortizing payment is fixed once per
/// loan phase; a refinance swaps in a fresh phase.
struct ActiveLoan {
    principal: Money,
    rate: Rate,
    amortization_years: u32,
    interest_only_years: u32,
    start_year: u32,
    monthly_payment: Option<Money>,
}

impl ActiveLoan {
    fn new(
        principal: Money,
        rate: Rate,
        amortization_years: u32,
        interest_only_years: u32,
        start_year: u32,
    ) -> ProFormaResult<Self> {
        // amortization_years == 0 means interest-only for the loan's life
        let monthly_payment = if amortization_years > 0 {
            Some(annuity_payment(principal, rate, amortization_years)?)
        } else {
            None
        };
        Ok(ActiveLoan {
            principal,
            rate,
            amortization_years,
            interest_only_years,
            start_year,
            monthly_payment,
        })
    }

    /// Loan-year index (1-based) for a calendar year of the projection.
    fn loan_year(&self, year: u32) -> u32 {
        year - self.start_year + 1
    }

    fn is_interest_only(&self, year: u32) -> bool {
        self.monthly_payment.is_none() || self.loan_year(year) <= self.interest_only_years
    }

    fn debt_service(&self, year: u32) -> Money {
        match (self.is_interest_only(year), self.monthly_payment) {
            (false, Some(payment)) => payment * dec!(12),
            _ => self.principal * self.rate,
        }
    }

    fn end_balance(&self, year: u32) -> ProFormaResult<Money> {
        if self.is_interest_only(year) {
            return Ok(self.principal);
        }
        let amortizing_months = (self.loan_year(year) - self.interest_only_years) * 12;
        remaining_balance(
            self.principal,
            self.rate,
            self.amortization_years,
            amortizing_months,
        )
    }
}

/// Build the annual debt schedule over the projection horizon, handling the
/// interest-only → amortizing transition and an optional mid-hold
/// refinance.
pub(crate) fn build_debt_schedule(
    financing: &Financing,
    horizon: u32,
) -> ProFormaResult<Vec<DebtYear>> {
    let mut active = ActiveLoan::new(
        financing.loan_amount,
        financing.interest_rate,
        financing.amortization_years,
        financing.interest_only_years,
        1,
    )?;

    let mut schedule = Vec::with_capacity(horizon as usize);

    for year in 1..=horizon {
        let mut refinance_proceeds = Decimal::ZERO;

        if let Some(ref refi) = financing.refinance {
            if refi.year == year {
                let old_balance = if year == 1 {
                    active.principal
                } else {
                    active.end_balance(year - 1)?
                };
                refinance_proceeds = refi.new_loan_amount - old_balance - refi.costs;
                active = ActiveLoan::new(
                    refi.new_loan_amount,
                    refi.new_interest_rate,
                    refi.new_amortization_years,
                    refi.new_interest_only_years,
                    year,
                )?;
            }
        }

        schedule.push(DebtYear {
            year,
            debt_service: active.debt_service(year),
            end_balance: active.end_balance(year)?,
            refinance_proceeds,
        });
    }

    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proforma::inputs::RefinanceEvent;
    use rust_decimal_macros::dec;

    fn io_loan() -> Financing {
        Financing {
            loan_amount: dec!(1000000),
            interest_rate: dec!(0.05),
            amortization_years: 30,
            interest_only_years: 2,
            refinance: None,
        }
    }

    #[test]
    fn test_interest_only_years() {
        let schedule = build_debt_schedule(&io_loan(), 5).unwrap();

        // Years 1-2: interest only at 5% on $1M
        assert_eq!(schedule[0].debt_service, dec!(50000));
        assert_eq!(schedule[1].debt_service, dec!(50000));
        assert_eq!(schedule[0].end_balance, dec!(1000000));
        assert_eq!(schedule[1].end_balance, dec!(1000000));
    }

    #[test]
    fn test_amortizing_transition() {
        let schedule = build_debt_schedule(&io_loan(), 5).unwrap();

        // Year 3 onward: 12 * annuity payment over 30 years (~$5,368/mo)
        let annual = schedule[2].debt_service;
        assert!(annual > dec!(64000) && annual < dec!(64900), "got {annual}");
        // Same fixed payment every amortizing year
        assert_eq!(schedule[3].debt_service, annual);
        // Principal starts paying down
        assert!(schedule[2].end_balance < dec!(1000000));
        assert!(schedule[3].end_balance < schedule[2].end_balance);
    }

    #[test]
    fn test_no_amortization_is_perpetual_interest_only() {
        let fin = Financing {
            loan_amount: dec!(500000),
            interest_rate: dec!(0.06),
            amortization_years: 0,
            interest_only_years: 0,
            refinance: None,
        };
        let schedule = build_debt_schedule(&fin, 10).unwrap();
        for year in &schedule {
            assert_eq!(year.debt_service, dec!(30000));
            assert_eq!(year.end_balance, dec!(500000));
        }
    }

    #[test]
    fn test_zero_rate_straight_line() {
        let fin = Financing {
            loan_amount: dec!(300000),
            interest_rate: Decimal::ZERO,
            amortization_years: 10,
            interest_only_years: 0,
            refinance: None,
        };
        let schedule = build_debt_schedule(&fin, 3).unwrap();
        assert_eq!(schedule[0].debt_service, dec!(30000));
        assert_eq!(schedule[0].end_balance, dec!(270000));
        assert_eq!(schedule[2].end_balance, dec!(210000));
    }

    #[test]
    fn test_refinance_proceeds_booked_once() {
        let mut fin = io_loan();
        fin.refinance = Some(RefinanceEvent {
            year: 3,
            new_loan_amount: dec!(1200000),
            new_interest_rate: dec!(0.045),
            new_amortization_years: 30,
            new_interest_only_years: 1,
            costs: dec!(20000),
        });
        let schedule = build_debt_schedule(&fin, 6).unwrap();

        // Old loan was still interest-only through year 2, so the balance
        // refinanced is the full $1M: proceeds = 1.2M - 1M - 20k = 180k
        assert_eq!(schedule[2].refinance_proceeds, dec!(180000));
        for (i, year) in schedule.iter().enumerate() {
            if i != 2 {
                assert_eq!(year.refinance_proceeds, Decimal::ZERO);
            }
        }

        // Refinance year is the new loan's first (interest-only) year
        assert_eq!(schedule[2].debt_service, dec!(1200000) * dec!(0.045));
        assert_eq!(schedule[2].end_balance, dec!(1200000));
        // Year 4 amortizes the new loan
        assert!(schedule[3].end_balance < dec!(1200000));
    }

    #[test]
    fn test_refinance_resets_amortization_clock() {
        let mut fin = io_loan();
        fin.interest_only_years = 0;
        fin.refinance = Some(RefinanceEvent {
            year: 4,
            new_loan_amount: dec!(900000),
            new_interest_rate: dec!(0.05),
            new_amortization_years: 25,
            new_interest_only_years: 0,
            costs: Decimal::ZERO,
        });
        let schedule = build_debt_schedule(&fin, 6).unwrap();

        // The new loan's year-4 balance reflects 12 payments on a fresh
        // 25-year schedule, not 4 years of the old one.
        let expected = remaining_balance(dec!(900000), dec!(0.05), 25, 12).unwrap();
        assert_eq!(schedule[3].end_balance, expected);
    }
}
