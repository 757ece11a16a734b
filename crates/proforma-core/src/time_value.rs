use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;
use rust_decimal_macros::dec;

use crate::error::ProFormaError;
use crate::types::{Money, Multiple, Rate};
use crate::ProFormaResult;

/// Newton-Raphson stops once |NPV| falls below this.
const IRR_NPV_TOLERANCE: Decimal = dec!(0.0001);
const MAX_IRR_ITERATIONS: u32 = 100;

const MONTHS_PER_YEAR: Decimal = dec!(12);

/// Net Present Value of a series of cash flows (index 0 = today).
pub fn npv(rate: Rate, cash_flows: &[Money]) -> ProFormaResult<Money> {
    if rate <= dec!(-1) {
        return Err(ProFormaError::InvalidInput {
            field: "rate".into(),
            reason: "Discount rate must be greater than -100%".into(),
        });
    }

    let mut result = Decimal::ZERO;
    let one_plus_r = Decimal::ONE + rate;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount *= one_plus_r;
        }
        if discount.is_zero() {
            return Err(ProFormaError::DivisionByZero {
                context: format!("NPV discount factor at period {t}"),
            });
        }
        result += cf / discount;
    }

    Ok(result)
}

/// Internal Rate of Return using Newton-Raphson.
///
/// Converges within the iteration budget for the standard
/// investment-then-returns pattern (single sign change). A vanishing
/// derivative or exhausted budget is reported as `ConvergenceFailure`,
/// never as a silent zero.
pub fn irr(cash_flows: &[Money], guess: Rate) -> ProFormaResult<Rate> {
    if cash_flows.len() < 2 {
        return Err(ProFormaError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }

    let mut rate = guess;

    for i in 0..MAX_IRR_ITERATIONS {
        let mut npv_val = Decimal::ZERO;
        let mut dnpv = Decimal::ZERO;
        let one_plus_r = Decimal::ONE + rate;

        for (t, cf) in cash_flows.iter().enumerate() {
            let t_dec = Decimal::from(t as i64);
            let discount = one_plus_r.powd(t_dec);
            if discount.is_zero() {
                continue;
            }
            npv_val += cf / discount;
            if t > 0 {
                dnpv -= t_dec * cf / (one_plus_r.powd(t_dec + Decimal::ONE));
            }
        }

        if npv_val.abs() < IRR_NPV_TOLERANCE {
            return Ok(rate);
        }

        if dnpv.is_zero() {
            return Err(ProFormaError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: i,
                last_delta: npv_val,
            });
        }

        rate -= npv_val / dnpv;

        // Guard against divergence
        if rate < dec!(-0.99) {
            rate = dec!(-0.99);
        } else if rate > dec!(10.0) {
            rate = dec!(10.0);
        }
    }

    Err(ProFormaError::ConvergenceFailure {
        function: "IRR".into(),
        iterations: MAX_IRR_ITERATIONS,
        last_delta: npv(rate, cash_flows).unwrap_or(Decimal::MAX),
    })
}

/// Monthly payment on a fixed-rate fully-amortizing loan:
/// P * r(1+r)^n / ((1+r)^n - 1) with r the monthly rate.
pub fn annuity_payment(principal: Money, annual_rate: Rate, years: u32) -> ProFormaResult<Money> {
    if years == 0 {
        return Err(ProFormaError::InvalidInput {
            field: "years".into(),
            reason: "Amortization term must be at least 1 year".into(),
        });
    }

    let total_months = years * 12;
    let monthly_rate = annual_rate / MONTHS_PER_YEAR;

    if monthly_rate.is_zero() {
        // Interest-free: straight-line amortization
        return Ok(principal / Decimal::from(total_months));
    }

    let compound = compound_factor(monthly_rate, total_months);
    let denominator = compound - Decimal::ONE;

    if denominator.is_zero() {
        return Err(ProFormaError::DivisionByZero {
            context: "annuity payment denominator".into(),
        });
    }

    Ok(principal * monthly_rate * compound / denominator)
}

/// Outstanding balance after `payments_made` monthly payments on a loan
/// amortizing over `total_years`, via the closed form
/// B = P(1+r)^p - M((1+r)^p - 1)/r. Floored at zero.
pub fn remaining_balance(
    principal: Money,
    annual_rate: Rate,
    total_years: u32,
    payments_made: u32,
) -> ProFormaResult<Money> {
    let total_months = total_years * 12;
    if payments_made >= total_months {
        return Ok(Decimal::ZERO);
    }

    let monthly_rate = annual_rate / MONTHS_PER_YEAR;

    if monthly_rate.is_zero() {
        // Straight-line paydown
        let paid = principal * Decimal::from(payments_made) / Decimal::from(total_months);
        return Ok((principal - paid).max(Decimal::ZERO));
    }

    let payment = annuity_payment(principal, annual_rate, total_years)?;
    let grown = compound_factor(monthly_rate, payments_made);
    let balance = principal * grown - payment * (grown - Decimal::ONE) / monthly_rate;

    Ok(balance.max(Decimal::ZERO))
}

/// Equity multiple: total distributions over equity invested.
/// Zero equity yields 0 (undefined by convention).
pub fn equity_multiple(total_distributions: Money, equity: Money) -> Multiple {
    if equity.is_zero() {
        Decimal::ZERO
    } else {
        total_distributions / equity
    }
}

/// Capitalization rate: NOI over value. Zero value yields 0.
pub fn cap_rate(noi: Money, value: Money) -> Rate {
    if value.is_zero() {
        Decimal::ZERO
    } else {
        noi / value
    }
}

/// Debt service coverage ratio: NOI over annual debt service.
/// Zero debt service yields 0 (undefined by convention).
pub fn dscr(noi: Money, annual_debt_service: Money) -> Decimal {
    if annual_debt_service.is_zero() {
        Decimal::ZERO
    } else {
        noi / annual_debt_service
    }
}

/// (1 + r)^n via iterative multiplication
fn compound_factor(rate: Rate, periods: u32) -> Decimal {
    let mut compound = Decimal::ONE;
    let one_plus_r = Decimal::ONE + rate;
    for _ in 0..periods {
        compound *= one_plus_r;
    }
    compound
}
