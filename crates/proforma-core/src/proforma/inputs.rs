use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::mix::UnitCategory;
use crate::types::{Money, Multiple, Rate};

pub const MIN_HORIZON_YEARS: u32 = 1;
pub const MAX_HORIZON_YEARS: u32 = 30;

/// One independently-growing income stream.
///
/// `occupancy_adjusted` streams form the gross base that vacancy,
/// concession and bad-debt haircuts are taken from; the rest (parking,
/// laundry, F&B in the hospitality variant) flow straight into effective
/// gross income.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IncomeStream {
    pub name: String,
    /// Year-1 annual gross potential
    pub annual_base: Money,
    /// Annual compounding growth rate
    pub growth: Rate,
    pub occupancy_adjusted: bool,
}

/// How an operating expense item is measured.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ExpenseBasis {
    /// Fixed annual amount
    FixedAnnual(Money),
    /// Annual amount per unit
    PerUnitAnnual(Money),
    /// Percent of effective gross income (insurance/tax in the
    /// hospitality variant)
    PercentOfRevenue(Rate),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpenseItem {
    pub name: String,
    pub basis: ExpenseBasis,
    /// Annual growth applied to amount bases; percent-of-revenue items
    /// track revenue instead and ignore this
    pub growth: Rate,
}

/// Revenue haircuts, each a fraction of the same occupancy-adjusted
/// gross base (sum-of-losses model, not sequential percentages).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LossAssumptions {
    pub vacancy_rate: Rate,
    pub concession_rate: Rate,
    pub bad_debt_rate: Rate,
}

/// Annual replacement reserve, deducted below NOI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CapitalReserves {
    pub annual_amount: Money,
    pub growth: Rate,
}

/// Mid-hold refinance: replaces the loan starting at `year` and books the
/// one-time net proceeds (new principal - old balance - costs) into that
/// year's cash flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefinanceEvent {
    pub year: u32,
    pub new_loan_amount: Money,
    pub new_interest_rate: Rate,
    pub new_amortization_years: u32,
    pub new_interest_only_years: u32,
    pub costs: Money,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Financing {
    pub loan_amount: Money,
    /// Annual interest rate
    pub interest_rate: Rate,
    /// Amortizing term that begins once the interest-only period ends.
    /// Zero means the loan never amortizes (interest-only throughout).
    pub amortization_years: u32,
    pub interest_only_years: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refinance: Option<RefinanceEvent>,
}

/// How the property is disposed of at exit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Disposition {
    /// Bulk sale at the capitalized exit value
    Sale,
    /// Convert a fraction of units to condos at a premium to the
    /// capitalized per-unit value; the unconverted remainder sells in bulk
    CondoConversion {
        premium: Multiple,
        fraction_converted: Rate,
        conversion_cost_per_unit: Money,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExitAssumptions {
    pub exit_year: u32,
    pub exit_cap_rate: Rate,
    /// Selling costs as a fraction of gross disposition value
    pub selling_cost_rate: Rate,
    pub disposition: Disposition,
}

/// Complete assumption set for one pro forma run. Immutable per
/// computation; what-if runs (break-even, stress) derive fresh clones.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProFormaInput {
    pub property_name: String,
    pub total_units: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_mix: Option<Vec<UnitCategory>>,
    pub horizon_years: u32,
    pub income_streams: Vec<IncomeStream>,
    pub losses: LossAssumptions,
    pub expenses: Vec<ExpenseItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub capital_reserves: Option<CapitalReserves>,
    pub initial_equity: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financing: Option<Financing>,
    pub exit: ExitAssumptions,
}

impl ProFormaInput {
    /// Clamped copy of the input. The UI validates field-by-field, but the
    /// engine still corrects obviously invalid ranges itself: horizon and
    /// exit year to their bounds, loss and cost fractions to [0, 1]. Each
    /// correction is reported as a warning, never an error.
    pub(crate) fn sanitized(&self, warnings: &mut Vec<String>) -> ProFormaInput {
        let mut input = self.clone();

        if input.horizon_years < MIN_HORIZON_YEARS || input.horizon_years > MAX_HORIZON_YEARS {
            let clamped = input
                .horizon_years
                .clamp(MIN_HORIZON_YEARS, MAX_HORIZON_YEARS);
            warnings.push(format!(
                "Horizon of {} years clamped to {clamped}",
                input.horizon_years
            ));
            input.horizon_years = clamped;
        }

        if input.exit.exit_year < 1 || input.exit.exit_year > input.horizon_years {
            let clamped = input.exit.exit_year.clamp(1, input.horizon_years);
            warnings.push(format!(
                "Exit year {} clamped to {clamped}",
                input.exit.exit_year
            ));
            input.exit.exit_year = clamped;
        }

        input.losses.vacancy_rate =
            clamp_fraction("vacancy_rate", input.losses.vacancy_rate, warnings);
        input.losses.concession_rate =
            clamp_fraction("concession_rate", input.losses.concession_rate, warnings);
        input.losses.bad_debt_rate =
            clamp_fraction("bad_debt_rate", input.losses.bad_debt_rate, warnings);
        input.exit.selling_cost_rate =
            clamp_fraction("selling_cost_rate", input.exit.selling_cost_rate, warnings);

        if let Disposition::CondoConversion {
            ref mut fraction_converted,
            ..
        } = input.exit.disposition
        {
            *fraction_converted =
                clamp_fraction("fraction_converted", *fraction_converted, warnings);
        }

        // A refinance scheduled past the horizon never happens
        if let Some(ref mut fin) = input.financing {
            if let Some(ref refi) = fin.refinance {
                if refi.year < 1 || refi.year > input.horizon_years {
                    warnings.push(format!(
                        "Refinance in year {} is outside the {}-year horizon and was ignored",
                        refi.year, input.horizon_years
                    ));
                    fin.refinance = None;
                }
            }
        }

        input
    }
}

fn clamp_fraction(field: &str, value: Rate, warnings: &mut Vec<String>) -> Rate {
    if value < Decimal::ZERO || value > Decimal::ONE {
        let clamped = value.clamp(Decimal::ZERO, Decimal::ONE);
        warnings.push(format!("{field} of {value} clamped to {clamped}"));
        clamped
    } else {
        value
    }
}
