pub mod debt;
pub mod engine;
pub mod exit;
pub mod inputs;
pub mod projection;

pub use engine::{compute_pro_forma, ProFormaOutput, YearOneMetrics};
pub use exit::{CondoConversionResult, ExitMetrics};
pub use inputs::{
    CapitalReserves, Disposition, ExitAssumptions, ExpenseBasis, ExpenseItem, Financing,
    IncomeStream, LossAssumptions, ProFormaInput, RefinanceEvent,
};
pub use projection::YearProjection;
