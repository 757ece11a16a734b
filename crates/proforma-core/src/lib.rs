pub mod error;
pub mod mix;
pub mod proforma;
pub mod store;
pub mod time_value;
pub mod types;

#[cfg(feature = "waterfall")]
pub mod waterfall;

#[cfg(feature = "breakeven")]
pub mod breakeven;

#[cfg(feature = "stress")]
pub mod stress;

pub use error::ProFormaError;
pub use types::*;

/// Standard result type for all pro forma operations
pub type ProFormaResult<T> = Result<T, ProFormaError>;
