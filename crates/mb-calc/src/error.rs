//! Calculation errors.

use mb_core::CoreError;
use mb_props::PropertyError;
use thiserror::Error;

/// Result type for calculation evaluation.
pub type CalcResult<T> = Result<T, CalcError>;

#[derive(Error, Debug)]
pub enum CalcError {
    /// Balances carry magnitudes with direction tags, never signed flows.
    #[error("Negative quantity for '{substance}': {value}")]
    NegativeQuantity { substance: String, value: f64 },

    #[error("Value out of [0, 1] for {what}: {value}")]
    InvalidFraction { what: &'static str, value: f64 },

    #[error("Negative variable for {what}: {value}")]
    NegativeVariable { what: &'static str, value: f64 },

    #[error("Combustion needs exactly one fuel operand, got '{known}' and '{unknown}'")]
    FuelOperands { known: String, unknown: String },

    #[error("Second operand missing for two-input calculation")]
    MissingSecond,

    #[error("Property error: {0}")]
    Property(#[from] PropertyError),

    #[error("Core error: {0}")]
    Core(#[from] CoreError),
}
