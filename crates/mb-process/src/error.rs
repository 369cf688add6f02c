//! Process balancing errors.

use mb_calc::CalcError;
use mb_core::Direction;
use thiserror::Error;

/// Result type for process operations.
pub type ProcessResult<T> = Result<T, ProcessError>;

#[derive(Error, Debug)]
pub enum ProcessError {
    /// A direction cell failed to parse.
    #[error("Row {row}: unknown direction tag '{token}'")]
    InvalidDirection { row: usize, token: String },

    /// A calculation-type cell failed to parse.
    #[error("Row {row}: unknown calculation type '{name}'")]
    UnknownCalculationType { row: usize, name: String },

    /// A structurally incomplete row.
    #[error("Row {row}: {what}")]
    InvalidRow { row: usize, what: &'static str },

    /// The process does not declare that boundary flow.
    #[error("Process '{process}' has no {} named '{substance}'", .direction.word())]
    SubstanceNotFound {
        process: String,
        substance: String,
        direction: Direction,
    },

    #[error("Scenario '{scenario}' not found in process '{process}'")]
    ScenarioNotFound { process: String, scenario: String },

    #[error("Variable '{variable}' not found in scenario '{scenario}'")]
    VariableNotFound { scenario: String, variable: String },

    #[error("Variable '{variable}' in scenario '{scenario}' is not a {expected}")]
    VariableType {
        scenario: String,
        variable: String,
        expected: &'static str,
    },

    /// Only boundary directions can seed a balance or be read as results.
    #[error("Direction '{}' cannot be used as a balance target", .direction.word())]
    UnknownDestination { direction: Direction },

    /// The worklist went a full lap without resolving a single row.
    #[error(
        "Cannot resolve '{substance}' in process '{process}': circular or missing dependency among {remaining} rows"
    )]
    CannotResolve {
        process: String,
        substance: String,
        remaining: usize,
    },

    /// Strict-mode conservation failure.
    #[error("Process '{process}' {check} imbalance: in {inflow} vs out {outflow}")]
    Imbalance {
        process: String,
        check: &'static str,
        inflow: f64,
        outflow: f64,
    },

    /// No process by that name in a source.
    #[error("Unknown process '{name}'")]
    UnknownProcess { name: String },

    #[error("Calculation error: {0}")]
    Calc(#[from] CalcError),
}
