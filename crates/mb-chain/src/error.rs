//! Chain errors.

use mb_core::Direction;
use mb_process::ProcessError;
use thiserror::Error;

/// Result type for chain operations.
pub type ChainResult<T> = Result<T, ChainError>;

#[derive(Error, Debug)]
pub enum ChainError {
    #[error("Chain '{chain}' has no links")]
    Empty { chain: String },

    /// Adjacent links must hand over the same substance.
    #[error("Chain '{chain}': link {index} hands over '{outflow}' but the next link expects '{inflow}'")]
    BrokenLink {
        chain: String,
        index: usize,
        outflow: String,
        inflow: String,
    },

    /// A link references a flow its process does not declare.
    #[error("Chain '{chain}': process '{process}' does not declare {} '{substance}'", .direction.word())]
    UndeclaredFlow {
        chain: String,
        process: String,
        substance: String,
        direction: Direction,
    },

    /// The balance target is not a boundary flow of the chain.
    #[error("Chain '{chain}' has no boundary {} named '{substance}'", .direction.word())]
    SubstanceNotFound {
        chain: String,
        substance: String,
        direction: Direction,
    },

    #[error("Direction '{}' cannot target a chain", .direction.word())]
    UnknownDestination { direction: Direction },

    /// A balanced process result is missing the flow the next link needs.
    #[error("Chain '{chain}': process '{process}' did not produce link flow '{substance}'")]
    MissingLinkFlow {
        chain: String,
        process: String,
        substance: String,
    },

    /// Partial results can only merge with results of the same chain shape.
    #[error("Cannot merge balances of '{left}' and '{right}'")]
    MergeMismatch { left: String, right: String },

    #[error("Process balance failed: {0}")]
    Process(#[from] ProcessError),
}
