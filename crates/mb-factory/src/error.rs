//! Factory errors.

use mb_chain::ChainError;
use mb_core::Direction;
use thiserror::Error;

/// Result type for factory operations.
pub type FactoryResult<T> = Result<T, FactoryError>;

#[derive(Error, Debug)]
pub enum FactoryError {
    #[error("Factory '{factory}' declares chain '{chain}' twice")]
    DuplicateChain { factory: String, chain: String },

    #[error("Factory '{factory}' has no chain '{chain}' to use as its main chain")]
    MainChainMissing { factory: String, chain: String },

    /// A connection names a chain the factory does not own.
    #[error("Factory '{factory}': connection {index} references unknown chain '{chain}'")]
    UnknownChain {
        factory: String,
        index: usize,
        chain: String,
    },

    /// A connection names a process its origin chain does not contain.
    #[error("Factory '{factory}': chain '{chain}' has no process '{process}'")]
    ChainMismatch {
        factory: String,
        chain: String,
        process: String,
    },

    /// The origin quantity of a connection could not be read from the
    /// balanced results. Fatal: no partial factory output is produced.
    #[error(
        "Factory '{factory}': connection {index} found no {} '{product}' at {origin} of chain '{chain}'",
        .direction.word()
    )]
    ConnectionResolution {
        factory: String,
        index: usize,
        product: String,
        origin: String,
        chain: String,
        direction: Direction,
    },

    #[error("Chain balance failed: {0}")]
    Chain(#[from] ChainError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display() {
        let err = FactoryError::ConnectionResolution {
            factory: "integrated works".into(),
            index: 2,
            product: "pig iron".into(),
            origin: "process 'blast furnace'".into(),
            chain: "iron".into(),
            direction: Direction::Outflow,
        };
        let msg = err.to_string();
        assert!(msg.contains("connection 2"));
        assert!(msg.contains("pig iron"));
        assert!(msg.contains("outflow"));
    }
}
