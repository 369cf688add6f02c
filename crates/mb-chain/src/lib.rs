//! mb-chain: linear production chains for massbal.
//!
//! Contains:
//! - chain (ordered process links + chain balancing)
//! - error (chain errors)

pub mod chain;
pub mod error;

pub use chain::{ChainBalance, ChainLink, ProductChain};
pub use error::{ChainError, ChainResult};
