//! mb-factory: multi-chain factory balancing for massbal.
//!
//! Contains:
//! - factory (factories, cross-chain connections, factory balancing)
//! - sweep (parallel scenario and quantity sweeps)
//! - error (factory errors)

pub mod error;
pub mod factory;
pub mod sweep;

pub use error::{FactoryError, FactoryResult};
pub use factory::{Connection, Factory, FactoryBalance, Origin};
pub use sweep::{SweepFailure, SweepOutcome, sweep_quantities, sweep_scenarios};
