//! mb-calc: calculation functions for massbal.
//!
//! Contains:
//! - kind (the closed set of calculation kinds + parsing)
//! - functions (pure evaluation of a single row)
//! - error (calculation errors)

pub mod error;
pub mod functions;
pub mod kind;

pub use error::{CalcError, CalcResult};
pub use functions::{evaluate, CalcInput, CalcOutput, CO2, WASTE_HEAT};
pub use kind::{CalcKind, UnknownCalcKind};
