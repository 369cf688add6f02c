//! mb-process: single-process balancing for massbal.
//!
//! Contains:
//! - table (raw + parsed calculation rows)
//! - variables (scenario variable tables)
//! - process (the unit process and its declared flow sets)
//! - balance (the worklist balancer + conservation closure)
//! - context (balance options, lookup keys, shared context)
//! - source (construction traits for tabular backends)
//! - error (process errors)

pub mod balance;
pub mod context;
pub mod error;
pub mod process;
pub mod source;
pub mod table;
pub mod variables;

pub use balance::{BalancedFlows, UNKNOWN_ENERGY, UNKNOWN_MASS};
pub use context::{BalanceContext, BalanceOptions, LookupKeys};
pub use error::{ProcessError, ProcessResult};
pub use process::UnitProcess;
pub use source::{ProcessSource, TableSource};
pub use table::{CalcRow, CalcTable, RawRow};
pub use variables::{VarValue, VariableTable, DEFAULT_SCENARIO};
