//! Construction traits for tabular backends.
//!
//! Project files, spreadsheets and test fixtures all hand processes to the
//! balancer through these two traits.

use crate::error::ProcessResult;
use crate::process::UnitProcess;
use crate::table::RawRow;
use crate::variables::VariableTable;

/// Raw table access for one named process.
pub trait TableSource {
    /// Calculation rows in table order, no-op rows included.
    fn calc_rows(&self, process: &str) -> ProcessResult<Vec<RawRow>>;

    /// Scenario variables for the process.
    fn variables(&self, process: &str) -> ProcessResult<VariableTable>;
}

/// Built processes by name.
pub trait ProcessSource {
    fn unit_process(&self, name: &str) -> ProcessResult<UnitProcess>;
}
