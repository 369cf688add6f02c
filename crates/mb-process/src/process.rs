//! A single unit process.

use std::collections::BTreeSet;

use mb_core::{Direction, Substance};

use crate::error::{ProcessError, ProcessResult};
use crate::source::TableSource;
use crate::table::CalcTable;
use crate::variables::VariableTable;

/// One process node: a calculation table plus its scenario variables.
///
/// The declared flow sets are derived from the table at construction. Rows
/// tagged `i` or `c` contribute inflows, rows tagged `o` or `e` outflows;
/// temp and discard cells stay internal.
#[derive(Debug, Clone)]
pub struct UnitProcess {
    name: String,
    table: CalcTable,
    variables: VariableTable,
    inflows: BTreeSet<Substance>,
    outflows: BTreeSet<Substance>,
}

impl UnitProcess {
    pub fn new(name: &str, table: CalcTable, variables: VariableTable) -> Self {
        let mut inflows = BTreeSet::new();
        let mut outflows = BTreeSet::new();
        for row in table.rows() {
            classify(&mut inflows, &mut outflows, &row.known, row.known_dir);
            classify(&mut inflows, &mut outflows, &row.unknown, row.unknown_dir);
            if let Some((substance, dir)) = &row.second {
                classify(&mut inflows, &mut outflows, substance, *dir);
            }
        }
        Self {
            name: name.to_string(),
            table,
            variables,
            inflows,
            outflows,
        }
    }

    pub fn from_source(source: &dyn TableSource, name: &str) -> ProcessResult<Self> {
        let table = CalcTable::from_raw(&source.calc_rows(name)?)?;
        let variables = source.variables(name)?;
        Ok(Self::new(name, table, variables))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table(&self) -> &CalcTable {
        &self.table
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    pub fn inflows(&self) -> &BTreeSet<Substance> {
        &self.inflows
    }

    pub fn outflows(&self) -> &BTreeSet<Substance> {
        &self.outflows
    }

    pub fn has_inflow(&self, substance: &Substance) -> bool {
        self.inflows.contains(substance)
    }

    pub fn has_outflow(&self, substance: &Substance) -> bool {
        self.outflows.contains(substance)
    }

    /// Declared flows on one boundary side.
    pub(crate) fn boundary(&self, direction: Direction) -> ProcessResult<&BTreeSet<Substance>> {
        match direction {
            Direction::Inflow => Ok(&self.inflows),
            Direction::Outflow => Ok(&self.outflows),
            other => Err(ProcessError::UnknownDestination { direction: other }),
        }
    }
}

fn classify(
    inflows: &mut BTreeSet<Substance>,
    outflows: &mut BTreeSet<Substance>,
    substance: &Substance,
    dir: Direction,
) {
    match dir {
        Direction::Inflow | Direction::CoInflow => {
            inflows.insert(substance.clone());
        }
        Direction::Outflow | Direction::Emission => {
            outflows.insert(substance.clone());
        }
        Direction::Temp | Direction::Discard => {}
    }
}
