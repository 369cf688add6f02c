//! Calculation table rows.

use mb_calc::{CalcKind, UnknownCalcKind};
use mb_core::{Direction, Substance, UnknownDirection};

use crate::error::{ProcessError, ProcessResult};

/// One untyped row as it arrives from a source.
///
/// `known` may be blank or `none` to mark a no-op row; such rows are dropped
/// during parsing instead of being carried through balancing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub known: String,
    pub known_dir: String,
    pub unknown: String,
    pub unknown_dir: String,
    pub calc: String,
    pub variable: Option<String>,
    pub second_known: Option<String>,
    pub second_dir: Option<String>,
}

impl RawRow {
    /// Shorthand for the common single-input row.
    pub fn new(
        known: &str,
        known_dir: &str,
        unknown: &str,
        unknown_dir: &str,
        calc: &str,
        variable: &str,
    ) -> Self {
        Self {
            known: known.to_string(),
            known_dir: known_dir.to_string(),
            unknown: unknown.to_string(),
            unknown_dir: unknown_dir.to_string(),
            calc: calc.to_string(),
            variable: (!variable.is_empty()).then(|| variable.to_string()),
            second_known: None,
            second_dir: None,
        }
    }

    pub fn with_second(mut self, second_known: &str, second_dir: &str) -> Self {
        self.second_known = Some(second_known.to_string());
        self.second_dir = Some(second_dir.to_string());
        self
    }
}

/// One parsed calculation row.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcRow {
    pub known: Substance,
    pub known_dir: Direction,
    pub unknown: Substance,
    pub unknown_dir: Direction,
    pub kind: CalcKind,
    /// Scenario variable name; `None` for kinds that take none.
    pub variable: Option<String>,
    /// Second known operand for two-input kinds.
    pub second: Option<(Substance, Direction)>,
}

/// A parsed, validated calculation table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CalcTable {
    rows: Vec<CalcRow>,
}

impl CalcTable {
    /// Parse raw rows in order, dropping no-ops and validating the rest.
    pub fn from_raw(raw: &[RawRow]) -> ProcessResult<Self> {
        let mut rows = Vec::with_capacity(raw.len());
        for (index, r) in raw.iter().enumerate() {
            if is_noop(&r.known) {
                continue;
            }
            rows.push(parse_row(index, r)?);
        }
        Ok(Self { rows })
    }

    pub fn rows(&self) -> &[CalcRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn is_noop(known: &str) -> bool {
    let known = known.trim();
    known.is_empty() || known.eq_ignore_ascii_case("none")
}

fn parse_row(index: usize, raw: &RawRow) -> ProcessResult<CalcRow> {
    let known = Substance::new(&raw.known);
    let unknown = Substance::new(&raw.unknown);
    if unknown.is_empty() {
        return Err(ProcessError::InvalidRow {
            row: index,
            what: "blank unknown cell",
        });
    }
    let known_dir = parse_direction(index, &raw.known_dir)?;
    let unknown_dir = parse_direction(index, &raw.unknown_dir)?;
    let kind: CalcKind = raw
        .calc
        .parse()
        .map_err(|e: UnknownCalcKind| ProcessError::UnknownCalculationType {
            row: index,
            name: e.name,
        })?;
    let variable = raw
        .variable
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);
    if kind.needs_variable() && variable.is_none() {
        return Err(ProcessError::InvalidRow {
            row: index,
            what: "calculation needs a variable",
        });
    }
    let second = match raw
        .second_known
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
    {
        Some(name) => {
            let dir = parse_direction(index, raw.second_dir.as_deref().unwrap_or_default())?;
            Some((Substance::new(name), dir))
        }
        None => None,
    };
    if kind.is_two_input() && second.is_none() {
        return Err(ProcessError::InvalidRow {
            row: index,
            what: "calculation needs a second known operand",
        });
    }
    Ok(CalcRow {
        known,
        known_dir,
        unknown,
        unknown_dir,
        kind,
        variable,
        second,
    })
}

fn parse_direction(row: usize, cell: &str) -> ProcessResult<Direction> {
    cell.parse()
        .map_err(|e: UnknownDirection| ProcessError::InvalidDirection {
            row,
            token: e.token,
        })
}
