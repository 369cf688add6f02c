//! Calculation kinds.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// The closed set of row calculation kinds.
///
/// Adding a kind means adding a variant here and an arm in
/// [`crate::functions::evaluate`]; the compiler finds every other place that
/// must care.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CalcKind {
    /// `unknown = known * variable`.
    Ratio,
    /// `unknown = known * (1 - variable)`.
    Remainder,
    /// `unknown = known * M(unknown) / M(known)`.
    MolMassRatio,
    /// Fuel/energy conversion with CO2 and waste heat emissions.
    Combustion,
    /// `unknown = known - second known`.
    Difference,
    /// `unknown = known`, unchanged.
    ReturnValue,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown calculation type '{name}'")]
pub struct UnknownCalcKind {
    pub name: String,
}

impl CalcKind {
    pub const ALL: [CalcKind; 6] = [
        CalcKind::Ratio,
        CalcKind::Remainder,
        CalcKind::MolMassRatio,
        CalcKind::Combustion,
        CalcKind::Difference,
        CalcKind::ReturnValue,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            CalcKind::Ratio => "ratio",
            CalcKind::Remainder => "remainder",
            CalcKind::MolMassRatio => "molmassratio",
            CalcKind::Combustion => "combustion",
            CalcKind::Difference => "difference",
            CalcKind::ReturnValue => "returnvalue",
        }
    }

    /// Whether rows of this kind must name a scenario variable.
    pub fn needs_variable(&self) -> bool {
        matches!(
            self,
            CalcKind::Ratio | CalcKind::Remainder | CalcKind::Combustion
        )
    }

    /// Whether rows of this kind take a second known operand.
    pub fn is_two_input(&self) -> bool {
        matches!(self, CalcKind::Difference)
    }
}

impl fmt::Display for CalcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for CalcKind {
    type Err = UnknownCalcKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "ratio" => Ok(CalcKind::Ratio),
            "remainder" => Ok(CalcKind::Remainder),
            "molmassratio" | "mol_mass_ratio" | "mol-mass-ratio" => Ok(CalcKind::MolMassRatio),
            "combustion" => Ok(CalcKind::Combustion),
            "difference" | "diff" => Ok(CalcKind::Difference),
            "returnvalue" | "return_value" | "return" => Ok(CalcKind::ReturnValue),
            other => Err(UnknownCalcKind {
                name: other.to_string(),
            }),
        }
    }
}
