//! Scenario variable tables.

use std::collections::BTreeMap;

use mb_core::Real;

use crate::error::{ProcessError, ProcessResult};

/// Scenario name every process is expected to carry.
pub const DEFAULT_SCENARIO: &str = "default";

/// A scenario variable value.
///
/// Most variables are numbers. Variables backing a lookup key hold a
/// substance name instead, letting one table serve several materials.
#[derive(Debug, Clone, PartialEq)]
pub enum VarValue {
    Number(Real),
    Substance(String),
}

/// Named variable sets, one per scenario. Scenarios are independent; a
/// variable missing from the balanced scenario is an error even when another
/// scenario defines it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariableTable {
    scenarios: BTreeMap<String, BTreeMap<String, VarValue>>,
}

impl VariableTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, scenario: &str, variable: &str, value: VarValue) {
        self.scenarios
            .entry(scenario.to_string())
            .or_default()
            .insert(variable.to_string(), value);
    }

    pub fn with(mut self, scenario: &str, variable: &str, value: VarValue) -> Self {
        self.insert(scenario, variable, value);
        self
    }

    pub fn with_number(self, scenario: &str, variable: &str, value: Real) -> Self {
        self.with(scenario, variable, VarValue::Number(value))
    }

    pub fn with_substance(self, scenario: &str, variable: &str, name: &str) -> Self {
        self.with(scenario, variable, VarValue::Substance(name.to_string()))
    }

    pub fn contains_scenario(&self, scenario: &str) -> bool {
        self.scenarios.contains_key(scenario)
    }

    /// True when no scenario defines any variable.
    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }

    pub fn scenario_names(&self) -> impl Iterator<Item = &str> {
        self.scenarios.keys().map(String::as_str)
    }

    pub fn value(&self, scenario: &str, variable: &str) -> ProcessResult<&VarValue> {
        self.scenarios
            .get(scenario)
            .and_then(|vars| vars.get(variable))
            .ok_or_else(|| ProcessError::VariableNotFound {
                scenario: scenario.to_string(),
                variable: variable.to_string(),
            })
    }

    pub fn number(&self, scenario: &str, variable: &str) -> ProcessResult<Real> {
        match self.value(scenario, variable)? {
            VarValue::Number(v) => Ok(*v),
            VarValue::Substance(_) => Err(ProcessError::VariableType {
                scenario: scenario.to_string(),
                variable: variable.to_string(),
                expected: "number",
            }),
        }
    }

    pub fn substance_name(&self, scenario: &str, variable: &str) -> ProcessResult<&str> {
        match self.value(scenario, variable)? {
            VarValue::Substance(name) => Ok(name),
            VarValue::Number(_) => Err(ProcessError::VariableType {
                scenario: scenario.to_string(),
                variable: variable.to_string(),
                expected: "substance name",
            }),
        }
    }
}
