//! Balancing context and options.

use std::collections::BTreeSet;

use mb_core::Tolerances;
use mb_props::{EnergyFlows, PropertyOracle};

/// Behavior switches for one balance call.
#[derive(Debug, Clone, Copy)]
pub struct BalanceOptions {
    /// Fail on conservation gaps instead of recording closure entries.
    pub strict: bool,
    /// Also check energy inflows against energy outflows.
    pub balance_energy: bool,
    pub tolerances: Tolerances,
}

impl Default for BalanceOptions {
    fn default() -> Self {
        Self {
            strict: false,
            balance_energy: false,
            tolerances: Tolerances::default(),
        }
    }
}

/// Variable names whose value names a substance instead of a number.
///
/// A table cell matching a registered key is replaced by the substance the
/// scenario variable names, before any row runs. Unregistered names are
/// never treated as placeholders, so a flow that happens to share a variable
/// name stays a flow.
#[derive(Debug, Clone, Default)]
pub struct LookupKeys {
    names: BTreeSet<String>,
}

impl LookupKeys {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str) {
        self.names.insert(name.trim().to_lowercase());
    }

    pub fn with(mut self, name: &str) -> Self {
        self.insert(name);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(&name.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Everything a balance call needs besides the process itself.
#[derive(Clone, Copy)]
pub struct BalanceContext<'a> {
    pub props: &'a dyn PropertyOracle,
    pub energy: &'a EnergyFlows,
    pub lookup: &'a LookupKeys,
    pub options: BalanceOptions,
}

impl<'a> BalanceContext<'a> {
    pub fn new(
        props: &'a dyn PropertyOracle,
        energy: &'a EnergyFlows,
        lookup: &'a LookupKeys,
    ) -> Self {
        Self {
            props,
            energy,
            lookup,
            options: BalanceOptions::default(),
        }
    }

    pub fn with_options(mut self, options: BalanceOptions) -> Self {
        self.options = options;
        self
    }
}
