//! Energy flow classification.

use std::collections::BTreeSet;

use mb_core::Substance;

/// Flow names treated as energy rather than mass.
///
/// Mass conservation checks skip these entries; the optional energy check
/// sums exactly these entries. The built-in set also classifies the
/// `UNKNOWN-energy` closure entry so re-totaled results stay consistent.
#[derive(Debug, Clone)]
pub struct EnergyFlows {
    names: BTreeSet<String>,
}

const BUILTIN_ENERGY_FLOWS: &[&str] = &[
    "electricity",
    "energy",
    "heat",
    "steam",
    "unknown-energy",
    "waste heat",
];

impl Default for EnergyFlows {
    fn default() -> Self {
        Self {
            names: BUILTIN_ENERGY_FLOWS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl EnergyFlows {
    pub fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    pub fn insert(&mut self, name: &str) {
        self.names.insert(name.trim().to_lowercase());
    }

    pub fn with(mut self, name: &str) -> Self {
        self.insert(name);
        self
    }

    /// Classification ignores the qualifier: `heat__recovered` is still heat.
    pub fn contains(&self, substance: &Substance) -> bool {
        self.names.contains(substance.canonical())
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.names.contains(&name.trim().to_lowercase())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_set_classifies_common_carriers() {
        let energy = EnergyFlows::default();
        assert!(energy.contains(&Substance::new("Electricity")));
        assert!(energy.contains(&Substance::new("waste heat")));
        assert!(!energy.contains(&Substance::new("coke")));
    }

    #[test]
    fn qualifier_does_not_change_classification() {
        let energy = EnergyFlows::default();
        assert!(energy.contains(&Substance::new("heat__recovered")));
    }

    #[test]
    fn extension_adds_names() {
        let energy = EnergyFlows::empty().with("Process Steam");
        assert!(energy.contains_name("process steam"));
        assert!(!energy.contains_name("heat"));
    }
}
