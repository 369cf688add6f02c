//! Keyed quantity maps.

use std::collections::BTreeMap;

use crate::numeric::{nearly_equal, Real, Tolerances};
use crate::substance::Substance;

/// Flow quantities keyed by substance, iterated in key order.
///
/// Writes are explicit: [`FlowMap::set`] overwrites, [`FlowMap::add`]
/// accumulates. Callers pick one per destination so the balancing rules stay
/// visible at the call site.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FlowMap {
    entries: BTreeMap<Substance, Real>,
}

impl FlowMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite the entry for `key`.
    pub fn set(&mut self, key: Substance, value: Real) {
        self.entries.insert(key, value);
    }

    /// Accumulate onto the entry for `key`, starting from zero.
    pub fn add(&mut self, key: Substance, value: Real) {
        *self.entries.entry(key).or_insert(0.0) += value;
    }

    pub fn get(&self, key: &Substance) -> Option<Real> {
        self.entries.get(key).copied()
    }

    pub fn contains(&self, key: &Substance) -> bool {
        self.entries.contains_key(key)
    }

    pub fn remove(&mut self, key: &Substance) -> Option<Real> {
        self.entries.remove(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Substance, Real)> {
        self.entries.iter().map(|(k, v)| (k, *v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &Substance> {
        self.entries.keys()
    }

    /// Add every entry of `other` into this map.
    pub fn merge_add(&mut self, other: &FlowMap) {
        for (key, value) in other.iter() {
            self.add(key.clone(), value);
        }
    }

    /// Sum of all entries.
    pub fn total(&self) -> Real {
        self.entries.values().sum()
    }

    /// Sum of the entries whose key satisfies `pred`.
    pub fn total_where(&self, pred: impl Fn(&Substance) -> bool) -> Real {
        self.entries
            .iter()
            .filter(|(k, _)| pred(k))
            .map(|(_, v)| v)
            .sum()
    }

    /// Subtract `amount` from `key`, dropping the entry when the remainder is
    /// indistinguishable from zero. Missing keys are left untouched.
    pub fn cancel(&mut self, key: &Substance, amount: Real, tol: Tolerances) {
        if let Some(value) = self.entries.get_mut(key) {
            *value -= amount;
            if nearly_equal(*value, 0.0, tol) {
                self.entries.remove(key);
            }
        }
    }
}

impl FromIterator<(Substance, Real)> for FlowMap {
    fn from_iter<I: IntoIterator<Item = (Substance, Real)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
