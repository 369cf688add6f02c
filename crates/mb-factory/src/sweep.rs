//! Scenario and quantity sweeps over a factory.
//!
//! Sweep points are independent, so they are balanced in parallel and the
//! outcome keeps the input order. A failed point keeps its slot as `None`
//! instead of aborting the sweep, so the remaining points still plot.

use rayon::prelude::*;
use tracing::{debug, warn};

use mb_core::Real;
use mb_process::BalanceContext;

use crate::error::FactoryResult;
use crate::factory::{Factory, FactoryBalance};

/// One failed sweep point.
#[derive(Debug, Clone)]
pub struct SweepFailure {
    pub index: usize,
    pub message: String,
}

/// Outcome of balancing one factory over a list of points.
#[derive(Debug, Clone)]
pub struct SweepOutcome<P> {
    /// Independent values, in the order given.
    pub points: Vec<P>,
    /// One balance per point, `None` where balancing failed.
    pub balances: Vec<Option<FactoryBalance>>,
    pub failures: Vec<SweepFailure>,
}

impl<P> SweepOutcome<P> {
    fn from_results(points: Vec<P>, results: Vec<FactoryResult<FactoryBalance>>) -> Self {
        let mut balances = Vec::with_capacity(results.len());
        let mut failures = Vec::new();
        for (index, result) in results.into_iter().enumerate() {
            match result {
                Ok(balance) => balances.push(Some(balance)),
                Err(err) => {
                    warn!("sweep point {index} failed: {err}");
                    failures.push(SweepFailure {
                        index,
                        message: err.to_string(),
                    });
                    balances.push(None);
                }
            }
        }
        Self {
            points,
            balances,
            failures,
        }
    }

    pub fn num_successful(&self) -> usize {
        self.balances.iter().filter(|b| b.is_some()).count()
    }

    pub fn num_failed(&self) -> usize {
        self.failures.len()
    }

    /// Points whose balance succeeded, paired with their results.
    pub fn successful(&self) -> impl Iterator<Item = (&P, &FactoryBalance)> + '_ {
        self.points
            .iter()
            .zip(&self.balances)
            .filter_map(|(point, balance)| balance.as_ref().map(|b| (point, b)))
    }
}

/// Balance the factory under each scenario at a fixed target quantity.
pub fn sweep_scenarios(
    factory: &Factory,
    quantity: Real,
    scenarios: &[String],
    ctx: &BalanceContext<'_>,
) -> SweepOutcome<String> {
    debug!(
        "factory '{}': sweeping {} scenarios",
        factory.name(),
        scenarios.len()
    );
    let results: Vec<_> = scenarios
        .par_iter()
        .map(|scenario| factory.balance(quantity, scenario, ctx))
        .collect();
    SweepOutcome::from_results(scenarios.to_vec(), results)
}

/// Balance the factory at each target quantity under a fixed scenario.
pub fn sweep_quantities(
    factory: &Factory,
    quantities: &[Real],
    scenario: &str,
    ctx: &BalanceContext<'_>,
) -> SweepOutcome<Real> {
    debug!(
        "factory '{}': sweeping {} quantities",
        factory.name(),
        quantities.len()
    );
    let results: Vec<_> = quantities
        .par_iter()
        .map(|&quantity| factory.balance(quantity, scenario, ctx))
        .collect();
    SweepOutcome::from_results(quantities.to_vec(), results)
}
