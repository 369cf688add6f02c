//! Ordered process links and chain balancing.
//!
//! A chain strings processes together along one carried substance per hop:
//! each link's outflow feeds the next link's inflow. Balancing anchors at
//! whichever end the target lives on and propagates hop by hop, re-seeding
//! each process with the quantity its neighbor computed.

use tracing::debug;

use mb_core::{Direction, Real, Substance};
use mb_process::{BalanceContext, BalancedFlows, UnitProcess};

use crate::error::{ChainError, ChainResult};

/// One process with its carried boundary flows.
#[derive(Debug, Clone)]
pub struct ChainLink {
    pub process: UnitProcess,
    pub inflow: Substance,
    pub outflow: Substance,
}

impl ChainLink {
    pub fn new(process: UnitProcess, inflow: &str, outflow: &str) -> Self {
        Self {
            process,
            inflow: Substance::new(inflow),
            outflow: Substance::new(outflow),
        }
    }
}

/// A linear production chain.
#[derive(Debug, Clone)]
pub struct ProductChain {
    name: String,
    links: Vec<ChainLink>,
}

/// Per-process results in forward chain order, plus chain boundary totals.
///
/// Totals are the sum of all process maps with every internal handover
/// subtracted once from each side, so only flows crossing the chain
/// boundary remain.
#[derive(Debug, Clone, PartialEq)]
pub struct ChainBalance {
    pub chain: String,
    pub processes: Vec<(String, BalancedFlows)>,
    pub totals: BalancedFlows,
}

impl ChainBalance {
    pub fn process(&self, name: &str) -> Option<&BalancedFlows> {
        self.processes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, flows)| flows)
    }

    /// Add another balance of the same chain onto this one.
    pub fn merge_add(&mut self, other: &ChainBalance) -> ChainResult<()> {
        if self.chain != other.chain || self.processes.len() != other.processes.len() {
            return Err(ChainError::MergeMismatch {
                left: self.chain.clone(),
                right: other.chain.clone(),
            });
        }
        for ((name, flows), (other_name, other_flows)) in
            self.processes.iter_mut().zip(&other.processes)
        {
            if name != other_name {
                return Err(ChainError::MergeMismatch {
                    left: self.chain.clone(),
                    right: other.chain.clone(),
                });
            }
            flows.merge_add(other_flows);
        }
        self.totals.merge_add(&other.totals);
        Ok(())
    }
}

impl ProductChain {
    /// Build a chain, checking every link against its process's declared
    /// flows and every handover against the next link.
    pub fn new(name: &str, links: Vec<ChainLink>) -> ChainResult<Self> {
        if links.is_empty() {
            return Err(ChainError::Empty {
                chain: name.to_string(),
            });
        }
        for (index, link) in links.iter().enumerate() {
            if !link.process.has_inflow(&link.inflow) {
                return Err(ChainError::UndeclaredFlow {
                    chain: name.to_string(),
                    process: link.process.name().to_string(),
                    substance: link.inflow.to_string(),
                    direction: Direction::Inflow,
                });
            }
            if !link.process.has_outflow(&link.outflow) {
                return Err(ChainError::UndeclaredFlow {
                    chain: name.to_string(),
                    process: link.process.name().to_string(),
                    substance: link.outflow.to_string(),
                    direction: Direction::Outflow,
                });
            }
            if let Some(next) = links.get(index + 1) {
                if link.outflow != next.inflow {
                    return Err(ChainError::BrokenLink {
                        chain: name.to_string(),
                        index,
                        outflow: link.outflow.to_string(),
                        inflow: next.inflow.to_string(),
                    });
                }
            }
        }
        Ok(Self {
            name: name.to_string(),
            links,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn links(&self) -> &[ChainLink] {
        &self.links
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn contains_process(&self, name: &str) -> bool {
        self.links.iter().any(|link| link.process.name() == name)
    }

    /// Check that a boundary target sits at the matching end of the chain:
    /// inflows belong to the first process, outflows to the last.
    pub fn declares(&self, substance: &Substance, direction: Direction) -> ChainResult<()> {
        let declared = match direction {
            Direction::Inflow => self.links[0].process.has_inflow(substance),
            Direction::Outflow => self.links[self.links.len() - 1]
                .process
                .has_outflow(substance),
            other => return Err(ChainError::UnknownDestination { direction: other }),
        };
        if declared {
            Ok(())
        } else {
            Err(ChainError::SubstanceNotFound {
                chain: self.name.clone(),
                substance: substance.to_string(),
                direction,
            })
        }
    }

    /// Balance the chain from one boundary flow.
    ///
    /// An inflow target must belong to the first process, an outflow target
    /// to the last; propagation then runs forward or backward respectively.
    pub fn balance(
        &self,
        quantity: Real,
        substance: &Substance,
        direction: Direction,
        scenario: &str,
        ctx: &BalanceContext<'_>,
    ) -> ChainResult<ChainBalance> {
        self.balance_as(quantity, substance, direction, scenario, None, ctx)
    }

    /// Balance with the boundary target seeded under another name in its end
    /// process. Factories use this to carry a product across chains that
    /// name it differently.
    pub fn balance_as(
        &self,
        quantity: Real,
        substance: &Substance,
        direction: Direction,
        scenario: &str,
        alias: Option<&Substance>,
        ctx: &BalanceContext<'_>,
    ) -> ChainResult<ChainBalance> {
        self.declares(substance, direction)?;
        let n = self.links.len();
        let mut computed: Vec<BalancedFlows> = Vec::with_capacity(n);
        let mut transfers: Vec<(Substance, Real)> = Vec::with_capacity(n.saturating_sub(1));

        match direction {
            Direction::Inflow => {
                let first = &self.links[0];
                debug!("chain '{}': forward from '{}'", self.name, substance);
                computed.push(first.process.balance_as(
                    quantity, substance, direction, scenario, alias, ctx,
                )?);
                for k in 1..n {
                    let carried = &self.links[k - 1].outflow;
                    let qty = match computed[k - 1].outflows.get(carried) {
                        Some(qty) => qty,
                        None => {
                            return Err(ChainError::MissingLinkFlow {
                                chain: self.name.clone(),
                                process: self.links[k - 1].process.name().to_string(),
                                substance: carried.to_string(),
                            });
                        }
                    };
                    transfers.push((carried.clone(), qty));
                    let link = &self.links[k];
                    computed.push(link.process.balance(
                        qty,
                        &link.inflow,
                        Direction::Inflow,
                        scenario,
                        ctx,
                    )?);
                }
            }
            Direction::Outflow => {
                let last = &self.links[n - 1];
                debug!("chain '{}': backward from '{}'", self.name, substance);
                computed.push(last.process.balance_as(
                    quantity, substance, direction, scenario, alias, ctx,
                )?);
                for k in (0..n - 1).rev() {
                    let carried = &self.links[k + 1].inflow;
                    let qty = match computed[computed.len() - 1].inflows.get(carried) {
                        Some(qty) => qty,
                        None => {
                            return Err(ChainError::MissingLinkFlow {
                                chain: self.name.clone(),
                                process: self.links[k + 1].process.name().to_string(),
                                substance: carried.to_string(),
                            });
                        }
                    };
                    transfers.push((carried.clone(), qty));
                    let link = &self.links[k];
                    computed.push(link.process.balance(
                        qty,
                        &link.outflow,
                        Direction::Outflow,
                        scenario,
                        ctx,
                    )?);
                }
                // computed was filled last-to-first
                computed.reverse();
            }
            other => return Err(ChainError::UnknownDestination { direction: other }),
        }

        let mut totals = BalancedFlows::default();
        for flows in &computed {
            totals.merge_add(flows);
        }
        let tol = ctx.options.tolerances;
        for (substance, qty) in &transfers {
            totals.inflows.cancel(substance, *qty, tol);
            totals.outflows.cancel(substance, *qty, tol);
        }

        let processes = self
            .links
            .iter()
            .zip(computed)
            .map(|(link, flows)| (link.process.name().to_string(), flows))
            .collect();

        Ok(ChainBalance {
            chain: self.name.clone(),
            processes,
            totals,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mb_process::{CalcTable, LookupKeys, RawRow, VariableTable, DEFAULT_SCENARIO};
    use mb_props::{EnergyFlows, StaticProperties};

    fn s(name: &str) -> Substance {
        Substance::new(name)
    }

    fn ratio_process(name: &str, input: &str, output: &str, rate: f64) -> UnitProcess {
        let raw = vec![RawRow::new(input, "i", output, "o", "ratio", "rate")];
        let table = CalcTable::from_raw(&raw).unwrap();
        let vars = VariableTable::new().with_number(DEFAULT_SCENARIO, "rate", rate);
        UnitProcess::new(name, table, vars)
    }

    #[test]
    fn empty_chain_is_rejected() {
        let err = ProductChain::new("void", vec![]).unwrap_err();
        assert!(matches!(err, ChainError::Empty { .. }));
    }

    #[test]
    fn handover_mismatch_is_rejected() {
        let a = ratio_process("mill", "ore", "concentrate", 0.4);
        let b = ratio_process("smelter", "matte", "metal", 0.8);
        let err = ProductChain::new(
            "broken",
            vec![
                ChainLink::new(a, "ore", "concentrate"),
                ChainLink::new(b, "matte", "metal"),
            ],
        )
        .unwrap_err();
        assert!(matches!(err, ChainError::BrokenLink { index: 0, .. }));
    }

    #[test]
    fn undeclared_link_flow_is_rejected() {
        let a = ratio_process("mill", "ore", "concentrate", 0.4);
        let err = ProductChain::new("bad", vec![ChainLink::new(a, "ore", "tailings")]).unwrap_err();
        match err {
            ChainError::UndeclaredFlow {
                substance,
                direction,
                ..
            } => {
                assert_eq!(substance, "tailings");
                assert_eq!(direction, Direction::Outflow);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn target_must_sit_at_the_matching_end() {
        let a = ratio_process("mill", "ore", "concentrate", 0.4);
        let b = ratio_process("smelter", "concentrate", "metal", 0.8);
        let chain = ProductChain::new(
            "copper",
            vec![
                ChainLink::new(a, "ore", "concentrate"),
                ChainLink::new(b, "concentrate", "metal"),
            ],
        )
        .unwrap();
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        // "metal" is an outflow of the last process, not an inflow of the first
        let err = chain
            .balance(1.0, &s("metal"), Direction::Inflow, DEFAULT_SCENARIO, &ctx)
            .unwrap_err();
        assert!(matches!(err, ChainError::SubstanceNotFound { .. }));

        let err = chain
            .balance(1.0, &s("metal"), Direction::Temp, DEFAULT_SCENARIO, &ctx)
            .unwrap_err();
        assert!(matches!(err, ChainError::UnknownDestination { .. }));
    }

    #[test]
    fn chain_round_trips_between_both_ends() {
        let a = ratio_process("mill", "ore", "concentrate", 0.4);
        let b = ratio_process("smelter", "concentrate", "metal", 0.8);
        let chain = ProductChain::new(
            "copper",
            vec![
                ChainLink::new(a, "ore", "concentrate"),
                ChainLink::new(b, "concentrate", "metal"),
            ],
        )
        .unwrap();
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let forward = chain
            .balance(1000.0, &s("ore"), Direction::Inflow, DEFAULT_SCENARIO, &ctx)
            .unwrap();
        let backward = chain
            .balance(320.0, &s("metal"), Direction::Outflow, DEFAULT_SCENARIO, &ctx)
            .unwrap();
        assert_eq!(forward.totals.inflows.get(&s("ore")), Some(1000.0));
        assert_eq!(backward.totals.inflows.get(&s("ore")), Some(1000.0));
        assert_eq!(forward.processes[0].0, backward.processes[0].0);
    }

    #[test]
    fn internal_handover_cancels_out_of_totals() {
        let a = ratio_process("mill", "ore", "concentrate", 0.4);
        let b = ratio_process("smelter", "concentrate", "metal", 0.8);
        let chain = ProductChain::new(
            "copper",
            vec![
                ChainLink::new(a, "ore", "concentrate"),
                ChainLink::new(b, "concentrate", "metal"),
            ],
        )
        .unwrap();
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let result = chain
            .balance(1000.0, &s("ore"), Direction::Inflow, DEFAULT_SCENARIO, &ctx)
            .unwrap();
        assert_eq!(result.processes.len(), 2);
        assert_eq!(result.processes[0].0, "mill");
        assert_eq!(
            result.process("smelter").unwrap().outflows.get(&s("metal")),
            Some(320.0)
        );
        // the concentrate handover is internal
        assert!(!result.totals.inflows.contains(&s("concentrate")));
        assert!(!result.totals.outflows.contains(&s("concentrate")));
        assert_eq!(result.totals.inflows.get(&s("ore")), Some(1000.0));
        assert_eq!(result.totals.outflows.get(&s("metal")), Some(320.0));
    }
}
