//! The worklist balancer.
//!
//! Balancing seeds one boundary flow and drains the calculation rows in
//! table order. A row whose known side has no value yet is pushed to the
//! back of the queue; a row whose unknown side already has a value runs in
//! reverse instead of stalling. When every remaining row has deferred for a
//! full lap with no progress, the table cannot be resolved from that seed.

use std::collections::VecDeque;

use tracing::{debug, warn};

use mb_calc::{evaluate, CalcError, CalcInput};
use mb_core::{nearly_equal, Direction, FlowMap, Real, Substance};

use crate::context::BalanceContext;
use crate::error::{ProcessError, ProcessResult};
use crate::process::UnitProcess;
use crate::table::CalcRow;

/// Closure entry recording a mass conservation gap.
pub const UNKNOWN_MASS: &str = "UNKNOWN-mass";
/// Closure entry recording an energy gap.
pub const UNKNOWN_ENERGY: &str = "UNKNOWN-energy";

/// Boundary flow maps of one balanced process.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalancedFlows {
    pub inflows: FlowMap,
    pub outflows: FlowMap,
}

impl BalancedFlows {
    /// Add every entry of `other` onto this result.
    pub fn merge_add(&mut self, other: &BalancedFlows) {
        self.inflows.merge_add(&other.inflows);
        self.outflows.merge_add(&other.outflows);
    }

    /// The map for one boundary side; `None` for internal directions.
    pub fn side(&self, direction: Direction) -> Option<&FlowMap> {
        match direction {
            Direction::Inflow => Some(&self.inflows),
            Direction::Outflow => Some(&self.outflows),
            _ => None,
        }
    }

    pub fn side_mut(&mut self, direction: Direction) -> Option<&mut FlowMap> {
        match direction {
            Direction::Inflow => Some(&mut self.inflows),
            Direction::Outflow => Some(&mut self.outflows),
            _ => None,
        }
    }
}

/// Working flow state of one balance call, one map per direction.
#[derive(Debug, Default)]
struct Tally {
    inflow: FlowMap,
    outflow: FlowMap,
    temp: FlowMap,
    emission: FlowMap,
    co_inflow: FlowMap,
}

impl Tally {
    fn read(&self, substance: &Substance, dir: Direction) -> Option<Real> {
        let map = match dir {
            Direction::Inflow => &self.inflow,
            Direction::Outflow => &self.outflow,
            Direction::Temp => &self.temp,
            Direction::Emission => &self.emission,
            Direction::CoInflow => &self.co_inflow,
            Direction::Discard => return None,
        };
        map.get(substance)
    }

    fn write(&mut self, substance: &Substance, dir: Direction, value: Real) {
        match dir {
            Direction::Inflow => self.inflow.set(substance.clone(), value),
            Direction::Outflow => self.outflow.set(substance.clone(), value),
            Direction::Temp => self.temp.set(substance.clone(), value),
            Direction::Emission => self.emission.add(substance.clone(), value),
            Direction::CoInflow => self.co_inflow.add(substance.clone(), value),
            Direction::Discard => {}
        }
    }
}

/// Inputs a queued row needs before it can run: the resolved quantity, the
/// solve orientation, and the second operand where the kind takes one.
fn readiness<'r>(
    tally: &Tally,
    row: &'r CalcRow,
) -> Option<(Real, bool, Option<(&'r Substance, Real)>)> {
    let (qty, invert) = match tally.read(&row.known, row.known_dir) {
        Some(qty) => (qty, false),
        None => {
            // An accumulating destination never holds a settled value, so a
            // row cannot be driven backwards from it.
            if row.unknown_dir.accumulates() {
                return None;
            }
            (tally.read(&row.unknown, row.unknown_dir)?, true)
        }
    };
    let second = match &row.second {
        Some((substance, dir)) => Some((substance, tally.read(substance, *dir)?)),
        None => None,
    };
    Some((qty, invert, second))
}

fn rename(rows: &mut [CalcRow], from: &Substance, to: &Substance) {
    for row in rows {
        if row.known == *from {
            row.known = to.clone();
        }
        if row.unknown == *from {
            row.unknown = to.clone();
        }
        if let Some((substance, _)) = &mut row.second {
            if substance == from {
                *substance = to.clone();
            }
        }
    }
}

impl UnitProcess {
    /// Balance this process from one known boundary flow.
    pub fn balance(
        &self,
        quantity: Real,
        substance: &Substance,
        direction: Direction,
        scenario: &str,
        ctx: &BalanceContext<'_>,
    ) -> ProcessResult<BalancedFlows> {
        self.balance_as(quantity, substance, direction, scenario, None, ctx)
    }

    /// Balance with the seed recorded, and its table occurrences rewritten,
    /// under another name. Chains use this to carry one substance across
    /// processes that each name it differently.
    pub fn balance_as(
        &self,
        quantity: Real,
        substance: &Substance,
        direction: Direction,
        scenario: &str,
        alias: Option<&Substance>,
        ctx: &BalanceContext<'_>,
    ) -> ProcessResult<BalancedFlows> {
        // a process without variables is scenario-independent
        if !self.variables().is_empty() && !self.variables().contains_scenario(scenario) {
            return Err(ProcessError::ScenarioNotFound {
                process: self.name().to_string(),
                scenario: scenario.to_string(),
            });
        }
        if !self.boundary(direction)?.contains(substance) {
            return Err(ProcessError::SubstanceNotFound {
                process: self.name().to_string(),
                substance: substance.to_string(),
                direction,
            });
        }
        if quantity < 0.0 {
            return Err(CalcError::NegativeQuantity {
                substance: substance.to_string(),
                value: quantity,
            }
            .into());
        }

        let mut rows: Vec<CalcRow> = self.table().rows().to_vec();
        let seed = match alias {
            Some(alias) => {
                rename(&mut rows, substance, alias);
                alias.clone()
            }
            None => substance.clone(),
        };
        self.resolve_lookups(&mut rows, scenario, ctx)?;

        let mut tally = Tally::default();
        tally.write(&seed, direction, quantity);
        debug!(
            "process '{}': balancing {} {} of '{}' under scenario '{}'",
            self.name(),
            quantity,
            direction.word(),
            seed,
            scenario
        );

        let mut queue: VecDeque<usize> = (0..rows.len()).collect();
        let mut stalls = 0usize;
        while let Some(index) = queue.pop_front() {
            let row = &rows[index];
            let Some((known_qty, invert, second)) = readiness(&tally, row) else {
                queue.push_back(index);
                stalls += 1;
                if stalls >= queue.len() {
                    return Err(ProcessError::CannotResolve {
                        process: self.name().to_string(),
                        substance: row.known.to_string(),
                        remaining: queue.len(),
                    });
                }
                continue;
            };
            stalls = 0;

            let variable = match &row.variable {
                Some(name) if row.kind.needs_variable() => {
                    self.variables().number(scenario, name)?
                }
                _ => 0.0,
            };
            let (src, dst, dst_dir) = if invert {
                (&row.unknown, &row.known, row.known_dir)
            } else {
                (&row.known, &row.unknown, row.unknown_dir)
            };
            let out = evaluate(
                row.kind,
                &CalcInput {
                    known_qty,
                    variable,
                    known: src,
                    unknown: dst,
                    second,
                    invert,
                    props: ctx.props,
                },
            )?;
            if out.value < 0.0 {
                warn!(
                    "process '{}': negative quantity {} for '{}'",
                    self.name(),
                    out.value,
                    dst
                );
            }
            tally.write(dst, dst_dir, out.value);
            for (substance, qty) in out.emissions {
                tally.emission.add(substance, qty);
            }
        }

        let Tally {
            mut inflow,
            mut outflow,
            temp: _,
            emission,
            co_inflow,
        } = tally;
        outflow.merge_add(&emission);
        inflow.merge_add(&co_inflow);

        let mut result = BalancedFlows {
            inflows: inflow,
            outflows: outflow,
        };
        self.close_balance(&mut result, ctx)?;
        Ok(result)
    }

    fn resolve_lookups(
        &self,
        rows: &mut [CalcRow],
        scenario: &str,
        ctx: &BalanceContext<'_>,
    ) -> ProcessResult<()> {
        if ctx.lookup.is_empty() {
            return Ok(());
        }
        for row in rows {
            self.resolve_lookup_cell(&mut row.known, scenario, ctx)?;
            self.resolve_lookup_cell(&mut row.unknown, scenario, ctx)?;
            if let Some((substance, _)) = &mut row.second {
                self.resolve_lookup_cell(substance, scenario, ctx)?;
            }
        }
        Ok(())
    }

    fn resolve_lookup_cell(
        &self,
        cell: &mut Substance,
        scenario: &str,
        ctx: &BalanceContext<'_>,
    ) -> ProcessResult<()> {
        if ctx.lookup.contains(cell.canonical()) {
            let name = self.variables().substance_name(scenario, cell.canonical())?;
            *cell = Substance::new(name);
        }
        Ok(())
    }

    /// Conservation checks over the folded result.
    ///
    /// Mass and energy are compared independently: mass totals skip energy
    /// flows, the optional energy check sums only them. A gap on either side
    /// becomes a closure entry on the deficient side, or an error in strict
    /// mode.
    fn close_balance(
        &self,
        result: &mut BalancedFlows,
        ctx: &BalanceContext<'_>,
    ) -> ProcessResult<()> {
        let opts = &ctx.options;
        let mass_in = result.inflows.total_where(|s| !ctx.energy.contains(s));
        let mass_out = result.outflows.total_where(|s| !ctx.energy.contains(s));
        if !nearly_equal(mass_in, mass_out, opts.tolerances) {
            if opts.strict {
                return Err(ProcessError::Imbalance {
                    process: self.name().to_string(),
                    check: "mass",
                    inflow: mass_in,
                    outflow: mass_out,
                });
            }
            warn!(
                "process '{}': mass imbalance, {} in vs {} out",
                self.name(),
                mass_in,
                mass_out
            );
            if mass_in > mass_out {
                result
                    .outflows
                    .add(Substance::new(UNKNOWN_MASS), mass_in - mass_out);
            } else {
                result
                    .inflows
                    .add(Substance::new(UNKNOWN_MASS), mass_out - mass_in);
            }
        }
        if opts.balance_energy {
            let energy_in = result.inflows.total_where(|s| ctx.energy.contains(s));
            let energy_out = result.outflows.total_where(|s| ctx.energy.contains(s));
            if !nearly_equal(energy_in, energy_out, opts.tolerances) {
                if opts.strict {
                    return Err(ProcessError::Imbalance {
                        process: self.name().to_string(),
                        check: "energy",
                        inflow: energy_in,
                        outflow: energy_out,
                    });
                }
                warn!(
                    "process '{}': energy imbalance, {} in vs {} out",
                    self.name(),
                    energy_in,
                    energy_out
                );
                if energy_in > energy_out {
                    result
                        .outflows
                        .add(Substance::new(UNKNOWN_ENERGY), energy_in - energy_out);
                } else {
                    result
                        .inflows
                        .add(Substance::new(UNKNOWN_ENERGY), energy_out - energy_in);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::{BalanceOptions, LookupKeys};
    use crate::table::{CalcTable, RawRow};
    use crate::variables::{VariableTable, DEFAULT_SCENARIO};
    use mb_props::{EnergyFlows, StaticProperties};

    fn s(name: &str) -> Substance {
        Substance::new(name)
    }

    fn single_ratio_process() -> UnitProcess {
        let raw = vec![RawRow::new("A", "i", "B", "o", "ratio", "r1")];
        let table = CalcTable::from_raw(&raw).unwrap();
        let vars = VariableTable::new().with_number(DEFAULT_SCENARIO, "r1", 2.0);
        UnitProcess::new("doubler", table, vars)
    }

    #[test]
    fn forward_seed_resolves_table() {
        let process = single_ratio_process();
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let result = process
            .balance(3.0, &s("A"), Direction::Inflow, DEFAULT_SCENARIO, &ctx)
            .unwrap();
        assert_eq!(result.inflows.get(&s("A")), Some(3.0));
        assert_eq!(result.outflows.get(&s("B")), Some(6.0));
        // 3 in vs 6 out leaves a 3-unit closure entry on the inflow side
        assert_eq!(result.inflows.get(&s(UNKNOWN_MASS)), Some(3.0));
    }

    #[test]
    fn backward_seed_gives_identical_result() {
        let process = single_ratio_process();
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let forward = process
            .balance(3.0, &s("A"), Direction::Inflow, DEFAULT_SCENARIO, &ctx)
            .unwrap();
        let backward = process
            .balance(6.0, &s("B"), Direction::Outflow, DEFAULT_SCENARIO, &ctx)
            .unwrap();
        assert_eq!(forward, backward);
    }

    #[test]
    fn unknown_seed_direction_is_rejected() {
        let process = single_ratio_process();
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let err = process
            .balance(3.0, &s("A"), Direction::Temp, DEFAULT_SCENARIO, &ctx)
            .unwrap_err();
        assert!(matches!(err, ProcessError::UnknownDestination { .. }));
    }

    #[test]
    fn seeding_an_undeclared_flow_fails() {
        let process = single_ratio_process();
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let err = process
            .balance(3.0, &s("B"), Direction::Inflow, DEFAULT_SCENARIO, &ctx)
            .unwrap_err();
        assert!(matches!(err, ProcessError::SubstanceNotFound { .. }));
    }

    #[test]
    fn missing_scenario_fails_before_any_row_runs() {
        let process = single_ratio_process();
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let err = process
            .balance(3.0, &s("A"), Direction::Inflow, "expansion", &ctx)
            .unwrap_err();
        assert!(matches!(err, ProcessError::ScenarioNotFound { .. }));
    }

    #[test]
    fn variable_free_process_accepts_any_scenario() {
        let raw = vec![RawRow::new("CaCO3", "i", "CaO", "o", "molmassratio", "")];
        let table = CalcTable::from_raw(&raw).unwrap();
        let process = UnitProcess::new("lime kiln", table, VariableTable::new());
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let result = process
            .balance(100.087, &s("CaCO3"), Direction::Inflow, "expansion", &ctx)
            .unwrap();
        assert!(nearly_equal(
            result.outflows.get(&s("CaO")).unwrap(),
            56.077,
            mb_core::Tolerances::default()
        ));
    }

    #[test]
    fn circular_dependency_is_detected() {
        // neither row can start: each known waits on the other's unknown
        let raw = vec![
            RawRow::new("x", "t", "y", "t", "ratio", "r"),
            RawRow::new("y", "t", "x", "t", "ratio", "r"),
            RawRow::new("A", "i", "B", "o", "returnvalue", ""),
        ];
        let table = CalcTable::from_raw(&raw).unwrap();
        let vars = VariableTable::new().with_number(DEFAULT_SCENARIO, "r", 1.0);
        let process = UnitProcess::new("loop", table, vars);
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let err = process
            .balance(1.0, &s("A"), Direction::Inflow, DEFAULT_SCENARIO, &ctx)
            .unwrap_err();
        match err {
            ProcessError::CannotResolve { remaining, .. } => assert_eq!(remaining, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn strict_mode_turns_gaps_into_errors() {
        let process = single_ratio_process();
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup).with_options(BalanceOptions {
            strict: true,
            ..BalanceOptions::default()
        });

        let err = process
            .balance(3.0, &s("A"), Direction::Inflow, DEFAULT_SCENARIO, &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Imbalance { check: "mass", .. }
        ));
    }

    #[test]
    fn balanced_split_leaves_no_closure_entry() {
        let raw = vec![
            RawRow::new("ore", "i", "iron", "o", "ratio", "fe"),
            RawRow::new("ore", "i", "slag", "o", "remainder", "fe"),
        ];
        let table = CalcTable::from_raw(&raw).unwrap();
        let vars = VariableTable::new().with_number(DEFAULT_SCENARIO, "fe", 0.6);
        let process = UnitProcess::new("separator", table, vars);
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let result = process
            .balance(100.0, &s("ore"), Direction::Inflow, DEFAULT_SCENARIO, &ctx)
            .unwrap();
        assert_eq!(result.outflows.get(&s("iron")), Some(60.0));
        assert_eq!(result.outflows.get(&s("slag")), Some(40.0));
        assert!(!result.inflows.contains(&s(UNKNOWN_MASS)));
        assert!(!result.outflows.contains(&s(UNKNOWN_MASS)));
    }

    #[test]
    fn lookup_key_substitutes_the_scenario_substance() {
        let raw = vec![
            RawRow::new("steel", "o", "fuel", "i", "ratio", "fuel_rate"),
            RawRow::new("steel", "o", "steel scrap", "i", "ratio", "scrap_rate"),
        ];
        let table = CalcTable::from_raw(&raw).unwrap();
        let vars = VariableTable::new()
            .with_number(DEFAULT_SCENARIO, "fuel_rate", 0.05)
            .with_number(DEFAULT_SCENARIO, "scrap_rate", 1.0)
            .with_substance(DEFAULT_SCENARIO, "fuel", "natural gas")
            .with_number("coke fired", "fuel_rate", 0.07)
            .with_number("coke fired", "scrap_rate", 1.0)
            .with_substance("coke fired", "fuel", "coke");
        let process = UnitProcess::new("melt shop", table, vars);
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new().with("fuel");
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let tol = mb_core::Tolerances::default();
        let result = process
            .balance(100.0, &s("steel"), Direction::Outflow, DEFAULT_SCENARIO, &ctx)
            .unwrap();
        assert!(nearly_equal(
            result.inflows.get(&s("natural gas")).unwrap(),
            5.0,
            tol
        ));
        assert!(!result.inflows.contains(&s("fuel")));

        let result = process
            .balance(100.0, &s("steel"), Direction::Outflow, "coke fired", &ctx)
            .unwrap();
        assert!(nearly_equal(result.inflows.get(&s("coke")).unwrap(), 7.0, tol));
    }

    #[test]
    fn alias_renames_seed_and_rows() {
        let raw = vec![RawRow::new("slab", "i", "coil", "o", "ratio", "yield")];
        let table = CalcTable::from_raw(&raw).unwrap();
        let vars = VariableTable::new().with_number(DEFAULT_SCENARIO, "yield", 0.95);
        let process = UnitProcess::new("hot mill", table, vars);
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let alias = s("slab__cast");
        let result = process
            .balance_as(
                200.0,
                &s("slab"),
                Direction::Inflow,
                DEFAULT_SCENARIO,
                Some(&alias),
                &ctx,
            )
            .unwrap();
        assert_eq!(result.inflows.get(&alias), Some(200.0));
        assert!(!result.inflows.contains(&s("slab")));
        assert_eq!(result.outflows.get(&s("coil")), Some(190.0));
    }

    #[test]
    fn energy_check_is_independent_of_mass() {
        // 10 coke in, burned at 80 % efficiency; CO2 folds into outflows
        let raw = vec![RawRow::new("coke", "i", "heat", "o", "combustion", "eff")];
        let table = CalcTable::from_raw(&raw).unwrap();
        let vars = VariableTable::new().with_number(DEFAULT_SCENARIO, "eff", 0.8);
        let process = UnitProcess::new("stove", table, vars);
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup).with_options(BalanceOptions {
            balance_energy: true,
            ..BalanceOptions::default()
        });

        let result = process
            .balance(10.0, &s("coke"), Direction::Inflow, DEFAULT_SCENARIO, &ctx)
            .unwrap();
        let tol = mb_core::Tolerances::default();
        assert!(nearly_equal(
            result.outflows.get(&s("heat")).unwrap(),
            228.8,
            tol
        ));
        assert!(nearly_equal(
            result.outflows.get(&s("waste heat")).unwrap(),
            57.2,
            tol
        ));
        // mass: 10 coke in vs 31.9 CO2 out
        assert!(nearly_equal(
            result.inflows.get(&s(UNKNOWN_MASS)).unwrap(),
            21.9,
            tol
        ));
        // energy: nothing in vs 286 out
        assert!(nearly_equal(
            result.inflows.get(&s(UNKNOWN_ENERGY)).unwrap(),
            286.0,
            tol
        ));
    }

    #[test]
    fn emission_rows_accumulate_instead_of_overwriting() {
        let raw = vec![
            RawRow::new("clinker", "o", "co2", "e", "ratio", "calcination"),
            RawRow::new("clinker", "o", "co2", "e", "ratio", "firing"),
        ];
        let table = CalcTable::from_raw(&raw).unwrap();
        let vars = VariableTable::new()
            .with_number(DEFAULT_SCENARIO, "calcination", 0.5)
            .with_number(DEFAULT_SCENARIO, "firing", 0.3);
        let process = UnitProcess::new("kiln", table, vars);
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let result = process
            .balance(100.0, &s("clinker"), Direction::Outflow, DEFAULT_SCENARIO, &ctx)
            .unwrap();
        assert_eq!(result.outflows.get(&s("co2")), Some(80.0));
    }

    #[test]
    fn negative_seed_is_rejected() {
        let process = single_ratio_process();
        let props = StaticProperties::default();
        let energy = EnergyFlows::default();
        let lookup = LookupKeys::new();
        let ctx = BalanceContext::new(&props, &energy, &lookup);

        let err = process
            .balance(-3.0, &s("A"), Direction::Inflow, DEFAULT_SCENARIO, &ctx)
            .unwrap_err();
        assert!(matches!(
            err,
            ProcessError::Calc(CalcError::NegativeQuantity { .. })
        ));
    }
}
