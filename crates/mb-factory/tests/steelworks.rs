//! Integration test balancing an integrated steelworks.
//!
//! The main steelmaking chain demands hot metal and lime; two connections
//! pull those out of its result and drive the ironmaking and lime burning
//! chains backwards to supply them.

use mb_chain::{ChainLink, ProductChain};
use mb_core::{nearly_equal, Direction, Substance, Tolerances};
use mb_factory::{sweep_quantities, Connection, Factory, Origin};
use mb_process::{
    BalanceContext, CalcTable, LookupKeys, RawRow, UnitProcess, VariableTable, DEFAULT_SCENARIO,
    UNKNOWN_MASS,
};
use mb_props::{EnergyFlows, StaticProperties};

fn s(name: &str) -> Substance {
    Substance::new(name)
}

fn ironmaking() -> ProductChain {
    let raw = vec![
        RawRow::new("iron ore", "i", "moisture", "o", "ratio", "moisture_loss"),
        RawRow::new("iron ore", "i", "sinter", "o", "remainder", "moisture_loss"),
    ];
    let table = CalcTable::from_raw(&raw).unwrap();
    let vars = VariableTable::new().with_number(DEFAULT_SCENARIO, "moisture_loss", 0.08);
    let sinter_plant = UnitProcess::new("sinter plant", table, vars);

    let raw = vec![
        RawRow::new("sinter", "i", "slag", "o", "ratio", "gangue"),
        RawRow::new("sinter", "i", "pig iron", "o", "remainder", "gangue"),
    ];
    let table = CalcTable::from_raw(&raw).unwrap();
    let vars = VariableTable::new().with_number(DEFAULT_SCENARIO, "gangue", 0.375);
    let blast_furnace = UnitProcess::new("blast furnace", table, vars);

    ProductChain::new(
        "ironmaking",
        vec![
            ChainLink::new(sinter_plant, "iron ore", "sinter"),
            ChainLink::new(blast_furnace, "sinter", "pig iron"),
        ],
    )
    .unwrap()
}

fn steelmaking() -> ProductChain {
    // the converter also draws lime in proportion to the steel made
    let raw = vec![
        RawRow::new("hot metal", "i", "slag__bof", "o", "ratio", "slag_rate"),
        RawRow::new("hot metal", "i", "crude steel", "o", "remainder", "slag_rate"),
        RawRow::new("crude steel", "o", "lime", "c", "ratio", "lime_rate"),
    ];
    let table = CalcTable::from_raw(&raw).unwrap();
    let vars = VariableTable::new()
        .with_number(DEFAULT_SCENARIO, "slag_rate", 0.04)
        .with_number(DEFAULT_SCENARIO, "lime_rate", 0.05);
    let bof = UnitProcess::new("basic oxygen furnace", table, vars);

    ProductChain::new(
        "steelmaking",
        vec![ChainLink::new(bof, "hot metal", "crude steel")],
    )
    .unwrap()
}

fn lime_burning() -> ProductChain {
    let raw = vec![
        RawRow::new("CaCO3", "i", "CaO", "o", "molmassratio", ""),
        RawRow::new("CaCO3", "i", "CO2__calcination", "e", "molmassratio", ""),
    ];
    let table = CalcTable::from_raw(&raw).unwrap();
    let kiln = UnitProcess::new("lime kiln", table, VariableTable::new());

    ProductChain::new("lime burning", vec![ChainLink::new(kiln, "CaCO3", "CaO")]).unwrap()
}

fn steelworks() -> Factory {
    let connections = vec![
        Connection::new(
            "steelmaking",
            Origin::Process("basic oxygen furnace".into()),
            "hot metal",
            Direction::Inflow,
            "ironmaking",
            Direction::Outflow,
        )
        .with_alias("pig iron"),
        Connection::new(
            "steelmaking",
            Origin::All,
            "lime",
            Direction::Inflow,
            "lime burning",
            Direction::Outflow,
        )
        .with_alias("CaO"),
    ];
    Factory::new(
        "integrated steelworks",
        vec![steelmaking(), ironmaking(), lime_burning()],
        "steelmaking",
        "crude steel",
        Direction::Outflow,
        connections,
    )
    .unwrap()
}

#[test]
fn balances_three_chains_from_one_steel_target() {
    let factory = steelworks();
    let props = StaticProperties::default();
    let energy = EnergyFlows::default();
    let lookup = LookupKeys::new();
    let ctx = BalanceContext::new(&props, &energy, &lookup);
    let tol = Tolerances::default();

    let result = factory.balance(552.0, DEFAULT_SCENARIO, &ctx).unwrap();

    // main chain first, supply chains in connection order
    let names: Vec<_> = result.chains.iter().map(|c| c.chain.as_str()).collect();
    assert_eq!(names, ["steelmaking", "ironmaking", "lime burning"]);

    let iron = result.chain("ironmaking").unwrap();
    let sinter_plant = iron.process("sinter plant").unwrap();
    assert_eq!(sinter_plant.inflows.get(&s("iron ore")), Some(1000.0));
    assert_eq!(sinter_plant.outflows.get(&s("moisture")), Some(80.0));
    assert_eq!(sinter_plant.outflows.get(&s("sinter")), Some(920.0));
    let blast_furnace = iron.process("blast furnace").unwrap();
    assert_eq!(blast_furnace.outflows.get(&s("slag")), Some(345.0));
    assert_eq!(blast_furnace.outflows.get(&s("pig iron")), Some(575.0));

    // lime demand comes out of the steel made, calcination out of the demand
    let lime = 552.0 * 0.05;
    let caco3 = lime * 100.087 / 56.077;
    let co2 = caco3 * 44.010 / 100.087;
    let kiln = result.chain("lime burning").unwrap();
    let cao_made = kiln.totals.outflows.get(&s("CaO")).unwrap();
    assert!(nearly_equal(cao_made, lime, tol));

    assert_eq!(result.intermediates.get(&s("hot metal")), Some(575.0));
    assert!(nearly_equal(
        result.intermediates.get(&s("lime")).unwrap(),
        lime,
        tol
    ));

    // every transferred product nets out of the site totals
    for name in ["hot metal", "pig iron", "lime", "CaO", "sinter"] {
        assert!(!result.totals.inflows.contains(&s(name)), "{name} kept");
        assert!(!result.totals.outflows.contains(&s(name)), "{name} kept");
    }
    assert_eq!(result.totals.inflows.get(&s("iron ore")), Some(1000.0));
    assert!(nearly_equal(
        result.totals.inflows.get(&s("CaCO3")).unwrap(),
        caco3,
        tol
    ));
    assert_eq!(result.totals.outflows.get(&s("moisture")), Some(80.0));
    assert_eq!(result.totals.outflows.get(&s("slag")), Some(345.0));
    assert_eq!(result.totals.outflows.get(&s("slag__bof")), Some(23.0));
    assert_eq!(result.totals.outflows.get(&s("crude steel")), Some(552.0));
    assert!(nearly_equal(
        result.totals.outflows.get(&s("CO2__calcination")).unwrap(),
        co2,
        tol
    ));

    // the converter table sends its lime mass nowhere, so the closure
    // entry for it stays visible in the site totals
    assert!(nearly_equal(
        result.totals.outflows.get(&s(UNKNOWN_MASS)).unwrap(),
        lime,
        tol
    ));
    assert!(nearly_equal(
        result.totals.inflows.total(),
        result.totals.outflows.total(),
        tol
    ));
}

#[test]
fn quantity_sweep_scales_the_whole_site() {
    let factory = steelworks();
    let props = StaticProperties::default();
    let energy = EnergyFlows::default();
    let lookup = LookupKeys::new();
    let ctx = BalanceContext::new(&props, &energy, &lookup);

    let outcome = sweep_quantities(&factory, &[276.0, 552.0], DEFAULT_SCENARIO, &ctx);

    assert_eq!(outcome.num_failed(), 0);
    let half = outcome.balances[0].as_ref().unwrap();
    assert_eq!(half.totals.inflows.get(&s("iron ore")), Some(500.0));
    assert_eq!(half.totals.outflows.get(&s("crude steel")), Some(276.0));
    let full = outcome.balances[1].as_ref().unwrap();
    assert_eq!(full.totals.inflows.get(&s("iron ore")), Some(1000.0));
    assert_eq!(full.totals.outflows.get(&s("crude steel")), Some(552.0));
}
