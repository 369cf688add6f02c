//! Project schema definitions.
//!
//! The on-disk shape of a balancing setup: processes with their calculation
//! rows and scenario variables, chains, factories, property overrides and
//! the energy-flow / lookup-key sets. Everything optional defaults to empty
//! so small files stay small.

use std::collections::BTreeMap;

use mb_core::Real;
use serde::{Deserialize, Serialize};

/// Schema version written by this crate.
pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectDef {
    pub version: u32,
    pub name: String,
    #[serde(default)]
    pub properties: PropertySetDef,
    #[serde(default)]
    pub energy_flows: Vec<String>,
    #[serde(default)]
    pub lookup_keys: Vec<String>,
    #[serde(default)]
    pub processes: Vec<ProcessDef>,
    #[serde(default)]
    pub chains: Vec<ChainDef>,
    #[serde(default)]
    pub factories: Vec<FactoryDef>,
}

/// Extra property entries layered over the built-in catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct PropertySetDef {
    /// Molar masses [kg/kmol], keyed by substance name.
    #[serde(default)]
    pub molar_masses: BTreeMap<String, Real>,
    #[serde(default)]
    pub fuels: BTreeMap<String, FuelDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FuelDef {
    /// Higher heating value [MJ/kg].
    pub hhv: Real,
    /// CO2 emitted per unit burned [kg/kg].
    pub co2_factor: Real,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProcessDef {
    pub name: String,
    #[serde(default)]
    pub rows: Vec<RowDef>,
    #[serde(default)]
    pub scenarios: Vec<ScenarioDef>,
}

/// One calculation row, cells as written in the file.
///
/// Parsing and per-row validation happen when the process is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RowDef {
    pub known: String,
    pub known_dir: String,
    pub unknown: String,
    pub unknown_dir: String,
    pub calc: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variable: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_known: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub second_dir: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScenarioDef {
    pub name: String,
    #[serde(default)]
    pub variables: BTreeMap<String, VariableDef>,
}

/// A scenario variable: a bare number, or a substance name for variables
/// behind a lookup key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum VariableDef {
    Number(Real),
    Substance(String),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChainDef {
    pub name: String,
    #[serde(default)]
    pub links: Vec<LinkDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LinkDef {
    pub process: String,
    pub inflow: String,
    pub outflow: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FactoryDef {
    pub name: String,
    pub main_chain: String,
    pub main_product: String,
    pub main_direction: String,
    /// Chains belonging to this factory; empty means every chain in the
    /// project.
    #[serde(default)]
    pub chains: Vec<String>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionDef {
    pub origin_chain: String,
    /// Process to read the product at; absent means the chain totals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub origin_process: Option<String>,
    pub product: String,
    pub origin_direction: String,
    pub dest_chain: String,
    pub dest_direction: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}
