//! Building runtime objects out of a validated project.
//!
//! A [`Project`] wraps a definition that passed validation and hands out
//! processes, chains and factories on demand. It implements the balancer's
//! source traits, so a project file is a drop-in table backend.

use mb_chain::{ChainLink, ProductChain};
use mb_factory::{Connection, Factory, Origin};
use mb_process::{
    LookupKeys, ProcessError, ProcessResult, ProcessSource, RawRow, TableSource, UnitProcess,
    VarValue, VariableTable,
};
use mb_props::{EnergyFlows, FuelProperties, StaticProperties};

use crate::schema::{ConnectionDef, ProcessDef, ProjectDef, RowDef, VariableDef};
use crate::validate::{parse_direction, validate_project};
use crate::{ProjectError, ProjectResult};

/// A validated project definition.
#[derive(Debug, Clone)]
pub struct Project {
    def: ProjectDef,
}

impl Project {
    pub fn new(def: ProjectDef) -> ProjectResult<Self> {
        validate_project(&def)?;
        Ok(Self { def })
    }

    pub fn def(&self) -> &ProjectDef {
        &self.def
    }

    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Built-in property tables plus this project's overrides.
    pub fn properties(&self) -> StaticProperties {
        let mut props = StaticProperties::default();
        for (name, mass) in &self.def.properties.molar_masses {
            props.insert_molar_mass(name, *mass);
        }
        for (name, fuel) in &self.def.properties.fuels {
            props.insert_fuel(
                name,
                FuelProperties {
                    hhv: fuel.hhv,
                    co2_factor: fuel.co2_factor,
                },
            );
        }
        props
    }

    /// Built-in energy carriers plus this project's additions.
    pub fn energy_flows(&self) -> EnergyFlows {
        let mut energy = EnergyFlows::default();
        for name in &self.def.energy_flows {
            energy.insert(name);
        }
        energy
    }

    pub fn lookup_keys(&self) -> LookupKeys {
        let mut keys = LookupKeys::new();
        for name in &self.def.lookup_keys {
            keys.insert(name);
        }
        keys
    }

    pub fn chain(&self, name: &str) -> ProjectResult<ProductChain> {
        let def = self
            .def
            .chains
            .iter()
            .find(|c| c.name == name)
            .ok_or_else(|| ProjectError::UnknownId {
                kind: "chain",
                name: name.to_string(),
            })?;
        let mut links = Vec::with_capacity(def.links.len());
        for link in &def.links {
            let process = self.unit_process(&link.process)?;
            links.push(ChainLink::new(process, &link.inflow, &link.outflow));
        }
        Ok(ProductChain::new(&def.name, links)?)
    }

    pub fn factory(&self, name: &str) -> ProjectResult<Factory> {
        let def = self
            .def
            .factories
            .iter()
            .find(|f| f.name == name)
            .ok_or_else(|| ProjectError::UnknownId {
                kind: "factory",
                name: name.to_string(),
            })?;
        let chain_names: Vec<&str> = if def.chains.is_empty() {
            self.def.chains.iter().map(|c| c.name.as_str()).collect()
        } else {
            def.chains.iter().map(String::as_str).collect()
        };
        let mut chains = Vec::with_capacity(chain_names.len());
        for chain_name in chain_names {
            chains.push(self.chain(chain_name)?);
        }
        let main_dir = parse_direction("main_direction", &def.main_direction)?;
        let mut connections = Vec::with_capacity(def.connections.len());
        for conn in &def.connections {
            connections.push(build_connection(conn)?);
        }
        Ok(Factory::new(
            &def.name,
            chains,
            &def.main_chain,
            &def.main_product,
            main_dir,
            connections,
        )?)
    }

    fn process_def(&self, name: &str) -> ProcessResult<&ProcessDef> {
        self.def
            .processes
            .iter()
            .find(|p| p.name == name)
            .ok_or_else(|| ProcessError::UnknownProcess {
                name: name.to_string(),
            })
    }
}

fn build_connection(def: &ConnectionDef) -> ProjectResult<Connection> {
    let origin = match &def.origin_process {
        Some(process) => Origin::Process(process.clone()),
        None => Origin::All,
    };
    let origin_dir = parse_direction("origin_direction", &def.origin_direction)?;
    let dest_dir = parse_direction("dest_direction", &def.dest_direction)?;
    let mut conn = Connection::new(
        &def.origin_chain,
        origin,
        &def.product,
        origin_dir,
        &def.dest_chain,
        dest_dir,
    );
    if let Some(alias) = &def.alias {
        conn = conn.with_alias(alias);
    }
    Ok(conn)
}

fn raw_row(def: &RowDef) -> RawRow {
    RawRow {
        known: def.known.clone(),
        known_dir: def.known_dir.clone(),
        unknown: def.unknown.clone(),
        unknown_dir: def.unknown_dir.clone(),
        calc: def.calc.clone(),
        variable: def.variable.clone(),
        second_known: def.second_known.clone(),
        second_dir: def.second_dir.clone(),
    }
}

impl TableSource for Project {
    fn calc_rows(&self, process: &str) -> ProcessResult<Vec<RawRow>> {
        Ok(self.process_def(process)?.rows.iter().map(raw_row).collect())
    }

    fn variables(&self, process: &str) -> ProcessResult<VariableTable> {
        let def = self.process_def(process)?;
        let mut table = VariableTable::new();
        for scenario in &def.scenarios {
            for (variable, value) in &scenario.variables {
                let value = match value {
                    VariableDef::Number(v) => VarValue::Number(*v),
                    VariableDef::Substance(name) => VarValue::Substance(name.clone()),
                };
                table.insert(&scenario.name, variable, value);
            }
        }
        Ok(table)
    }
}

impl ProcessSource for Project {
    fn unit_process(&self, name: &str) -> ProcessResult<UnitProcess> {
        UnitProcess::from_source(self, name)
    }
}
