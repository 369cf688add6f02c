//! Structural validation of project definitions.
//!
//! Checks ids, references and schema-level values before any runtime object
//! is built. Per-row cell parsing is left to the process builder, which
//! reports row indexes with its errors.

use std::collections::HashSet;

use mb_core::{Direction, UnknownDirection};
use thiserror::Error;

use crate::schema::{FactoryDef, LATEST_VERSION, ProcessDef, ProjectDef};

#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Unsupported schema version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Duplicate id '{id}' in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference '{id}' in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub fn validate_project(def: &ProjectDef) -> Result<(), ValidationError> {
    if def.version != LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: def.version,
        });
    }

    validate_properties(def)?;

    let mut process_names = HashSet::new();
    for process in &def.processes {
        if process.name.trim().is_empty() {
            return Err(blank_name("process name"));
        }
        if !process_names.insert(process.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: process.name.clone(),
                context: "processes".to_string(),
            });
        }
        validate_process(process)?;
    }

    let mut chain_names = HashSet::new();
    for chain in &def.chains {
        if chain.name.trim().is_empty() {
            return Err(blank_name("chain name"));
        }
        if !chain_names.insert(chain.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: chain.name.clone(),
                context: "chains".to_string(),
            });
        }
        for link in &chain.links {
            if !process_names.contains(link.process.as_str()) {
                return Err(ValidationError::MissingReference {
                    id: link.process.clone(),
                    context: format!("chain '{}' links", chain.name),
                });
            }
        }
    }

    let mut factory_names = HashSet::new();
    for factory in &def.factories {
        if factory.name.trim().is_empty() {
            return Err(blank_name("factory name"));
        }
        if !factory_names.insert(factory.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: factory.name.clone(),
                context: "factories".to_string(),
            });
        }
        validate_factory(factory, &chain_names, def)?;
    }

    Ok(())
}

fn validate_properties(def: &ProjectDef) -> Result<(), ValidationError> {
    for (name, mass) in &def.properties.molar_masses {
        if !mass.is_finite() || *mass <= 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("molar mass '{name}'"),
                value: mass.to_string(),
                reason: "must be a positive number".to_string(),
            });
        }
    }
    for (name, fuel) in &def.properties.fuels {
        if !fuel.hhv.is_finite() || fuel.hhv < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("fuel '{name}' hhv"),
                value: fuel.hhv.to_string(),
                reason: "must be a non-negative number".to_string(),
            });
        }
        if !fuel.co2_factor.is_finite() || fuel.co2_factor < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("fuel '{name}' co2_factor"),
                value: fuel.co2_factor.to_string(),
                reason: "must be a non-negative number".to_string(),
            });
        }
    }
    Ok(())
}

fn validate_process(process: &ProcessDef) -> Result<(), ValidationError> {
    let mut scenario_names = HashSet::new();
    for scenario in &process.scenarios {
        if !scenario_names.insert(scenario.name.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: scenario.name.clone(),
                context: format!("process '{}' scenarios", process.name),
            });
        }
    }
    Ok(())
}

fn validate_factory(
    factory: &FactoryDef,
    chain_names: &HashSet<&str>,
    def: &ProjectDef,
) -> Result<(), ValidationError> {
    let context = format!("factory '{}'", factory.name);
    if !chain_names.contains(factory.main_chain.as_str()) {
        return Err(ValidationError::MissingReference {
            id: factory.main_chain.clone(),
            context: format!("{context} main chain"),
        });
    }
    parse_direction(&format!("{context} main_direction"), &factory.main_direction)?;

    for name in &factory.chains {
        if !chain_names.contains(name.as_str()) {
            return Err(ValidationError::MissingReference {
                id: name.clone(),
                context: format!("{context} chains"),
            });
        }
    }
    let scoped: Option<HashSet<&str>> = if factory.chains.is_empty() {
        None
    } else {
        Some(factory.chains.iter().map(String::as_str).collect())
    };
    if let Some(scoped) = &scoped {
        if !scoped.contains(factory.main_chain.as_str()) {
            return Err(ValidationError::InvalidValue {
                field: format!("{context} main_chain"),
                value: factory.main_chain.clone(),
                reason: "not among the factory's chains".to_string(),
            });
        }
    }

    for (index, conn) in factory.connections.iter().enumerate() {
        let conn_context = format!("{context} connection {index}");
        for name in [&conn.origin_chain, &conn.dest_chain] {
            let known = chain_names.contains(name.as_str())
                && scoped.as_ref().is_none_or(|s| s.contains(name.as_str()));
            if !known {
                return Err(ValidationError::MissingReference {
                    id: name.clone(),
                    context: conn_context.clone(),
                });
            }
        }
        if let Some(process) = &conn.origin_process {
            let declared = def
                .chains
                .iter()
                .find(|c| c.name == conn.origin_chain)
                .map(|c| c.links.iter().any(|l| l.process == *process))
                .unwrap_or(false);
            if !declared {
                return Err(ValidationError::MissingReference {
                    id: process.clone(),
                    context: format!("{conn_context} origin process"),
                });
            }
        }
        parse_direction(
            &format!("{conn_context} origin_direction"),
            &conn.origin_direction,
        )?;
        parse_direction(
            &format!("{conn_context} dest_direction"),
            &conn.dest_direction,
        )?;
    }

    Ok(())
}

/// Shared by validation and the factory builder, so both report direction
/// cells the same way.
pub(crate) fn parse_direction(field: &str, value: &str) -> Result<Direction, ValidationError> {
    value
        .parse()
        .map_err(|e: UnknownDirection| ValidationError::InvalidValue {
            field: field.to_string(),
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn blank_name(field: &str) -> ValidationError {
    ValidationError::InvalidValue {
        field: field.to_string(),
        value: String::new(),
        reason: "must not be blank".to_string(),
    }
}
