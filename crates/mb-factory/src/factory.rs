//! Multi-chain factories.
//!
//! A factory owns several product chains and a list of connections moving
//! one chain's product into another. Balancing runs the main chain on the
//! caller's target, then walks the connections in listed order, reading each
//! origin quantity out of the results produced so far and balancing the
//! destination chain on it. Chain totals are summed and every transfer is
//! netted out once per side, leaving the factory's boundary flows.

use std::collections::BTreeSet;
use std::fmt;

use tracing::debug;

use mb_chain::{ChainBalance, ChainError, ProductChain};
use mb_core::{Direction, FlowMap, Real, Substance};
use mb_process::{BalanceContext, BalancedFlows};

use crate::error::{FactoryError, FactoryResult};

/// Where a connection reads its quantity in the origin chain's result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Origin {
    /// The flows of one named process.
    Process(String),
    /// The origin chain's boundary totals.
    All,
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Process(name) => write!(f, "process '{name}'"),
            Origin::All => f.write_str("the chain totals"),
        }
    }
}

/// One cross-chain transfer.
///
/// The product quantity is read at the origin; the destination chain is then
/// balanced on it. `alias` is the destination chain's own name for the
/// product when the two chains spell it differently.
#[derive(Debug, Clone)]
pub struct Connection {
    pub origin_chain: String,
    pub origin: Origin,
    pub product: Substance,
    pub origin_dir: Direction,
    pub dest_chain: String,
    pub dest_dir: Direction,
    pub alias: Option<Substance>,
}

impl Connection {
    pub fn new(
        origin_chain: &str,
        origin: Origin,
        product: &str,
        origin_dir: Direction,
        dest_chain: &str,
        dest_dir: Direction,
    ) -> Self {
        Self {
            origin_chain: origin_chain.to_string(),
            origin,
            product: Substance::new(product),
            origin_dir,
            dest_chain: dest_chain.to_string(),
            dest_dir,
            alias: None,
        }
    }

    pub fn with_alias(mut self, alias: &str) -> Self {
        self.alias = Some(Substance::new(alias));
        self
    }

    /// The name the destination chain balances on.
    pub fn dest_substance(&self) -> &Substance {
        self.alias.as_ref().unwrap_or(&self.product)
    }
}

/// A named set of chains, one of them the main chain, plus connections.
#[derive(Debug, Clone)]
pub struct Factory {
    name: String,
    chains: Vec<ProductChain>,
    main_chain: String,
    main_product: Substance,
    main_dir: Direction,
    connections: Vec<Connection>,
}

/// Per-chain results in balancing order (main chain first), the factory
/// boundary totals, and the transferred intermediate products keyed by
/// product name.
#[derive(Debug, Clone, PartialEq)]
pub struct FactoryBalance {
    pub factory: String,
    pub chains: Vec<ChainBalance>,
    pub totals: BalancedFlows,
    pub intermediates: FlowMap,
}

impl FactoryBalance {
    pub fn chain(&self, name: &str) -> Option<&ChainBalance> {
        self.chains.iter().find(|c| c.chain == name)
    }
}

impl Factory {
    /// Build a factory, checking chain names, the main target, and every
    /// connection's references against the chains' declared flows.
    pub fn new(
        name: &str,
        chains: Vec<ProductChain>,
        main_chain: &str,
        main_product: &str,
        main_dir: Direction,
        connections: Vec<Connection>,
    ) -> FactoryResult<Self> {
        let mut seen = BTreeSet::new();
        for chain in &chains {
            if !seen.insert(chain.name().to_string()) {
                return Err(FactoryError::DuplicateChain {
                    factory: name.to_string(),
                    chain: chain.name().to_string(),
                });
            }
        }
        let main_product = Substance::new(main_product);
        let main = chains
            .iter()
            .find(|c| c.name() == main_chain)
            .ok_or_else(|| FactoryError::MainChainMissing {
                factory: name.to_string(),
                chain: main_chain.to_string(),
            })?;
        main.declares(&main_product, main_dir)?;

        for (index, conn) in connections.iter().enumerate() {
            let origin = chains
                .iter()
                .find(|c| c.name() == conn.origin_chain)
                .ok_or_else(|| FactoryError::UnknownChain {
                    factory: name.to_string(),
                    index,
                    chain: conn.origin_chain.clone(),
                })?;
            let dest = chains
                .iter()
                .find(|c| c.name() == conn.dest_chain)
                .ok_or_else(|| FactoryError::UnknownChain {
                    factory: name.to_string(),
                    index,
                    chain: conn.dest_chain.clone(),
                })?;
            if !conn.origin_dir.is_boundary() {
                return Err(ChainError::UnknownDestination {
                    direction: conn.origin_dir,
                }
                .into());
            }
            if let Origin::Process(process) = &conn.origin {
                if !origin.contains_process(process) {
                    return Err(FactoryError::ChainMismatch {
                        factory: name.to_string(),
                        chain: conn.origin_chain.clone(),
                        process: process.clone(),
                    });
                }
            }
            dest.declares(conn.dest_substance(), conn.dest_dir)?;
        }

        Ok(Self {
            name: name.to_string(),
            chains,
            main_chain: main_chain.to_string(),
            main_product,
            main_dir,
            connections,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn chains(&self) -> &[ProductChain] {
        &self.chains
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn main_chain(&self) -> &str {
        &self.main_chain
    }

    fn chain_named(&self, name: &str) -> Option<&ProductChain> {
        self.chains.iter().find(|c| c.name() == name)
    }

    /// Balance the whole factory from one main-product quantity.
    pub fn balance(
        &self,
        quantity: Real,
        scenario: &str,
        ctx: &BalanceContext<'_>,
    ) -> FactoryResult<FactoryBalance> {
        debug!(
            "factory '{}': balancing {} of '{}' under scenario '{}'",
            self.name, quantity, self.main_product, scenario
        );
        let main = self
            .chain_named(&self.main_chain)
            .ok_or_else(|| FactoryError::MainChainMissing {
                factory: self.name.clone(),
                chain: self.main_chain.clone(),
            })?;
        let mut chains =
            vec![main.balance(quantity, &self.main_product, self.main_dir, scenario, ctx)?];
        let mut intermediates = FlowMap::new();
        let mut transfers: Vec<Real> = Vec::with_capacity(self.connections.len());

        for (index, conn) in self.connections.iter().enumerate() {
            let qty = self.resolve_origin(index, conn, &chains)?;
            debug!(
                "factory '{}': connection {} moves {} '{}' from '{}' into '{}'",
                self.name, index, qty, conn.product, conn.origin_chain, conn.dest_chain
            );
            let dest = self.chain_named(&conn.dest_chain).ok_or_else(|| {
                FactoryError::UnknownChain {
                    factory: self.name.clone(),
                    index,
                    chain: conn.dest_chain.clone(),
                }
            })?;
            let partial = dest.balance(qty, conn.dest_substance(), conn.dest_dir, scenario, ctx)?;
            match chains.iter_mut().find(|c| c.chain == conn.dest_chain) {
                Some(existing) => existing.merge_add(&partial)?,
                None => chains.push(partial),
            }
            intermediates.add(conn.product.clone(), qty);
            transfers.push(qty);
        }

        let mut totals = BalancedFlows::default();
        for chain in &chains {
            totals.merge_add(&chain.totals);
        }
        let tol = ctx.options.tolerances;
        for (conn, qty) in self.connections.iter().zip(transfers) {
            if let Some(map) = totals.side_mut(conn.origin_dir) {
                map.cancel(&conn.product, qty, tol);
            }
            if let Some(map) = totals.side_mut(conn.dest_dir) {
                map.cancel(conn.dest_substance(), qty, tol);
            }
        }

        Ok(FactoryBalance {
            factory: self.name.clone(),
            chains,
            totals,
            intermediates,
        })
    }

    fn resolve_origin(
        &self,
        index: usize,
        conn: &Connection,
        chains: &[ChainBalance],
    ) -> FactoryResult<Real> {
        chains
            .iter()
            .find(|c| c.chain == conn.origin_chain)
            .and_then(|balanced| match &conn.origin {
                Origin::All => Some(&balanced.totals),
                Origin::Process(process) => balanced.process(process),
            })
            .and_then(|flows| flows.side(conn.origin_dir))
            .and_then(|map| map.get(&conn.product))
            .ok_or_else(|| FactoryError::ConnectionResolution {
                factory: self.name.clone(),
                index,
                product: conn.product.to_string(),
                origin: conn.origin.to_string(),
                chain: conn.origin_chain.clone(),
                direction: conn.origin_dir,
            })
    }
}
