//! mb-props: substance property data for massbal.
//!
//! Contains:
//! - oracle (property lookup trait + fuel data types)
//! - catalog (built-in static property tables, user-extendable)
//! - energy (classification of energy carrier flows)
//! - error (property lookup errors)

pub mod catalog;
pub mod energy;
pub mod error;
pub mod oracle;

pub use catalog::StaticProperties;
pub use energy::EnergyFlows;
pub use error::{PropertyError, PropertyResult};
pub use oracle::{FuelProperties, PropertyOracle};
