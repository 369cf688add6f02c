//! Property lookup trait.

use mb_core::Real;

use crate::error::PropertyResult;

/// Heating value and carbon factor for a combustible flow.
///
/// `hhv` is the higher heating value in MJ per unit mass, `co2_factor` the
/// mass of CO2 released per unit mass burned.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FuelProperties {
    pub hhv: Real,
    pub co2_factor: Real,
}

/// Source of substance property data.
///
/// Implementations must be thread-safe (Send + Sync) to support parallel
/// balancing. Lookups take the case-folded substance name; the qualifier part
/// of a key never reaches a property table.
pub trait PropertyOracle: Send + Sync {
    /// Molar mass [kg/kmol] for a substance.
    fn molar_mass(&self, substance: &str) -> PropertyResult<Real>;

    /// Heating value and CO2 factor for a fuel.
    fn fuel(&self, substance: &str) -> PropertyResult<FuelProperties>;

    /// Whether the substance has fuel data.
    fn is_fuel(&self, substance: &str) -> bool {
        self.fuel(substance).is_ok()
    }
}
