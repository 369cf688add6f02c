//! Built-in property tables.
//!
//! Ships enough data for common metallurgical and cement balances; projects
//! extend or override entries through the builder methods.

use std::collections::BTreeMap;

use mb_core::Real;

use crate::error::{PropertyError, PropertyResult};
use crate::oracle::{FuelProperties, PropertyOracle};

/// Molar masses [kg/kmol], sourced from standard reference data (e.g., NIST).
const BUILTIN_MOLAR_MASSES: &[(&str, Real)] = &[
    ("air", 28.965),
    ("c", 12.011),
    ("caco3", 100.087),
    ("cao", 56.077),
    ("ch4", 16.043),
    ("co", 28.010),
    ("co2", 44.010),
    ("fe", 55.845),
    ("fe2o3", 159.688),
    ("fe3o4", 231.533),
    ("feo", 71.844),
    ("h2", 2.016),
    ("h2o", 18.015),
    ("mgco3", 84.314),
    ("mgo", 40.304),
    ("n2", 28.014),
    ("nh3", 17.031),
    ("o2", 31.999),
    ("sio2", 60.084),
    ("so2", 64.066),
];

/// Higher heating values [MJ/kg] and CO2 emission factors [kg/kg].
const BUILTIN_FUELS: &[(&str, FuelProperties)] = &[
    (
        "charcoal",
        FuelProperties {
            hhv: 29.6,
            co2_factor: 3.12,
        },
    ),
    (
        "coke",
        FuelProperties {
            hhv: 28.6,
            co2_factor: 3.19,
        },
    ),
    (
        "hard coal",
        FuelProperties {
            hhv: 27.2,
            co2_factor: 2.68,
        },
    ),
    (
        "heavy fuel oil",
        FuelProperties {
            hhv: 43.0,
            co2_factor: 3.15,
        },
    ),
    (
        "hydrogen",
        FuelProperties {
            hhv: 141.8,
            co2_factor: 0.0,
        },
    ),
    (
        "methane",
        FuelProperties {
            hhv: 55.5,
            co2_factor: 2.74,
        },
    ),
    (
        "natural gas",
        FuelProperties {
            hhv: 52.2,
            co2_factor: 2.69,
        },
    ),
];

/// In-memory property tables backed by the built-in data.
///
/// Keys are stored case-folded, so lookups and inserts accept any casing.
#[derive(Debug, Clone)]
pub struct StaticProperties {
    molar: BTreeMap<String, Real>,
    fuels: BTreeMap<String, FuelProperties>,
}

impl Default for StaticProperties {
    fn default() -> Self {
        let molar = BUILTIN_MOLAR_MASSES
            .iter()
            .map(|(name, m)| (name.to_string(), *m))
            .collect();
        let fuels = BUILTIN_FUELS
            .iter()
            .map(|(name, f)| (name.to_string(), *f))
            .collect();
        Self { molar, fuels }
    }
}

impl StaticProperties {
    /// Tables with no entries at all, for projects that define everything.
    pub fn empty() -> Self {
        Self {
            molar: BTreeMap::new(),
            fuels: BTreeMap::new(),
        }
    }

    pub fn insert_molar_mass(&mut self, substance: &str, kg_per_kmol: Real) {
        self.molar.insert(normalize(substance), kg_per_kmol);
    }

    pub fn insert_fuel(&mut self, substance: &str, fuel: FuelProperties) {
        self.fuels.insert(normalize(substance), fuel);
    }

    pub fn with_molar_mass(mut self, substance: &str, kg_per_kmol: Real) -> Self {
        self.insert_molar_mass(substance, kg_per_kmol);
        self
    }

    pub fn with_fuel(mut self, substance: &str, fuel: FuelProperties) -> Self {
        self.insert_fuel(substance, fuel);
        self
    }
}

fn normalize(substance: &str) -> String {
    substance.trim().to_lowercase()
}

impl PropertyOracle for StaticProperties {
    fn molar_mass(&self, substance: &str) -> PropertyResult<Real> {
        self.molar
            .get(&normalize(substance))
            .copied()
            .ok_or_else(|| PropertyError::NotFound {
                substance: substance.to_string(),
            })
    }

    fn fuel(&self, substance: &str) -> PropertyResult<FuelProperties> {
        self.fuels
            .get(&normalize(substance))
            .copied()
            .ok_or_else(|| PropertyError::NotFound {
                substance: substance.to_string(),
            })
    }
}
