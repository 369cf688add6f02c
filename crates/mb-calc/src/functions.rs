//! Pure evaluation of a single calculation row.
//!
//! Every function maps a known quantity to the unknown side's quantity.
//! Functions never touch balance state; combustion reports its CO2 and waste
//! heat as returned emissions and the caller accumulates them.

use mb_core::{ensure_finite, Real, Substance};
use mb_props::PropertyOracle;

use crate::error::{CalcError, CalcResult};
use crate::kind::CalcKind;

/// Emission name for combustion carbon dioxide.
pub const CO2: &str = "CO2";
/// Emission name for the unrecovered share of a fuel's heating value.
pub const WASTE_HEAT: &str = "waste heat";

/// One evaluation request.
pub struct CalcInput<'a> {
    /// Resolved quantity on the known side.
    pub known_qty: Real,
    /// Scenario variable value; zero when the kind takes none.
    pub variable: Real,
    pub known: &'a Substance,
    pub unknown: &'a Substance,
    /// Second known operand for two-input kinds.
    pub second: Option<(&'a Substance, Real)>,
    /// Set when the row resolved in reverse (unknown side was found first).
    pub invert: bool,
    pub props: &'a dyn PropertyOracle,
}

/// Result of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct CalcOutput {
    /// Quantity for the unknown side.
    pub value: Real,
    /// Side-channel quantities, accumulated into the emission map.
    pub emissions: Vec<(Substance, Real)>,
}

impl CalcOutput {
    fn plain(value: Real) -> Self {
        Self {
            value,
            emissions: Vec::new(),
        }
    }
}

/// Evaluate one calculation row.
///
/// Inputs must be non-negative; a negative intermediate that reaches another
/// row is unrecoverable and fails here rather than propagating silently.
pub fn evaluate(kind: CalcKind, input: &CalcInput<'_>) -> CalcResult<CalcOutput> {
    reject_negative(input.known_qty, input.known)?;
    if let Some((substance, qty)) = input.second {
        reject_negative(qty, substance)?;
    }
    let out = match kind {
        CalcKind::Ratio => ratio(input)?,
        CalcKind::Remainder => remainder(input)?,
        CalcKind::MolMassRatio => mol_mass_ratio(input)?,
        CalcKind::Combustion => combustion(input)?,
        CalcKind::Difference => difference(input)?,
        CalcKind::ReturnValue => CalcOutput::plain(input.known_qty),
    };
    ensure_finite(out.value, "calculation result")?;
    Ok(out)
}

fn reject_negative(qty: Real, substance: &Substance) -> CalcResult<()> {
    if qty < 0.0 {
        return Err(CalcError::NegativeQuantity {
            substance: substance.to_string(),
            value: qty,
        });
    }
    Ok(())
}

fn fraction(value: Real, what: &'static str) -> CalcResult<Real> {
    if !(0.0..=1.0).contains(&value) {
        return Err(CalcError::InvalidFraction { what, value });
    }
    Ok(value)
}

/// `unknown = known * variable`; inverted rows divide instead.
fn ratio(input: &CalcInput<'_>) -> CalcResult<CalcOutput> {
    if input.variable < 0.0 {
        return Err(CalcError::NegativeVariable {
            what: "ratio",
            value: input.variable,
        });
    }
    let value = if input.invert {
        input.known_qty / input.variable
    } else {
        input.known_qty * input.variable
    };
    Ok(CalcOutput::plain(value))
}

/// `unknown = known * (1 - variable)`.
fn remainder(input: &CalcInput<'_>) -> CalcResult<CalcOutput> {
    let f = fraction(input.variable, "remainder fraction")?;
    let value = if input.invert {
        input.known_qty / (1.0 - f)
    } else {
        input.known_qty * (1.0 - f)
    };
    Ok(CalcOutput::plain(value))
}

/// `unknown = known * M(unknown) / M(known)`.
///
/// Molar masses key on the case-folded name, so `CO2__offgas` still finds
/// the CO2 entry. Swapping a row swaps the masses with it, which is why the
/// invert flag plays no part here.
fn mol_mass_ratio(input: &CalcInput<'_>) -> CalcResult<CalcOutput> {
    let m_known = input.props.molar_mass(input.known.canonical())?;
    let m_unknown = input.props.molar_mass(input.unknown.canonical())?;
    Ok(CalcOutput::plain(input.known_qty * m_unknown / m_known))
}

/// Fuel/energy conversion.
///
/// Exactly one operand must carry fuel data. When the fuel quantity is known
/// the released energy is `fuel * HHV * efficiency`; when the energy demand
/// is known the required fuel is `energy / (HHV * efficiency)`. The burned
/// fuel also emits CO2 and the unrecovered share of its heating value. Fuel
/// data decides which way the conversion runs, not the invert flag.
fn combustion(input: &CalcInput<'_>) -> CalcResult<CalcOutput> {
    let eff = fraction(input.variable, "combustion efficiency")?;
    let known_fuel = input.props.fuel(input.known.canonical());
    let unknown_fuel = input.props.fuel(input.unknown.canonical());
    let (fuel, fuel_qty, value) = match (known_fuel, unknown_fuel) {
        (Ok(fuel), Err(_)) => {
            let energy = input.known_qty * fuel.hhv * eff;
            (fuel, input.known_qty, energy)
        }
        (Err(_), Ok(fuel)) => {
            let qty = input.known_qty / (fuel.hhv * eff);
            (fuel, qty, qty)
        }
        _ => {
            return Err(CalcError::FuelOperands {
                known: input.known.to_string(),
                unknown: input.unknown.to_string(),
            });
        }
    };
    ensure_finite(fuel_qty, "combustion fuel quantity")?;
    let emissions = vec![
        (Substance::new(CO2), fuel_qty * fuel.co2_factor),
        (Substance::new(WASTE_HEAT), fuel_qty * fuel.hhv * (1.0 - eff)),
    ];
    Ok(CalcOutput { value, emissions })
}

/// `unknown = known - second`; inverted rows add instead.
fn difference(input: &CalcInput<'_>) -> CalcResult<CalcOutput> {
    let (_, second_qty) = input.second.ok_or(CalcError::MissingSecond)?;
    let value = if input.invert {
        input.known_qty + second_qty
    } else {
        input.known_qty - second_qty
    };
    Ok(CalcOutput::plain(value))
}
