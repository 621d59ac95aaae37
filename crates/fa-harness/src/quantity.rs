//! Tracked quantities and their per-element contributions.

use fa_network::{Species, SubElement};
use std::collections::BTreeMap;

/// Totals keyed by quantity name.
///
/// `BTreeMap` keeps iteration (and therefore reports) deterministically
/// ordered.
pub type QuantityTotals = BTreeMap<String, f64>;

/// Per-element contribution of a tracked quantity.
///
/// A fixed enumeration rather than string dispatch: every quantity a test
/// can track maps to one of these, configured at audit setup time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    /// Element mass in kg.
    Mass,
    /// Element mass × specific enthalpy, in J.
    Enthalpy,
    /// Element mass × mass fraction of one constituent, in kg.
    SpeciesMass(Species),
}

impl Contribution {
    /// Contribution of one element to this quantity's total.
    ///
    /// Every arm is a mass-weighted product, so a zero-mass element
    /// contributes exactly 0.0 regardless of its fraction values.
    pub fn per_element(&self, element: &dyn SubElement) -> f64 {
        match self {
            Contribution::Mass => element.mass_kg(),
            Contribution::Enthalpy => element.mass_kg() * element.specific_enthalpy_j_per_kg(),
            Contribution::SpeciesMass(species) => {
                element.mass_kg() * element.mass_fraction(*species)
            }
        }
    }

    /// Conventional name for this contribution.
    pub fn default_name(&self) -> String {
        match self {
            Contribution::Mass => "total_mass".to_string(),
            Contribution::Enthalpy => "total_enthalpy".to_string(),
            Contribution::SpeciesMass(species) => format!("total_mass_{}", species.key()),
        }
    }
}

/// A named scalar total, summed over all sub-elements of a view.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedQuantity {
    pub name: String,
    pub contribution: Contribution,
}

impl TrackedQuantity {
    pub fn new(name: impl Into<String>, contribution: Contribution) -> Self {
        Self {
            name: name.into(),
            contribution,
        }
    }

    /// Quantity with the conventional name for its contribution.
    pub fn of(contribution: Contribution) -> Self {
        Self {
            name: contribution.default_name(),
            contribution,
        }
    }
}
