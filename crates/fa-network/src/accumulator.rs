//! Accumulator (reservoir) state.

use crate::content::FluidContent;
use crate::snapshot::SubElement;
use crate::species::Species;

/// A bellows-style reservoir holding fluid outside the node inventory.
///
/// Accumulators contribute to system totals alongside nodes but are not
/// network nodes themselves.
#[derive(Clone, Debug)]
pub struct Accumulator {
    /// Name for diagnostics
    pub name: String,
    /// Internal fluid inventory
    pub fluid: FluidContent,
}

impl Accumulator {
    pub fn new(name: impl Into<String>, fluid: FluidContent) -> Self {
        Self {
            name: name.into(),
            fluid,
        }
    }
}

impl SubElement for Accumulator {
    fn label(&self) -> &str {
        &self.name
    }

    fn mass_kg(&self) -> f64 {
        self.fluid.m_kg
    }

    fn specific_enthalpy_j_per_kg(&self) -> f64 {
        self.fluid.h_j_per_kg
    }

    fn mass_fraction(&self, species: Species) -> f64 {
        self.fluid.composition.mass_fraction(species)
    }
}
