//! Network node state.

use crate::content::FluidContent;
use crate::snapshot::SubElement;
use crate::species::Species;

/// One fluid node of the network at a single instant.
///
/// A boundary node is the non-physical ground/ambient reference the solver
/// flows mass through; it participates in the network but is excluded from
/// system totals.
#[derive(Clone, Debug)]
pub struct FluidNode {
    /// Name for diagnostics
    pub name: String,
    /// Fluid inventory of the node
    pub content: FluidContent,
    /// Non-physical boundary reference, excluded from totals
    pub is_boundary: bool,
}

impl FluidNode {
    /// Create an interior (physical) node.
    pub fn new(name: impl Into<String>, content: FluidContent) -> Self {
        Self {
            name: name.into(),
            content,
            is_boundary: false,
        }
    }

    /// Create a boundary node.
    pub fn boundary(name: impl Into<String>, content: FluidContent) -> Self {
        Self {
            name: name.into(),
            content,
            is_boundary: true,
        }
    }
}

impl SubElement for FluidNode {
    fn label(&self) -> &str {
        &self.name
    }

    fn mass_kg(&self) -> f64 {
        self.content.m_kg
    }

    fn specific_enthalpy_j_per_kg(&self) -> f64 {
        self.content.h_j_per_kg
    }

    fn mass_fraction(&self, species: Species) -> f64 {
        self.content.composition.mass_fraction(species)
    }
}
