//! Bulk fluid state held by one storage element.

use crate::composition::Composition;
use crate::error::{NetworkError, NetworkResult};
use crate::species::Species;

/// Lumped fluid inventory: mass, specific enthalpy, and composition.
///
/// Both network nodes and accumulators store one of these. Values are plain
/// SI scalars with unit-suffixed names; no property backend is consulted.
#[derive(Clone, Debug)]
pub struct FluidContent {
    /// Mass in kg
    pub m_kg: f64,
    /// Specific enthalpy in J/kg
    pub h_j_per_kg: f64,
    /// Mass-fraction composition
    pub composition: Composition,
}

impl FluidContent {
    /// Create fluid content, validating physical plausibility.
    pub fn new(m_kg: f64, h_j_per_kg: f64, composition: Composition) -> NetworkResult<Self> {
        if !m_kg.is_finite() || m_kg < 0.0 {
            return Err(NetworkError::NonPhysical {
                what: "fluid mass must be finite and non-negative",
            });
        }
        if !h_j_per_kg.is_finite() {
            return Err(NetworkError::NonPhysical {
                what: "specific enthalpy must be finite",
            });
        }
        Ok(Self {
            m_kg,
            h_j_per_kg,
            composition,
        })
    }

    /// Empty inventory (zero mass) of the given composition.
    pub fn empty(composition: Composition) -> Self {
        Self {
            m_kg: 0.0,
            h_j_per_kg: 0.0,
            composition,
        }
    }

    /// Mass of one constituent in kg.
    pub fn species_mass_kg(&self, species: Species) -> f64 {
        self.m_kg * self.composition.mass_fraction(species)
    }

    /// Total enthalpy (mass × specific enthalpy) in J.
    pub fn enthalpy_j(&self) -> f64 {
        self.m_kg * self.h_j_per_kg
    }
}
