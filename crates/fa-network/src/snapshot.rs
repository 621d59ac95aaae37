//! Immutable network snapshots and the audit-facing traits.

use crate::accumulator::Accumulator;
use crate::error::{NetworkError, NetworkResult};
use crate::node::FluidNode;
use crate::species::Species;
use fa_core::ids::{AccumId, NodeId};

/// One storage element contributing to system totals.
///
/// The audit harness reads every element through this trait, so snapshots,
/// scenario states, and test fakes are interchangeable.
pub trait SubElement {
    /// Name for diagnostics.
    fn label(&self) -> &str;

    /// Fluid mass in kg (≥ 0).
    fn mass_kg(&self) -> f64;

    /// Specific enthalpy in J/kg.
    fn specific_enthalpy_j_per_kg(&self) -> f64;

    /// Mass fraction of one constituent, in [0, 1]; 0.0 when absent.
    ///
    /// Fractions of one element sum to 1 within numerical tolerance. Callers
    /// may rely on that but must not divide by the element's own mass; all
    /// derived totals are mass-weighted products.
    fn mass_fraction(&self, species: Species) -> f64;
}

/// Read-only view of system state at one simulated instant.
pub trait StateView {
    /// Simulated time this view was taken at, in seconds.
    fn time_s(&self) -> f64;

    /// Every element contributing to system totals.
    ///
    /// Finite; order is irrelevant for summation correctness.
    fn sub_elements(&self) -> Vec<&dyn SubElement>;
}

/// Concrete snapshot of a fluid network: nodes plus accumulators.
///
/// Boundary nodes are held (they are part of the network) but excluded from
/// `sub_elements`, so they never enter a total.
#[derive(Clone, Debug, Default)]
pub struct NetworkSnapshot {
    time_s: f64,
    nodes: Vec<FluidNode>,
    accumulators: Vec<Accumulator>,
}

impl NetworkSnapshot {
    pub fn new(time_s: f64) -> NetworkResult<Self> {
        if !time_s.is_finite() || time_s < 0.0 {
            return Err(NetworkError::InvalidArg {
                what: "snapshot time must be finite and non-negative",
            });
        }
        Ok(Self {
            time_s,
            nodes: Vec::new(),
            accumulators: Vec::new(),
        })
    }

    /// Add a node; returns its stable id within this snapshot.
    pub fn add_node(&mut self, node: FluidNode) -> NodeId {
        let id = NodeId::from_index(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Add an accumulator; returns its stable id within this snapshot.
    pub fn add_accumulator(&mut self, accum: Accumulator) -> AccumId {
        let id = AccumId::from_index(self.accumulators.len() as u32);
        self.accumulators.push(accum);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&FluidNode> {
        self.nodes.get(id.index() as usize)
    }

    pub fn accumulator(&self, id: AccumId) -> Option<&Accumulator> {
        self.accumulators.get(id.index() as usize)
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn num_accumulators(&self) -> usize {
        self.accumulators.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &FluidNode> {
        self.nodes.iter()
    }

    pub fn accumulators(&self) -> impl Iterator<Item = &Accumulator> {
        self.accumulators.iter()
    }
}

impl StateView for NetworkSnapshot {
    fn time_s(&self) -> f64 {
        self.time_s
    }

    fn sub_elements(&self) -> Vec<&dyn SubElement> {
        let mut elements: Vec<&dyn SubElement> = Vec::new();
        for node in &self.nodes {
            if !node.is_boundary {
                elements.push(node);
            }
        }
        for accum in &self.accumulators {
            elements.push(accum);
        }
        elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Composition;
    use crate::content::FluidContent;

    fn n2_content(m_kg: f64) -> FluidContent {
        FluidContent::new(m_kg, 3.0e5, Composition::pure(Species::N2)).unwrap()
    }

    #[test]
    fn snapshot_time_validation() {
        assert!(NetworkSnapshot::new(0.0).is_ok());
        assert!(NetworkSnapshot::new(-1.0).is_err());
        assert!(NetworkSnapshot::new(f64::NAN).is_err());
    }

    #[test]
    fn ids_address_elements() {
        let mut snap = NetworkSnapshot::new(0.0).unwrap();
        let a = snap.add_node(FluidNode::new("a", n2_content(1.0)));
        let b = snap.add_node(FluidNode::new("b", n2_content(2.0)));
        let acc = snap.add_accumulator(Accumulator::new("acc", n2_content(3.0)));

        assert_eq!(snap.node(a).unwrap().name, "a");
        assert_eq!(snap.node(b).unwrap().content.m_kg, 2.0);
        assert_eq!(snap.accumulator(acc).unwrap().name, "acc");
        assert_eq!(snap.num_nodes(), 2);
        assert_eq!(snap.num_accumulators(), 1);
    }

    #[test]
    fn boundary_node_excluded_from_sub_elements() {
        let mut snap = NetworkSnapshot::new(0.0).unwrap();
        snap.add_node(FluidNode::new("a", n2_content(1.0)));
        snap.add_node(FluidNode::boundary("vacuum", n2_content(99.0)));
        snap.add_accumulator(Accumulator::new("acc", n2_content(3.0)));

        let elements = snap.sub_elements();
        assert_eq!(elements.len(), 2);
        let labels: Vec<&str> = elements.iter().map(|e| e.label()).collect();
        assert_eq!(labels, vec!["a", "acc"]);
    }
}
