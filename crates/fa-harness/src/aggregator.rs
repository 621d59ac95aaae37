//! Pure aggregation of tracked totals over a state view.

use crate::error::{HarnessError, HarnessResult};
use crate::quantity::{Contribution, QuantityTotals, TrackedQuantity};
use fa_network::{Species, StateView};
use std::collections::BTreeSet;

/// Computes a fixed set of named totals by summing per-element contributions
/// across every sub-element of a view.
///
/// Aggregation is a pure read: it has no side effects, never mutates or
/// aliases the view, and produces a fresh map on every call.
#[derive(Debug, Clone)]
pub struct Aggregator {
    quantities: Vec<TrackedQuantity>,
}

impl Aggregator {
    /// Create an aggregator over the given quantities.
    ///
    /// Rejects an empty set and duplicate quantity names.
    pub fn new(quantities: Vec<TrackedQuantity>) -> HarnessResult<Self> {
        if quantities.is_empty() {
            return Err(HarnessError::Config {
                what: "aggregator needs at least one tracked quantity".into(),
            });
        }
        let mut seen = BTreeSet::new();
        for q in &quantities {
            if !seen.insert(q.name.as_str()) {
                return Err(HarnessError::Config {
                    what: format!("duplicate tracked quantity name: {}", q.name),
                });
            }
        }
        Ok(Self { quantities })
    }

    /// The conventional conservation set: total mass, total enthalpy, and
    /// per-species mass for each listed constituent.
    pub fn conservation_set(species: &[Species]) -> HarnessResult<Self> {
        let mut quantities = vec![
            TrackedQuantity::of(Contribution::Mass),
            TrackedQuantity::of(Contribution::Enthalpy),
        ];
        for s in species {
            quantities.push(TrackedQuantity::of(Contribution::SpeciesMass(*s)));
        }
        Self::new(quantities)
    }

    pub fn quantities(&self) -> &[TrackedQuantity] {
        &self.quantities
    }

    pub fn quantity_names(&self) -> impl Iterator<Item = &str> {
        self.quantities.iter().map(|q| q.name.as_str())
    }

    pub fn has_quantity(&self, name: &str) -> bool {
        self.quantities.iter().any(|q| q.name == name)
    }

    /// Sum every tracked quantity over all sub-elements of the view.
    pub fn aggregate(&self, view: &dyn StateView) -> QuantityTotals {
        let mut totals = QuantityTotals::new();
        for q in &self.quantities {
            totals.insert(q.name.clone(), 0.0);
        }
        for element in view.sub_elements() {
            for q in &self.quantities {
                let contribution = q.contribution.per_element(element);
                if let Some(total) = totals.get_mut(&q.name) {
                    *total += contribution;
                }
            }
        }
        totals
    }
}
