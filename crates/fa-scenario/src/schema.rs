//! Scenario schema definitions.

use fa_core::numeric::ToleranceBand;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const LATEST_VERSION: u32 = 1;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Scenario {
    pub version: u32,
    pub name: String,
    /// Constituent keys whose per-species mass totals are tracked, in
    /// addition to total mass and total enthalpy.
    pub species: Vec<String>,
    /// Default tolerance band for every quantity.
    #[serde(default)]
    pub tolerance: ToleranceBand,
    /// Per-quantity (or per-combined-check) band overrides.
    #[serde(default)]
    pub overrides: BTreeMap<String, ToleranceBand>,
    #[serde(default)]
    pub combined_checks: Vec<CombinedCheckDef>,
    pub checkpoints: Vec<CheckpointDef>,
    /// Recorded network state at each checkpoint time.
    pub states: Vec<StateDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CombinedCheckDef {
    pub name: String,
    pub terms: Vec<TermDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TermDef {
    pub quantity: String,
    #[serde(default = "default_coeff")]
    pub coeff: f64,
}

fn default_coeff() -> f64 {
    1.0
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckpointDef {
    pub name: String,
    pub time_s: f64,
    pub action: CheckpointActionDef,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum CheckpointActionDef {
    CaptureBaseline,
    Compare,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateDef {
    pub time_s: f64,
    #[serde(default)]
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub accumulators: Vec<AccumDef>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NodeDef {
    pub name: String,
    pub mass_kg: f64,
    pub enthalpy_j_per_kg: f64,
    /// Constituent key to mass fraction; fractions must sum to 1.
    pub composition: BTreeMap<String, f64>,
    /// Non-physical boundary node, excluded from totals.
    #[serde(default)]
    pub boundary: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AccumDef {
    pub name: String,
    pub mass_kg: f64,
    pub enthalpy_j_per_kg: f64,
    pub composition: BTreeMap<String, f64>,
}
