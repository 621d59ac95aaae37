//! Scenario validation logic.

use crate::schema::{
    AccumDef, CheckpointActionDef, CombinedCheckDef, NodeDef, Scenario, StateDef,
};
use fa_core::numeric::{ToleranceBand, Tolerances, nearly_equal};
use fa_network::Species;
use std::collections::{BTreeMap, HashSet};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Duplicate ID: {id} in {context}")]
    DuplicateId { id: String, context: String },

    #[error("Missing reference: {id} in {context}")]
    MissingReference { id: String, context: String },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Unknown species: {key}")]
    UnknownSpecies { key: String },

    #[error("No {role} checkpoint registered")]
    MissingCheckpointRole { role: String },
}

/// Quantity names the scenario's conservation set produces: total mass,
/// total enthalpy, and one per-species mass per listed constituent.
pub fn quantity_names(species: &[Species]) -> Vec<String> {
    let mut names = vec!["total_mass".to_string(), "total_enthalpy".to_string()];
    for s in species {
        names.push(format!("total_mass_{}", s.key()));
    }
    names
}

pub fn validate_scenario(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.version > crate::schema::LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: scenario.version,
        });
    }
    if scenario.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".into(),
            value: scenario.name.clone(),
            reason: "must not be empty".into(),
        });
    }

    let species = parse_species(&scenario.species)?;
    let known = known_names(&species, &scenario.combined_checks);

    validate_tolerance("tolerance", &scenario.tolerance)?;
    for (name, band) in &scenario.overrides {
        if !known.contains(name.as_str()) {
            return Err(ValidationError::MissingReference {
                id: name.clone(),
                context: "tolerance overrides".into(),
            });
        }
        validate_tolerance(&format!("overrides.{name}"), band)?;
    }

    validate_combined_checks(&species, &scenario.combined_checks)?;
    validate_checkpoints(scenario)?;
    validate_states(scenario)?;
    Ok(())
}

fn parse_species(keys: &[String]) -> Result<Vec<Species>, ValidationError> {
    let mut species = Vec::with_capacity(keys.len());
    for key in keys {
        let parsed: Species = key
            .parse()
            .map_err(|_| ValidationError::UnknownSpecies { key: key.clone() })?;
        if species.contains(&parsed) {
            return Err(ValidationError::DuplicateId {
                id: key.clone(),
                context: "species".into(),
            });
        }
        species.push(parsed);
    }
    Ok(species)
}

fn known_names(species: &[Species], combined: &[CombinedCheckDef]) -> HashSet<String> {
    let mut names: HashSet<String> = quantity_names(species).into_iter().collect();
    names.extend(combined.iter().map(|c| c.name.clone()));
    names
}

fn validate_tolerance(field: &str, band: &ToleranceBand) -> Result<(), ValidationError> {
    for (value, part) in [(band.abs_floor, "abs_floor"), (band.rel_factor, "rel_factor")] {
        if !value.is_finite() || value < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("{field}.{part}"),
                value: value.to_string(),
                reason: "must be finite and non-negative".into(),
            });
        }
    }
    Ok(())
}

fn validate_combined_checks(
    species: &[Species],
    checks: &[CombinedCheckDef],
) -> Result<(), ValidationError> {
    let quantities: HashSet<String> = quantity_names(species).into_iter().collect();
    let mut names = HashSet::new();
    for check in checks {
        if quantities.contains(&check.name) || !names.insert(&check.name) {
            return Err(ValidationError::DuplicateId {
                id: check.name.clone(),
                context: "combined_checks".into(),
            });
        }
        if check.terms.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: format!("combined_checks.{}.terms", check.name),
                value: "[]".into(),
                reason: "must not be empty".into(),
            });
        }
        for term in &check.terms {
            if !quantities.contains(&term.quantity) {
                return Err(ValidationError::MissingReference {
                    id: term.quantity.clone(),
                    context: format!("combined check {}", check.name),
                });
            }
            if !term.coeff.is_finite() {
                return Err(ValidationError::InvalidValue {
                    field: format!("combined_checks.{}.coeff", check.name),
                    value: term.coeff.to_string(),
                    reason: "must be finite".into(),
                });
            }
        }
    }
    Ok(())
}

fn validate_checkpoints(scenario: &Scenario) -> Result<(), ValidationError> {
    if scenario.checkpoints.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "checkpoints".into(),
            value: "[]".into(),
            reason: "must not be empty".into(),
        });
    }
    let mut names = HashSet::new();
    let mut last_time = f64::NEG_INFINITY;
    let mut baselines = 0usize;
    let mut compares = 0usize;
    for cp in &scenario.checkpoints {
        if !names.insert(&cp.name) {
            return Err(ValidationError::DuplicateId {
                id: cp.name.clone(),
                context: "checkpoints".into(),
            });
        }
        if !cp.time_s.is_finite() || cp.time_s < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("checkpoints.{}.time_s", cp.name),
                value: cp.time_s.to_string(),
                reason: "must be finite and non-negative".into(),
            });
        }
        if cp.time_s < last_time {
            return Err(ValidationError::InvalidValue {
                field: format!("checkpoints.{}.time_s", cp.name),
                value: cp.time_s.to_string(),
                reason: "checkpoint times must be non-decreasing".into(),
            });
        }
        last_time = cp.time_s;
        match cp.action {
            CheckpointActionDef::CaptureBaseline => baselines += 1,
            CheckpointActionDef::Compare => compares += 1,
        }
    }
    if baselines == 0 {
        return Err(ValidationError::MissingCheckpointRole {
            role: "capture_baseline".into(),
        });
    }
    if compares == 0 {
        return Err(ValidationError::MissingCheckpointRole {
            role: "compare".into(),
        });
    }
    Ok(())
}

fn validate_states(scenario: &Scenario) -> Result<(), ValidationError> {
    let mut last_time = f64::NEG_INFINITY;
    for (i, state) in scenario.states.iter().enumerate() {
        if !state.time_s.is_finite() || state.time_s < 0.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("states[{i}].time_s"),
                value: state.time_s.to_string(),
                reason: "must be finite and non-negative".into(),
            });
        }
        if state.time_s <= last_time {
            return Err(ValidationError::InvalidValue {
                field: format!("states[{i}].time_s"),
                value: state.time_s.to_string(),
                reason: "state times must be strictly increasing".into(),
            });
        }
        last_time = state.time_s;
        validate_state(i, state)?;
    }

    // Every checkpoint needs a recorded state at its time.
    for cp in &scenario.checkpoints {
        let found = scenario
            .states
            .iter()
            .any(|s| (s.time_s - cp.time_s).abs() < 1e-9);
        if !found {
            return Err(ValidationError::MissingReference {
                id: format!("state at t={}", cp.time_s),
                context: format!("checkpoint {}", cp.name),
            });
        }
    }
    Ok(())
}

fn validate_state(index: usize, state: &StateDef) -> Result<(), ValidationError> {
    let mut names = HashSet::new();
    for node in &state.nodes {
        if !names.insert(&node.name) {
            return Err(ValidationError::DuplicateId {
                id: node.name.clone(),
                context: format!("states[{index}].nodes"),
            });
        }
        validate_node(index, node)?;
    }
    let mut accum_names = HashSet::new();
    for accum in &state.accumulators {
        if !accum_names.insert(&accum.name) {
            return Err(ValidationError::DuplicateId {
                id: accum.name.clone(),
                context: format!("states[{index}].accumulators"),
            });
        }
        validate_accum(index, accum)?;
    }
    Ok(())
}

fn validate_node(index: usize, node: &NodeDef) -> Result<(), ValidationError> {
    validate_element(
        &format!("states[{index}].nodes.{}", node.name),
        node.mass_kg,
        node.enthalpy_j_per_kg,
        &node.composition,
    )
}

fn validate_accum(index: usize, accum: &AccumDef) -> Result<(), ValidationError> {
    validate_element(
        &format!("states[{index}].accumulators.{}", accum.name),
        accum.mass_kg,
        accum.enthalpy_j_per_kg,
        &accum.composition,
    )
}

fn validate_element(
    field: &str,
    mass_kg: f64,
    enthalpy_j_per_kg: f64,
    composition: &BTreeMap<String, f64>,
) -> Result<(), ValidationError> {
    if !mass_kg.is_finite() || mass_kg < 0.0 {
        return Err(ValidationError::InvalidValue {
            field: format!("{field}.mass_kg"),
            value: mass_kg.to_string(),
            reason: "must be finite and non-negative".into(),
        });
    }
    if !enthalpy_j_per_kg.is_finite() {
        return Err(ValidationError::InvalidValue {
            field: format!("{field}.enthalpy_j_per_kg"),
            value: enthalpy_j_per_kg.to_string(),
            reason: "must be finite".into(),
        });
    }
    if composition.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: format!("{field}.composition"),
            value: "{}".into(),
            reason: "must not be empty".into(),
        });
    }
    let mut sum = 0.0;
    for (key, fraction) in composition {
        let _: Species = key
            .parse()
            .map_err(|_| ValidationError::UnknownSpecies { key: key.clone() })?;
        if !fraction.is_finite() || *fraction < 0.0 || *fraction > 1.0 {
            return Err(ValidationError::InvalidValue {
                field: format!("{field}.composition.{key}"),
                value: fraction.to_string(),
                reason: "mass fraction must be in [0, 1]".into(),
            });
        }
        sum += fraction;
    }
    let tol = Tolerances {
        abs: 1e-6,
        rel: 1e-6,
    };
    if !nearly_equal(sum, 1.0, tol) {
        return Err(ValidationError::InvalidValue {
            field: format!("{field}.composition"),
            value: sum.to_string(),
            reason: "mass fractions must sum to 1".into(),
        });
    }
    Ok(())
}
