//! Compile a validated scenario into a runnable audit.

use crate::schema::{CheckpointActionDef, Scenario};
use crate::validate::{ValidationError, validate_scenario};
use crate::ScenarioResult;
use fa_harness::{
    Aggregator, CheckpointAction, CombinedCheck, ConservationAudit, HarnessError, HarnessResult,
    SimHost,
};
use fa_network::{Accumulator, Composition, FluidContent, FluidNode, NetworkSnapshot, Species};
use std::collections::BTreeMap;

/// A scenario ready to run: the configured audit plus its replay host.
pub struct CompiledScenario {
    pub audit: ConservationAudit,
    pub host: ScenarioHost,
}

/// Replays the scenario's recorded states as the hosting runtime.
///
/// `advance_to` hands back the state recorded at the requested instant;
/// asking for an unrecorded instant is a host error.
#[derive(Debug, Clone)]
pub struct ScenarioHost {
    states: Vec<(f64, NetworkSnapshot)>,
}

impl SimHost for ScenarioHost {
    type View = NetworkSnapshot;

    fn advance_to(&mut self, time_s: f64) -> HarnessResult<NetworkSnapshot> {
        self.states
            .iter()
            .find(|(t, _)| (t - time_s).abs() < 1e-9)
            .map(|(_, snap)| snap.clone())
            .ok_or_else(|| HarnessError::Host {
                message: format!("no recorded state at t={time_s}"),
            })
    }
}

/// Validate and compile a scenario.
pub fn compile_scenario(scenario: &Scenario) -> ScenarioResult<CompiledScenario> {
    validate_scenario(scenario)?;

    let mut species = Vec::with_capacity(scenario.species.len());
    for key in &scenario.species {
        let parsed: Species = key
            .parse()
            .map_err(|_| ValidationError::UnknownSpecies { key: key.clone() })?;
        species.push(parsed);
    }

    let aggregator = Aggregator::conservation_set(&species)?;
    let mut audit = ConservationAudit::new(scenario.name.clone(), aggregator, scenario.tolerance);

    for check in &scenario.combined_checks {
        audit.add_combined_check(CombinedCheck {
            name: check.name.clone(),
            terms: check
                .terms
                .iter()
                .map(|t| (t.quantity.clone(), t.coeff))
                .collect(),
        })?;
    }
    for (quantity, band) in &scenario.overrides {
        audit.set_band(quantity, *band)?;
    }
    for cp in &scenario.checkpoints {
        let action = match cp.action {
            CheckpointActionDef::CaptureBaseline => CheckpointAction::CaptureBaseline,
            CheckpointActionDef::Compare => CheckpointAction::Compare,
        };
        audit.register_checkpoint(cp.name.clone(), cp.time_s, action)?;
    }

    let mut states = Vec::with_capacity(scenario.states.len());
    for state in &scenario.states {
        let mut snap = NetworkSnapshot::new(state.time_s)?;
        for node in &state.nodes {
            let content = FluidContent::new(
                node.mass_kg,
                node.enthalpy_j_per_kg,
                composition_from(&node.composition)?,
            )?;
            let node = if node.boundary {
                FluidNode::boundary(node.name.clone(), content)
            } else {
                FluidNode::new(node.name.clone(), content)
            };
            snap.add_node(node);
        }
        for accum in &state.accumulators {
            let fluid = FluidContent::new(
                accum.mass_kg,
                accum.enthalpy_j_per_kg,
                composition_from(&accum.composition)?,
            )?;
            snap.add_accumulator(Accumulator::new(accum.name.clone(), fluid));
        }
        states.push((state.time_s, snap));
    }

    Ok(CompiledScenario {
        audit,
        host: ScenarioHost { states },
    })
}

fn composition_from(map: &BTreeMap<String, f64>) -> ScenarioResult<Composition> {
    let mut fractions = Vec::with_capacity(map.len());
    for (key, fraction) in map {
        let species: Species = key
            .parse()
            .map_err(|_| ValidationError::UnknownSpecies { key: key.clone() })?;
        fractions.push((species, *fraction));
    }
    Ok(Composition::new_mass_fractions(fractions)?)
}
