use super::report::{BattleReport, Tally};
use crate::config::{Rules, ScenarioConfig};
use crate::engagement::{run_trial, CombatEvent, EventSink, NullSink, TrialOutcome};
use crate::error::{ConfigurationError, InvariantViolation, SimError};
use mech_core::{UnitDefinition, UnitRegistry};
use rand::rngs::OsRng;
use rand::{RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use std::time::Instant;
use tracing::info;

/// Repeats an engagement between two units and aggregates the outcomes
///
/// Trial `i` draws from a ChaCha8 stream `i` under the batch seed, so every
/// trial is reproducible on its own and parallel runs match sequential ones.
#[derive(Debug, Clone)]
pub struct MonteCarloRunner {
    unit_a: UnitDefinition,
    unit_b: UnitDefinition,
    rules: Rules,
    scenario: ScenarioConfig,
}

impl MonteCarloRunner {
    /// Validate every input before any trial runs
    pub fn new(
        unit_a: UnitDefinition,
        unit_b: UnitDefinition,
        rules: Rules,
        scenario: ScenarioConfig,
    ) -> Result<Self, ConfigurationError> {
        for unit in [&unit_a, &unit_b] {
            unit.validate()
                .map_err(|source| ConfigurationError::Definition {
                    unit: unit.name.clone(),
                    source,
                })?;
        }
        rules.validate()?;
        scenario.validate()?;

        Ok(MonteCarloRunner {
            unit_a,
            unit_b,
            rules,
            scenario,
        })
    }

    /// Look both units up by name
    pub fn from_registry(
        registry: &UnitRegistry,
        unit_a: &str,
        unit_b: &str,
        rules: Rules,
        scenario: ScenarioConfig,
    ) -> Result<Self, ConfigurationError> {
        let a = registry.require(unit_a)?.clone();
        let b = registry.require(unit_b)?.clone();
        Self::new(a, b, rules, scenario)
    }

    pub fn scenario(&self) -> &ScenarioConfig {
        &self.scenario
    }

    /// Run the batch
    ///
    /// The first trial always runs. The time budget, if any, is checked
    /// before each later trial.
    pub fn run(&self) -> Result<BattleReport, SimError> {
        let seed = match self.scenario.seed {
            Some(seed) => seed,
            None => entropy_seed()?,
        };
        let fights = self.scenario.fights;

        info!(
            unit_a = %self.unit_a.name,
            unit_b = %self.unit_b.name,
            fights,
            seed,
            parallel = self.scenario.parallel,
            "starting battle simulation"
        );

        let start = Instant::now();
        let budget = self.scenario.time_budget();
        let out_of_time = || budget.is_some_and(|limit| start.elapsed() >= limit);

        let mut tally = Tally::default();
        let debug_log = if self.scenario.debug {
            let mut log: Vec<CombatEvent> = Vec::new();
            tally.add(&self.trial(seed, 0, &mut log)?);
            Some(log)
        } else {
            tally.add(&self.trial(seed, 0, &mut NullSink)?);
            None
        };

        if self.scenario.parallel {
            let outcomes: Vec<Option<TrialOutcome>> = (1..fights)
                .into_par_iter()
                .map(|i| {
                    if out_of_time() {
                        return Ok(None);
                    }
                    self.trial(seed, i, &mut NullSink).map(Some)
                })
                .collect::<Result<_, InvariantViolation>>()?;
            for outcome in outcomes.iter().flatten() {
                tally.add(outcome);
            }
        } else {
            for i in 1..fights {
                if out_of_time() {
                    break;
                }
                tally.add(&self.trial(seed, i, &mut NullSink)?);
            }
        }

        let completed = tally.trials == fights;
        let report = BattleReport::from_tally(
            &self.unit_a.name,
            &self.unit_b.name,
            &tally,
            seed,
            completed,
            debug_log,
        );

        info!(
            unit_a_wins = report.unit_a_wins,
            unit_b_wins = report.unit_b_wins,
            draws = report.draws,
            trials = report.total_trials,
            completed,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "battle simulation finished"
        );

        Ok(report)
    }

    fn trial<S: EventSink + ?Sized>(
        &self,
        seed: u64,
        index: u32,
        sink: &mut S,
    ) -> Result<TrialOutcome, InvariantViolation> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(index as u64);
        run_trial(
            &self.unit_a,
            &self.unit_b,
            &self.scenario,
            &self.rules,
            &mut rng,
            sink,
        )
    }
}

pub(super) fn entropy_seed() -> Result<u64, rand::Error> {
    let mut bytes = [0u8; 8];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(u64::from_le_bytes(bytes))
}
