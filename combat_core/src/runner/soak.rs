use super::monte_carlo::entropy_seed;
use crate::config::{DamageProfile, SoakConfig};
use crate::error::{ConfigurationError, InvariantViolation, SimError};
use crate::unit::{CriticalEffect, DestructionCause, UnitState};
use mech_core::UnitDefinition;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::Serialize;
use std::time::Instant;
use tables_core::{Location, TableSet};
use tracing::{debug, info};

/// What finished a unit off during a soak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeathCause {
    CenterTorsoCored,
    HeadDestroyed,
    /// The killing hit set off ammunition
    AmmoExplosion,
    EngineLostWithTorso,
    EngineCritical,
    Cockpit,
    StructureExhausted,
}

impl DeathCause {
    /// An explosion on the killing hit outranks the location it destroyed
    pub fn classify(cause: DestructionCause, killing_hit: &[CriticalEffect]) -> Self {
        let exploded = killing_hit
            .iter()
            .any(|effect| matches!(effect, CriticalEffect::AmmoExplosion { .. }));
        if exploded {
            return DeathCause::AmmoExplosion;
        }
        match cause {
            DestructionCause::VitalLocation(Location::Head) => DeathCause::HeadDestroyed,
            DestructionCause::VitalLocation(_) => DeathCause::CenterTorsoCored,
            DestructionCause::EngineLostWithTorso => DeathCause::EngineLostWithTorso,
            DestructionCause::EngineCritical => DeathCause::EngineCritical,
            DestructionCause::Cockpit => DeathCause::Cockpit,
            DestructionCause::StructureExhausted => DeathCause::StructureExhausted,
        }
    }
}

/// Histogram of death causes across a profile's iterations
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DeathCauses {
    pub center_torso_cored: u32,
    pub head_destroyed: u32,
    pub ammo_explosion: u32,
    pub engine_lost_with_torso: u32,
    pub engine_critical: u32,
    pub cockpit: u32,
    pub structure_exhausted: u32,
}

impl DeathCauses {
    fn slot(&mut self, cause: DeathCause) -> &mut u32 {
        match cause {
            DeathCause::CenterTorsoCored => &mut self.center_torso_cored,
            DeathCause::HeadDestroyed => &mut self.head_destroyed,
            DeathCause::AmmoExplosion => &mut self.ammo_explosion,
            DeathCause::EngineLostWithTorso => &mut self.engine_lost_with_torso,
            DeathCause::EngineCritical => &mut self.engine_critical,
            DeathCause::Cockpit => &mut self.cockpit,
            DeathCause::StructureExhausted => &mut self.structure_exhausted,
        }
    }

    pub fn record(&mut self, cause: DeathCause) {
        *self.slot(cause) += 1;
    }

    pub fn count(&self, cause: DeathCause) -> u32 {
        match cause {
            DeathCause::CenterTorsoCored => self.center_torso_cored,
            DeathCause::HeadDestroyed => self.head_destroyed,
            DeathCause::AmmoExplosion => self.ammo_explosion,
            DeathCause::EngineLostWithTorso => self.engine_lost_with_torso,
            DeathCause::EngineCritical => self.engine_critical,
            DeathCause::Cockpit => self.cockpit,
            DeathCause::StructureExhausted => self.structure_exhausted,
        }
    }

    pub fn total(&self) -> u32 {
        self.center_torso_cored
            + self.head_destroyed
            + self.ammo_explosion
            + self.engine_lost_with_torso
            + self.engine_critical
            + self.cockpit
            + self.structure_exhausted
    }

    /// Fraction of recorded deaths with this cause, 0 when none were recorded
    pub fn share(&self, cause: DeathCause) -> f64 {
        match self.total() {
            0 => 0.0,
            total => self.count(cause) as f64 / total as f64,
        }
    }
}

/// Damage absorbed under one profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProfileReport {
    pub profile: DamageProfile,
    pub iterations: u32,
    /// Damage dealt up to and including the killing hit
    pub mean_damage: f64,
    pub min_damage: u32,
    pub max_damage: u32,
    /// Sample standard deviation
    pub std_dev: f64,
    /// Mean damage over the unit's armor plus structure
    pub efficiency: f64,
    /// Iterations that reached the damage cap with the unit still standing
    pub capped: u32,
    pub death_causes: DeathCauses,
}

impl ProfileReport {
    fn from_runs(profile: DamageProfile, runs: &[SoakRun], max_points: u32) -> Self {
        let mut death_causes = DeathCauses::default();
        let mut capped = 0;
        for run in runs {
            match run.cause {
                Some(cause) => death_causes.record(cause),
                None => capped += 1,
            }
        }

        let n = runs.len() as f64;
        let total: u64 = runs.iter().map(|run| run.damage as u64).sum();
        let mean_damage = if runs.is_empty() { 0.0 } else { total as f64 / n };
        let std_dev = if runs.len() < 2 {
            0.0
        } else {
            let variance = runs
                .iter()
                .map(|run| (run.damage as f64 - mean_damage).powi(2))
                .sum::<f64>()
                / (n - 1.0);
            variance.sqrt()
        };
        let efficiency = if max_points == 0 {
            0.0
        } else {
            mean_damage / max_points as f64
        };

        ProfileReport {
            profile,
            iterations: runs.len() as u32,
            mean_damage,
            min_damage: runs.iter().map(|run| run.damage).min().unwrap_or(0),
            max_damage: runs.iter().map(|run| run.damage).max().unwrap_or(0),
            std_dev,
            efficiency,
            capped,
            death_causes,
        }
    }
}

/// Durability of one unit across every requested profile
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SoakReport {
    pub unit: String,
    pub max_points: u32,
    pub total_armor: u32,
    pub total_structure: u32,
    pub auto_case: bool,
    pub seed: u64,
    pub profiles: Vec<ProfileReport>,
}

impl SoakReport {
    pub fn profile(&self, profile: DamageProfile) -> Option<&ProfileReport> {
        self.profiles.iter().find(|report| report.profile == profile)
    }
}

#[derive(Debug, Clone, Copy)]
struct SoakRun {
    damage: u32,
    /// `None` when the damage cap was reached first
    cause: Option<DeathCause>,
}

/// Pours standardized damage into fresh copies of a unit until it dies
///
/// Iteration `i` of the `p`-th profile draws from ChaCha8 stream
/// `(p << 32) | i` under the run seed.
#[derive(Debug, Clone)]
pub struct SoakRunner {
    unit: UnitDefinition,
    tables: TableSet,
    config: SoakConfig,
}

impl SoakRunner {
    pub fn new(
        unit: UnitDefinition,
        tables: TableSet,
        config: SoakConfig,
    ) -> Result<Self, ConfigurationError> {
        unit.validate()
            .map_err(|source| ConfigurationError::Definition {
                unit: unit.name.clone(),
                source,
            })?;
        config.validate()?;

        let mut unit = unit;
        if config.auto_case {
            for location in &mut unit.locations {
                location.case = true;
            }
        }

        Ok(SoakRunner { unit, tables, config })
    }

    pub fn run(&self) -> Result<SoakReport, SimError> {
        let seed = match self.config.seed {
            Some(seed) => seed,
            None => entropy_seed()?,
        };
        let pristine = UnitState::new(&self.unit);
        let max_points = pristine.remaining_points();

        info!(
            unit = %self.unit.name,
            iterations = self.config.iterations,
            profiles = self.config.profiles.len(),
            seed,
            "starting soak"
        );
        let start = Instant::now();

        let mut profiles = Vec::with_capacity(self.config.profiles.len());
        for (p, &profile) in self.config.profiles.iter().enumerate() {
            let stream = |i: u32| ((p as u64) << 32) | i as u64;
            let runs: Vec<SoakRun> = if self.config.parallel {
                (0..self.config.iterations)
                    .into_par_iter()
                    .map(|i| self.soak(profile, seed, stream(i)))
                    .collect::<Result<_, InvariantViolation>>()?
            } else {
                (0..self.config.iterations)
                    .map(|i| self.soak(profile, seed, stream(i)))
                    .collect::<Result<_, InvariantViolation>>()?
            };

            let report = ProfileReport::from_runs(profile, &runs, max_points);
            debug!(
                ?profile,
                mean_damage = report.mean_damage,
                capped = report.capped,
                "profile finished"
            );
            profiles.push(report);
        }

        info!(
            unit = %self.unit.name,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "soak finished"
        );

        Ok(SoakReport {
            unit: self.unit.name.clone(),
            max_points,
            total_armor: pristine.total_armor(),
            total_structure: pristine.total_structure(),
            auto_case: self.config.auto_case,
            seed,
            profiles,
        })
    }

    fn soak(&self, profile: DamageProfile, seed: u64, stream: u64) -> Result<SoakRun, InvariantViolation> {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        rng.set_stream(stream);

        let mut unit = UnitState::new(&self.unit);
        if self.config.halve_ammo {
            for weapon in &mut unit.weapons {
                if let Some(ammo) = weapon.ammo.as_mut() {
                    *ammo /= 2;
                }
            }
        }

        let mut dealt = 0;
        while dealt < self.config.damage_cap {
            let concentrated = match profile {
                DamageProfile::Concentrated => true,
                DamageProfile::Cluster => false,
                DamageProfile::Mixed => rng.gen_bool(0.5),
            };
            let amount = if concentrated {
                rng.gen_range(self.config.concentrated_range())
            } else {
                self.config.cluster_damage
            };
            let location = self.tables.hit_location.lookup(self.config.facing, rng.gen());
            let hit = unit.apply_damage(
                location,
                amount,
                self.config.facing,
                &self.tables.critical,
                &mut rng,
            )?;
            dealt += amount;

            if let Some(cause) = unit.destroyed {
                return Ok(SoakRun {
                    damage: dealt,
                    cause: Some(DeathCause::classify(cause, &hit.criticals)),
                });
            }
        }

        Ok(SoakRun { damage: dealt, cause: None })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mech_core::{Component, DefinitionError, LocationDefinition, WeaponInstance};

    fn torso_only() -> UnitDefinition {
        UnitDefinition::new("Block", 50)
            .with_location(LocationDefinition::new(Location::CenterTorso, 20, 16))
            .with_weapon(
                WeaponInstance::new("Medium Laser", 5, 3, [0, 3, 6, 9]),
                Location::CenterTorso,
            )
    }

    fn config(profiles: Vec<DamageProfile>) -> SoakConfig {
        SoakConfig {
            iterations: 40,
            profiles,
            ..SoakConfig::default()
        }
        .with_seed(11)
    }

    #[test]
    fn test_cluster_hits_core_single_torso_exactly() {
        let runner = SoakRunner::new(torso_only(), TableSet::new(), config(vec![DamageProfile::Cluster]))
            .unwrap();
        let report = runner.run().unwrap();
        let cluster = report.profile(DamageProfile::Cluster).unwrap();

        // Every hit lands on the only location: 36 points in 2-point hits
        assert_eq!(report.max_points, 36);
        assert_eq!(cluster.min_damage, 36);
        assert_eq!(cluster.max_damage, 36);
        assert_eq!(cluster.std_dev, 0.0);
        assert!((cluster.efficiency - 1.0).abs() < 1e-9);
        assert_eq!(cluster.death_causes.center_torso_cored, 40);
        assert_eq!(cluster.death_causes.share(DeathCause::CenterTorsoCored), 1.0);
    }

    #[test]
    fn test_concentrated_overkill_bounded_by_largest_hit() {
        let runner = SoakRunner::new(
            torso_only(),
            TableSet::new(),
            config(vec![DamageProfile::Concentrated]),
        )
        .unwrap();
        let report = runner.run().unwrap();
        let concentrated = &report.profiles[0];

        assert!(concentrated.min_damage >= 36);
        assert!(concentrated.max_damage < 36 + 15);
        assert!(concentrated.efficiency >= 1.0);
    }

    #[test]
    fn test_every_iteration_dies_or_caps() {
        // No single hit can carry 10 damage into 36 points of torso
        let heavy = torso_only().with_location(LocationDefinition::new(Location::LeftTorso, 30, 20));
        let capped = SoakConfig {
            damage_cap: 10,
            ..config(DamageProfile::all())
        };
        let report = SoakRunner::new(heavy.clone(), TableSet::new(), capped).unwrap().run().unwrap();
        for profile in &report.profiles {
            assert_eq!(profile.capped, 40);
            assert_eq!(profile.death_causes.total(), 0);
        }

        let headed = heavy.with_location(LocationDefinition::new(Location::Head, 9, 3));
        let report = SoakRunner::new(headed, TableSet::new(), config(DamageProfile::all()))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(report.profiles.len(), 3);
        for profile in &report.profiles {
            assert_eq!(profile.death_causes.total() + profile.capped, profile.iterations);
        }
    }

    #[test]
    fn test_same_seed_same_report() {
        let def = torso_only().with_location(LocationDefinition::new(Location::Head, 9, 3));
        let first = SoakRunner::new(def.clone(), TableSet::new(), config(DamageProfile::all()))
            .unwrap()
            .run()
            .unwrap();
        let second = SoakRunner::new(def.clone(), TableSet::new(), config(DamageProfile::all()))
            .unwrap()
            .run()
            .unwrap();
        assert_eq!(first, second);

        let parallel = SoakConfig {
            parallel: true,
            ..config(DamageProfile::all())
        };
        let threaded = SoakRunner::new(def, TableSet::new(), parallel).unwrap().run().unwrap();
        assert_eq!(first.profiles, threaded.profiles);
    }

    #[test]
    fn test_killing_explosion_classified_first() {
        let blast = [CriticalEffect::AmmoExplosion {
            location: Location::CenterTorso,
            weapon: "AC/20".to_string(),
            damage: 100,
            contained: false,
        }];
        assert_eq!(
            DeathCause::classify(DestructionCause::VitalLocation(Location::CenterTorso), &blast),
            DeathCause::AmmoExplosion
        );
        assert_eq!(
            DeathCause::classify(DestructionCause::VitalLocation(Location::Head), &[]),
            DeathCause::HeadDestroyed
        );
        assert_eq!(
            DeathCause::classify(DestructionCause::EngineLostWithTorso, &[]),
            DeathCause::EngineLostWithTorso
        );
    }

    #[test]
    fn test_auto_case_and_validation() {
        let loaded = torso_only()
            .with_location(
                LocationDefinition::new(Location::LeftTorso, 10, 10).with_slots(vec![Component::Ammo(1)]),
            )
            .with_weapon(
                WeaponInstance::new("AC/10", 10, 3, [0, 5, 10, 15]).with_ammo(10),
                Location::LeftTorso,
            );
        let settings = SoakConfig {
            auto_case: true,
            ..config(vec![DamageProfile::Mixed])
        };
        let runner = SoakRunner::new(loaded, TableSet::new(), settings).unwrap();
        assert!(runner.unit.locations.iter().all(|location| location.case));
        assert!(runner.run().unwrap().auto_case);

        let empty = SoakRunner::new(UnitDefinition::new("Empty", 50), TableSet::new(), SoakConfig::default());
        assert!(matches!(
            empty,
            Err(ConfigurationError::Definition {
                source: DefinitionError::NoLocations,
                ..
            })
        ));
    }
}
