//! Critical hit resolution
//!
//! A structure-penetrating hit makes one severity roll. Each critical then
//! picks a slot among those not yet destroyed and runs it through the effect
//! pipeline: slot transition first, then the component's effect.

use super::state::{DamageResult, SlotState, UnitState};
use crate::error::InvariantViolation;
use mech_core::Component;
use rand::Rng;
use serde::Serialize;
use std::fmt;
use tables_core::{CriticalTable, Location};

/// Outcome of one critical slot hit
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "effect", rename_all = "snake_case")]
pub enum CriticalEffect {
    WeaponDestroyed {
        location: Location,
        weapon: String,
    },
    AmmoExplosion {
        location: Location,
        weapon: String,
        damage: u32,
        /// CASE kept the blast inside the location
        contained: bool,
    },
    /// Ammo slot hit after the bin ran dry
    AmmoBinEmpty {
        location: Location,
        weapon: String,
    },
    EngineHit {
        hits: u32,
    },
    CockpitDestroyed,
    SensorHit {
        hits: u32,
    },
    GyroHit {
        destroyed: bool,
    },
    ActuatorHit {
        location: Location,
        destroyed: bool,
    },
    HeatSinkLost {
        remaining: u32,
    },
    NoEffect {
        location: Location,
    },
}

impl fmt::Display for CriticalEffect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CriticalEffect::WeaponDestroyed { location, weapon } => {
                write!(f, "{} destroyed in {}", weapon, location)
            }
            CriticalEffect::AmmoExplosion {
                location,
                weapon,
                damage,
                contained,
            } => {
                write!(f, "{} ammo explodes in {} for {}", weapon, location, damage)?;
                if *contained {
                    write!(f, " (contained)")?;
                }
                Ok(())
            }
            CriticalEffect::AmmoBinEmpty { location, weapon } => {
                write!(f, "empty {} ammo bin hit in {}", weapon, location)
            }
            CriticalEffect::EngineHit { hits } => write!(f, "engine hit ({})", hits),
            CriticalEffect::CockpitDestroyed => write!(f, "cockpit destroyed"),
            CriticalEffect::SensorHit { hits } => write!(f, "sensor hit ({})", hits),
            CriticalEffect::GyroHit { destroyed: true } => write!(f, "gyro destroyed"),
            CriticalEffect::GyroHit { destroyed: false } => write!(f, "gyro damaged"),
            CriticalEffect::ActuatorHit {
                location,
                destroyed,
            } => {
                let state = if *destroyed { "destroyed" } else { "damaged" };
                write!(f, "actuator {} in {}", state, location)
            }
            CriticalEffect::HeatSinkLost { remaining } => {
                write!(f, "heat sink lost ({} remaining)", remaining)
            }
            CriticalEffect::NoEffect { location } => write!(f, "critical in {}, no effect", location),
        }
    }
}

impl<'d> UnitState<'d> {
    /// Roll severity for a location that took structure damage and apply each critical
    pub(super) fn roll_criticals<R: Rng + ?Sized>(
        &mut self,
        idx: usize,
        penetrating_hits: u32,
        table: &CriticalTable,
        rng: &mut R,
        result: &mut DamageResult,
    ) {
        let count = table.slots_affected(penetrating_hits, rng.gen());
        if count == 0 {
            return;
        }

        let location = self.definition().locations[idx].location;
        if self.definition().locations[idx].slots.is_empty() {
            result.criticals.push(CriticalEffect::NoEffect { location });
            return;
        }

        for _ in 0..count {
            let candidates: Vec<(usize, Component)> = self.components_in(idx).collect();
            if candidates.is_empty() || self.is_destroyed() {
                break;
            }
            let pick = ((rng.gen::<f64>() * candidates.len() as f64) as usize)
                .min(candidates.len() - 1);
            let (slot, component) = candidates[pick];
            self.apply_critical(idx, slot, component, result);
        }
    }

    fn apply_critical(
        &mut self,
        idx: usize,
        slot: usize,
        component: Component,
        result: &mut DamageResult,
    ) {
        let definition = self.definition();
        let location = definition.locations[idx].location;

        let state = &mut self.locations[idx].slots[slot];
        *state = match (*state, component.degrades()) {
            (SlotState::Intact, true) => SlotState::Damaged,
            _ => SlotState::Destroyed,
        };
        let slot_destroyed = *state == SlotState::Destroyed;

        let effect = match component {
            Component::Weapon(weapon) => {
                if let Some(w) = self.weapons.get_mut(weapon) {
                    w.disabled = true;
                }
                for (state, def) in self.locations.iter_mut().zip(&definition.locations) {
                    for (slot_state, c) in state.slots.iter_mut().zip(&def.slots) {
                        if *c == Component::Weapon(weapon) {
                            *slot_state = SlotState::Destroyed;
                        }
                    }
                }
                CriticalEffect::WeaponDestroyed {
                    location,
                    weapon: definition.weapons[weapon].weapon.name.clone(),
                }
            }
            Component::Ammo(weapon) => {
                if self.ammo_remaining(weapon).is_some_and(|n| n > 0) {
                    // Pushes its own effect; the location is gone afterwards
                    self.ammo_explosion(idx, weapon, result);
                    return;
                }
                CriticalEffect::AmmoBinEmpty {
                    location,
                    weapon: definition.weapons[weapon].weapon.name.clone(),
                }
            }
            Component::Engine => {
                self.engine_hits += 1;
                CriticalEffect::EngineHit {
                    hits: self.engine_hits,
                }
            }
            Component::Cockpit => {
                self.cockpit_destroyed = true;
                CriticalEffect::CockpitDestroyed
            }
            Component::Sensors => {
                self.sensor_hits += 1;
                CriticalEffect::SensorHit {
                    hits: self.sensor_hits,
                }
            }
            Component::Gyro => CriticalEffect::GyroHit {
                destroyed: slot_destroyed,
            },
            Component::Actuator => CriticalEffect::ActuatorHit {
                location,
                destroyed: slot_destroyed,
            },
            Component::HeatSink => {
                self.heat_sinks_lost = (self.heat_sinks_lost + 1).min(definition.heat_sinks);
                CriticalEffect::HeatSinkLost {
                    remaining: definition.heat_sinks - self.heat_sinks_lost,
                }
            }
            Component::LifeSupport | Component::Structural => CriticalEffect::NoEffect { location },
        };

        tracing::trace!(unit = %definition.name, %effect, "critical hit");
        result.criticals.push(effect);
        self.check_destroyed();
    }

    /// Detonate a weapon's remaining ammunition where it is stored
    ///
    /// Returns `None` when there is nothing left to explode.
    pub fn explode_ammo(
        &mut self,
        weapon: usize,
    ) -> Result<Option<DamageResult>, InvariantViolation> {
        let definition = self.definition();
        if weapon >= self.weapons.len() {
            return Err(InvariantViolation::WeaponIndexOutOfRange {
                unit: definition.name.clone(),
                index: weapon,
            });
        }
        if !self.ammo_remaining(weapon).is_some_and(|n| n > 0) {
            return Ok(None);
        }

        let location = definition
            .ammo_location(weapon)
            .ok_or_else(|| InvariantViolation::WeaponIndexOutOfRange {
                unit: definition.name.clone(),
                index: weapon,
            })?;
        let idx = definition
            .location_index(location)
            .ok_or_else(|| InvariantViolation::NoLocation {
                unit: definition.name.clone(),
                location,
            })?;
        if self.locations[idx].destroyed {
            return Ok(None);
        }

        let mut result = DamageResult::new(location);
        self.ammo_explosion(idx, weapon, &mut result);
        result.unit_destroyed = self.is_destroyed();
        Ok(Some(result))
    }

    fn ammo_explosion(&mut self, idx: usize, weapon: usize, result: &mut DamageResult) {
        let definition = self.definition();
        let mount = &definition.weapons[weapon];
        let location = definition.locations[idx].location;
        let contained = definition.locations[idx].case;

        let shots = self.weapons[weapon].ammo.unwrap_or(0);
        let damage = shots * mount.weapon.damage * mount.weapon.projectiles();
        self.weapons[weapon].ammo = Some(0);

        let structure_left = self.locations[idx].structure;
        result.structure_damage += structure_left;
        self.destroy_location(idx, result);

        tracing::debug!(
            unit = %definition.name,
            weapon = %mount.weapon.name,
            %location,
            damage,
            contained,
            "ammunition explosion"
        );
        result.criticals.push(CriticalEffect::AmmoExplosion {
            location,
            weapon: mount.weapon.name.clone(),
            damage,
            contained,
        });

        if self.check_destroyed() || contained {
            return;
        }
        let overflow = damage.saturating_sub(structure_left);
        if let (true, Some(next)) = (overflow > 0, location.transfer_target()) {
            self.apply_internal(next, overflow, result);
        }
    }
}
