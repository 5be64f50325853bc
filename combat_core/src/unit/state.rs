use super::critical::CriticalEffect;
use crate::error::InvariantViolation;
use mech_core::{Component, UnitDefinition};
use rand::Rng;
use serde::Serialize;
use tables_core::{CriticalTable, Facing, Location};

/// Engine criticals that destroy the unit
pub const ENGINE_HITS_TO_DESTROY: u32 = 3;

/// Sensor criticals that stop the unit from firing
pub const SENSOR_HITS_TO_BLIND: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementMode {
    #[default]
    Stand,
    Walk,
    Run,
    Jump,
}

/// Movement chosen for the current turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MovementState {
    pub mode: MovementMode,
    pub hexes: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    Intact,
    Damaged,
    Destroyed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationState {
    pub location: Location,
    pub armor: u32,
    pub rear_armor: u32,
    pub structure: u32,
    pub slots: Vec<SlotState>,
    pub destroyed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeaponState {
    /// `None` never runs dry
    pub ammo: Option<u32>,
    pub disabled: bool,
    pub jammed: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeatState {
    pub level: u32,
    /// Heat generated this turn, applied in the heat phase
    pub pending: u32,
    pub shutdown: bool,
}

/// Why a unit was removed from the fight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DestructionCause {
    VitalLocation(Location),
    EngineLostWithTorso,
    EngineCritical,
    Cockpit,
    StructureExhausted,
}

/// What one application of damage did
#[derive(Debug, Clone, PartialEq)]
pub struct DamageResult {
    /// Location struck after redirection
    pub location: Location,
    pub armor_damage: u32,
    pub structure_damage: u32,
    /// The struck location itself was destroyed
    pub location_destroyed: bool,
    pub vital_destroyed: bool,
    pub unit_destroyed: bool,
    pub destroyed_locations: Vec<Location>,
    pub criticals: Vec<CriticalEffect>,
}

impl DamageResult {
    pub(crate) fn new(location: Location) -> Self {
        DamageResult {
            location,
            armor_damage: 0,
            structure_damage: 0,
            location_destroyed: false,
            vital_destroyed: false,
            unit_destroyed: false,
            destroyed_locations: Vec::new(),
            criticals: Vec::new(),
        }
    }
}

/// Mutable combat state created fresh from a definition for each trial
#[derive(Debug, Clone)]
pub struct UnitState<'d> {
    definition: &'d UnitDefinition,
    pub locations: Vec<LocationState>,
    pub weapons: Vec<WeaponState>,
    pub heat: HeatState,
    pub movement: MovementState,
    pub engine_hits: u32,
    pub sensor_hits: u32,
    pub heat_sinks_lost: u32,
    pub cockpit_destroyed: bool,
    pub destroyed: Option<DestructionCause>,
}

/// Remove up to `amount` points from `pool`, returning what was absorbed
fn absorb(pool: &mut u32, amount: u32) -> u32 {
    let absorbed = (*pool).min(amount);
    *pool -= absorbed;
    absorbed
}

impl<'d> UnitState<'d> {
    pub fn new(definition: &'d UnitDefinition) -> Self {
        let locations = definition
            .locations
            .iter()
            .map(|l| LocationState {
                location: l.location,
                armor: l.armor,
                rear_armor: l.rear_armor,
                structure: l.structure,
                slots: vec![SlotState::Intact; l.slots.len()],
                destroyed: false,
            })
            .collect();

        let weapons = (0..definition.weapons.len())
            .map(|i| WeaponState {
                ammo: definition.starting_ammo(i),
                disabled: false,
                jammed: false,
            })
            .collect();

        UnitState {
            definition,
            locations,
            weapons,
            heat: HeatState::default(),
            movement: MovementState::default(),
            engine_hits: 0,
            sensor_hits: 0,
            heat_sinks_lost: 0,
            cockpit_destroyed: false,
            destroyed: None,
        }
    }

    pub fn definition(&self) -> &'d UnitDefinition {
        self.definition
    }

    pub fn name(&self) -> &'d str {
        &self.definition.name
    }

    pub fn location(&self, location: Location) -> Option<&LocationState> {
        self.locations.iter().find(|l| l.location == location)
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed.is_some()
    }

    pub fn is_shut_down(&self) -> bool {
        self.heat.shutdown
    }

    /// Able to declare attacks this turn
    pub fn can_attack(&self) -> bool {
        !self.is_destroyed() && !self.is_shut_down() && self.sensor_hits < SENSOR_HITS_TO_BLIND
    }

    pub fn total_armor(&self) -> u32 {
        self.locations.iter().map(|l| l.armor + l.rear_armor).sum()
    }

    pub fn total_structure(&self) -> u32 {
        self.locations.iter().map(|l| l.structure).sum()
    }

    /// Armor plus structure left
    pub fn remaining_points(&self) -> u32 {
        self.total_armor() + self.total_structure()
    }

    pub fn structure_fraction(&self) -> f64 {
        let max = self.definition.total_structure();
        if max == 0 {
            return 0.0;
        }
        self.total_structure() as f64 / max as f64
    }

    /// Weapon is intact, unjammed and has ammunition
    pub fn weapon_ready(&self, index: usize) -> bool {
        self.weapons
            .get(index)
            .is_some_and(|w| !w.disabled && !w.jammed && w.ammo != Some(0))
    }

    pub fn ammo_remaining(&self, index: usize) -> Option<u32> {
        self.weapons.get(index).and_then(|w| w.ammo)
    }

    pub fn has_ammo(&self) -> bool {
        self.weapons.iter().any(|w| w.ammo.is_some_and(|n| n > 0))
    }

    /// Spend one shot; fails without effect when the weapon is out of ammunition
    pub fn fire_weapon(&mut self, index: usize) -> Result<bool, InvariantViolation> {
        let definition = self.definition;
        let weapon = self
            .weapons
            .get_mut(index)
            .ok_or_else(|| InvariantViolation::WeaponIndexOutOfRange {
                unit: definition.name.clone(),
                index,
            })?;

        match weapon.ammo {
            Some(0) => Ok(false),
            Some(shots) => {
                weapon.ammo = Some(shots - 1);
                Ok(true)
            }
            None => Ok(true),
        }
    }

    pub fn add_heat(&mut self, amount: u32) {
        self.heat.pending += amount;
    }

    /// Heat shed per turn by the sinks still working
    pub fn dissipation(&self) -> u32 {
        let per_sink = if self.definition.double_heat_sinks { 2 } else { 1 };
        self.definition.heat_sinks.saturating_sub(self.heat_sinks_lost) * per_sink
    }

    /// To-hit penalty from sensor, gyro and actuator damage
    pub fn damage_modifier(&self) -> i32 {
        let degraded = self
            .definition
            .locations
            .iter()
            .zip(&self.locations)
            .flat_map(|(def, state)| def.slots.iter().zip(&state.slots))
            .filter(|(component, slot)| component.degrades() && **slot != SlotState::Intact)
            .count() as i32;
        self.sensor_hits as i32 * 2 + degraded
    }

    /// Apply `amount` damage to a location
    ///
    /// Armor absorbs first (rear armor for rear attacks on torsos), then
    /// structure. Excess damage from a destroyed location follows the transfer
    /// chain as a front hit. A surviving location that took structure damage
    /// rolls for criticals.
    pub fn apply_damage<R: Rng + ?Sized>(
        &mut self,
        location: Location,
        amount: u32,
        facing: Facing,
        criticals: &CriticalTable,
        rng: &mut R,
    ) -> Result<DamageResult, InvariantViolation> {
        let definition = self.definition;
        let start = definition
            .resolve_location(location)
            .ok_or_else(|| InvariantViolation::NoLocation {
                unit: definition.name.clone(),
                location,
            })?;

        let mut result = DamageResult::new(start);
        let mut remaining = amount;
        let mut rear = facing == Facing::Rear;
        let mut current = Some(start);

        while let Some(loc) = current {
            if remaining == 0 {
                break;
            }
            let Some(idx) = definition.location_index(loc) else {
                current = loc.transfer_target();
                continue;
            };
            if self.locations[idx].destroyed {
                current = loc.transfer_target();
                rear = false;
                continue;
            }

            let state = &mut self.locations[idx];
            let armor = if rear && loc.has_rear_armor() {
                &mut state.rear_armor
            } else {
                &mut state.armor
            };
            let absorbed = absorb(armor, remaining);
            remaining -= absorbed;
            result.armor_damage += absorbed;
            if remaining == 0 {
                break;
            }

            let penetrating = absorb(&mut state.structure, remaining);
            remaining -= penetrating;
            result.structure_damage += penetrating;

            if state.structure == 0 {
                self.destroy_location(idx, &mut result);
                if self.check_destroyed() {
                    break;
                }
                current = loc.transfer_target();
                rear = false;
            } else {
                if penetrating > 0 {
                    self.roll_criticals(idx, 1, criticals, rng, &mut result);
                }
                break;
            }
        }

        tracing::trace!(
            unit = %definition.name,
            location = %start,
            amount,
            armor = result.armor_damage,
            structure = result.structure_damage,
            "damage applied"
        );

        result.unit_destroyed = self.is_destroyed();
        Ok(result)
    }

    /// Structure-only damage along the transfer chain, no critical rolls
    pub(super) fn apply_internal(&mut self, location: Location, amount: u32, result: &mut DamageResult) {
        let definition = self.definition;
        let mut remaining = amount;
        let mut current = Some(location);

        while let Some(loc) = current {
            if remaining == 0 {
                break;
            }
            let Some(idx) = definition.location_index(loc) else {
                current = loc.transfer_target();
                continue;
            };
            if self.locations[idx].destroyed {
                current = loc.transfer_target();
                continue;
            }

            let dealt = absorb(&mut self.locations[idx].structure, remaining);
            remaining -= dealt;
            result.structure_damage += dealt;

            if self.locations[idx].structure > 0 {
                break;
            }
            self.destroy_location(idx, result);
            if self.check_destroyed() {
                break;
            }
            current = loc.transfer_target();
        }
    }

    /// Zero a location, wreck its slots and weapons, and lose the ammunition stored there
    pub(super) fn destroy_location(&mut self, idx: usize, result: &mut DamageResult) {
        let definition = self.definition;
        let location = definition.locations[idx].location;

        let state = &mut self.locations[idx];
        state.destroyed = true;
        state.armor = 0;
        state.rear_armor = 0;
        state.structure = 0;
        state.slots.fill(SlotState::Destroyed);

        for (i, mount) in definition.weapons.iter().enumerate() {
            if mount.location == location {
                self.weapons[i].disabled = true;
            }
            if self.weapons[i].ammo.is_some() && definition.ammo_location(i) == Some(location) {
                self.weapons[i].ammo = Some(0);
            }
        }

        result.destroyed_locations.push(location);
        if location == result.location {
            result.location_destroyed = true;
        }
        if definition.locations[idx].vital {
            result.vital_destroyed = true;
        }
    }

    /// Record the first reason the unit is out of the fight, if any
    pub(super) fn check_destroyed(&mut self) -> bool {
        if self.destroyed.is_some() {
            return true;
        }
        let definition = self.definition;

        let vital = definition
            .locations
            .iter()
            .zip(&self.locations)
            .find(|(def, state)| def.vital && state.destroyed)
            .map(|(def, _)| def.location);

        let side_torsos_lost = self
            .locations
            .iter()
            .filter(|l| l.destroyed && l.location.is_side_torso())
            .count();

        self.destroyed = if let Some(location) = vital {
            Some(DestructionCause::VitalLocation(location))
        } else if definition
            .engine
            .side_torso_tolerance()
            .is_some_and(|limit| side_torsos_lost >= limit)
        {
            Some(DestructionCause::EngineLostWithTorso)
        } else if self.engine_hits >= ENGINE_HITS_TO_DESTROY {
            Some(DestructionCause::EngineCritical)
        } else if self.cockpit_destroyed {
            Some(DestructionCause::Cockpit)
        } else if self.total_structure() == 0 {
            Some(DestructionCause::StructureExhausted)
        } else {
            None
        };
        self.destroyed.is_some()
    }

    /// Components in a location whose slot is still usable
    pub(super) fn components_in(&self, idx: usize) -> impl Iterator<Item = (usize, Component)> + '_ {
        self.definition.locations[idx]
            .slots
            .iter()
            .copied()
            .enumerate()
            .filter(move |(slot, _)| self.locations[idx].slots[*slot] != SlotState::Destroyed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mech_core::{EngineType, LocationDefinition, WeaponInstance};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;
    use tables_core::ThresholdTable;

    fn no_crits() -> CriticalTable {
        CriticalTable::new(ThresholdTable::from_weights(vec![(0, 1)]).unwrap())
    }

    fn test_unit() -> UnitDefinition {
        UnitDefinition::new("Target", 50)
            .with_location(LocationDefinition::new(Location::Head, 9, 3))
            .with_location(LocationDefinition::new(Location::CenterTorso, 20, 16).with_rear_armor(6))
            .with_location(LocationDefinition::new(Location::LeftTorso, 15, 12).with_rear_armor(4))
            .with_location(LocationDefinition::new(Location::RightTorso, 15, 12).with_rear_armor(4))
            .with_location(LocationDefinition::new(Location::LeftArm, 10, 8))
            .with_weapon(
                WeaponInstance::new("Medium Laser", 5, 3, [0, 3, 6, 9]),
                Location::LeftArm,
            )
            .with_weapon(
                WeaponInstance::new("AC/5", 5, 1, [3, 6, 12, 18]).with_ammo(1),
                Location::RightTorso,
            )
    }

    #[test]
    fn test_armor_then_structure() {
        let def = test_unit();
        let mut unit = UnitState::new(&def);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = unit
            .apply_damage(Location::LeftArm, 14, Facing::Front, &no_crits(), &mut rng)
            .unwrap();
        assert_eq!(result.armor_damage, 10);
        assert_eq!(result.structure_damage, 4);
        assert!(!result.location_destroyed);

        let arm = unit.location(Location::LeftArm).unwrap();
        assert_eq!(arm.armor, 0);
        assert_eq!(arm.structure, 4);
    }

    #[test]
    fn test_rear_armor_only_on_torsos() {
        let def = test_unit();
        let mut unit = UnitState::new(&def);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        unit.apply_damage(Location::CenterTorso, 4, Facing::Rear, &no_crits(), &mut rng)
            .unwrap();
        let ct = unit.location(Location::CenterTorso).unwrap();
        assert_eq!(ct.rear_armor, 2);
        assert_eq!(ct.armor, 20);

        unit.apply_damage(Location::LeftArm, 4, Facing::Rear, &no_crits(), &mut rng)
            .unwrap();
        assert_eq!(unit.location(Location::LeftArm).unwrap().armor, 6);
    }

    #[test]
    fn test_destruction_transfers_and_disables() {
        let def = test_unit();
        let mut unit = UnitState::new(&def);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        // 18 to clear the arm, 5 more spill into the left torso armor
        let result = unit
            .apply_damage(Location::LeftArm, 23, Facing::Front, &no_crits(), &mut rng)
            .unwrap();
        assert!(result.location_destroyed);
        assert_eq!(result.destroyed_locations, vec![Location::LeftArm]);
        assert!(unit.weapons[0].disabled);
        assert!(!unit.weapon_ready(0));
        assert_eq!(unit.location(Location::LeftTorso).unwrap().armor, 10);

        // Hits on the wreck go straight to the torso
        unit.apply_damage(Location::LeftArm, 3, Facing::Front, &no_crits(), &mut rng)
            .unwrap();
        assert_eq!(unit.location(Location::LeftTorso).unwrap().armor, 7);
        assert!(!unit.is_destroyed());
    }

    #[test]
    fn test_missing_location_redirects() {
        let def = test_unit();
        let mut unit = UnitState::new(&def);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = unit
            .apply_damage(Location::RightLeg, 5, Facing::Front, &no_crits(), &mut rng)
            .unwrap();
        assert_eq!(result.location, Location::RightTorso);
        assert_eq!(unit.location(Location::RightTorso).unwrap().armor, 10);
    }

    #[test]
    fn test_vital_destruction() {
        let def = test_unit();
        let mut unit = UnitState::new(&def);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = unit
            .apply_damage(Location::Head, 12, Facing::Front, &no_crits(), &mut rng)
            .unwrap();
        assert!(result.vital_destroyed);
        assert!(result.unit_destroyed);
        assert_eq!(
            unit.destroyed,
            Some(DestructionCause::VitalLocation(Location::Head))
        );
    }

    #[test]
    fn test_xl_engine_dies_with_side_torso() {
        let def = test_unit().with_engine(EngineType::Xl);
        let mut unit = UnitState::new(&def);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        let result = unit
            .apply_damage(Location::RightTorso, 27, Facing::Front, &no_crits(), &mut rng)
            .unwrap();
        assert!(result.unit_destroyed);
        assert!(!result.vital_destroyed);
        assert_eq!(unit.destroyed, Some(DestructionCause::EngineLostWithTorso));
    }

    #[test]
    fn test_light_engine_survives_one_side_torso() {
        let def = test_unit().with_engine(EngineType::Light);
        let mut unit = UnitState::new(&def);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        unit.apply_damage(Location::LeftTorso, 27, Facing::Front, &no_crits(), &mut rng)
            .unwrap();
        assert!(unit.location(Location::LeftTorso).unwrap().destroyed);
        assert_eq!(unit.destroyed, None);

        let result = unit
            .apply_damage(Location::RightTorso, 27, Facing::Front, &no_crits(), &mut rng)
            .unwrap();
        assert!(result.unit_destroyed);
        assert_eq!(unit.destroyed, Some(DestructionCause::EngineLostWithTorso));
    }

    #[test]
    fn test_fire_weapon_ammo() {
        let def = test_unit();
        let mut unit = UnitState::new(&def);

        assert!(unit.fire_weapon(0).unwrap());
        assert!(unit.fire_weapon(0).unwrap());

        assert!(unit.fire_weapon(1).unwrap());
        assert!(!unit.fire_weapon(1).unwrap());
        assert_eq!(unit.ammo_remaining(1), Some(0));
        assert!(!unit.weapon_ready(1));

        assert!(matches!(
            unit.fire_weapon(7),
            Err(InvariantViolation::WeaponIndexOutOfRange { index: 7, .. })
        ));
    }

    #[test]
    fn test_destroyed_ammo_location_loses_ammo() {
        let def = test_unit();
        let mut unit = UnitState::new(&def);
        let mut rng = ChaCha8Rng::seed_from_u64(1);

        unit.apply_damage(Location::RightTorso, 27, Facing::Front, &no_crits(), &mut rng)
            .unwrap();
        assert_eq!(unit.ammo_remaining(1), Some(0));
        assert!(!unit.has_ammo());
    }

    #[test]
    fn test_structure_fraction_and_dissipation() {
        let def = test_unit().with_heat_sinks(10, true);
        let mut unit = UnitState::new(&def);
        assert_eq!(unit.structure_fraction(), 1.0);
        assert_eq!(unit.dissipation(), 20);
        unit.heat_sinks_lost = 3;
        assert_eq!(unit.dissipation(), 14);
    }
}
