use crate::weapon::WeaponInstance;
use crate::DefinitionError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tables_core::Location;

/// Engine construction; determines which torso losses kill the unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EngineType {
    #[default]
    Standard,
    Light,
    Xl,
}

impl EngineType {
    /// Number of destroyed side torsos that takes the engine with them
    pub fn side_torso_tolerance(&self) -> Option<usize> {
        match self {
            EngineType::Standard => None,
            EngineType::Light => Some(2),
            EngineType::Xl => Some(1),
        }
    }
}

/// Contents of one critical slot
///
/// `Weapon` and `Ammo` hold an index into the unit's weapon loadout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Component {
    Weapon(usize),
    Ammo(usize),
    Engine,
    Gyro,
    Cockpit,
    Sensors,
    Actuator,
    HeatSink,
    LifeSupport,
    /// Jump jets, armor and structure filler: takes a critical with no effect
    Structural,
}

impl Component {
    /// Gyros and actuators pass through a damaged state before being destroyed
    pub fn degrades(&self) -> bool {
        matches!(self, Component::Gyro | Component::Actuator)
    }

    /// Match a record-sheet slot name that is neither a weapon nor ammunition
    pub fn from_keyword(name: &str) -> Option<Component> {
        let lower = name.trim().to_ascii_lowercase();
        let component = match lower.as_str() {
            "engine" | "fusion engine" => Component::Engine,
            "gyro" => Component::Gyro,
            "cockpit" => Component::Cockpit,
            "sensors" => Component::Sensors,
            "heat sink" | "double heat sink" => Component::HeatSink,
            "life support" => Component::LifeSupport,
            "jump jet" | "endo steel" | "ferro-fibrous" | "case" | "empty" => {
                Component::Structural
            }
            other
                if other.contains("actuator") || other == "shoulder" || other == "hip" =>
            {
                Component::Actuator
            }
            _ => return None,
        };
        Some(component)
    }
}

/// Per-location starting values and slot layout
#[derive(Debug, Clone, PartialEq)]
pub struct LocationDefinition {
    pub location: Location,
    pub armor: u32,
    pub rear_armor: u32,
    pub structure: u32,
    pub slots: Vec<Component>,
    pub case: bool,
    pub vital: bool,
}

impl LocationDefinition {
    pub fn new(location: Location, armor: u32, structure: u32) -> Self {
        LocationDefinition {
            location,
            armor,
            rear_armor: 0,
            structure,
            slots: Vec::new(),
            case: false,
            vital: location.is_vital(),
        }
    }

    pub fn with_rear_armor(mut self, rear_armor: u32) -> Self {
        self.rear_armor = rear_armor;
        self
    }

    pub fn with_slots(mut self, slots: Vec<Component>) -> Self {
        self.slots = slots;
        self
    }

    pub fn with_case(mut self) -> Self {
        self.case = true;
        self
    }

    pub fn with_vital(mut self, vital: bool) -> Self {
        self.vital = vital;
        self
    }
}

/// A weapon fitted to a location, with its starting ammunition
#[derive(Debug, Clone, PartialEq)]
pub struct MountedWeapon {
    pub weapon: WeaponInstance,
    pub location: Location,
    /// Overrides the weapon's default shot count
    pub ammo: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movement {
    pub walk_mp: u32,
    pub run_mp: u32,
    pub jump_mp: u32,
}

impl Movement {
    /// Walking speed with running at one and a half times, rounded up
    pub fn walking(walk_mp: u32) -> Self {
        Movement {
            walk_mp,
            run_mp: (walk_mp * 3 + 1) / 2,
            jump_mp: 0,
        }
    }
}

/// Immutable description of one combatant
#[derive(Debug, Clone, PartialEq)]
pub struct UnitDefinition {
    pub name: String,
    pub tonnage: u32,
    pub movement: Movement,
    /// Base to-hit difficulty
    pub gunnery: u32,
    pub heat_sinks: u32,
    pub double_heat_sinks: bool,
    pub engine: EngineType,
    /// Record-sheet order; the first vital entry absorbs unresolvable hits
    pub locations: Vec<LocationDefinition>,
    pub weapons: Vec<MountedWeapon>,
}

impl UnitDefinition {
    pub fn new(name: &str, tonnage: u32) -> Self {
        UnitDefinition {
            name: name.to_string(),
            tonnage,
            movement: Movement::walking(4),
            gunnery: 4,
            heat_sinks: 10,
            double_heat_sinks: false,
            engine: EngineType::Standard,
            locations: Vec::new(),
            weapons: Vec::new(),
        }
    }

    pub fn with_movement(mut self, movement: Movement) -> Self {
        self.movement = movement;
        self
    }

    pub fn with_gunnery(mut self, gunnery: u32) -> Self {
        self.gunnery = gunnery;
        self
    }

    pub fn with_heat_sinks(mut self, count: u32, double: bool) -> Self {
        self.heat_sinks = count;
        self.double_heat_sinks = double;
        self
    }

    pub fn with_engine(mut self, engine: EngineType) -> Self {
        self.engine = engine;
        self
    }

    pub fn with_location(mut self, location: LocationDefinition) -> Self {
        self.locations.push(location);
        self
    }

    /// Mount a weapon with its default ammunition and no critical slots
    pub fn with_weapon(self, weapon: WeaponInstance, location: Location) -> Self {
        self.with_weapon_ammo(weapon, location, None)
    }

    pub fn with_weapon_ammo(
        mut self,
        weapon: WeaponInstance,
        location: Location,
        ammo: Option<u32>,
    ) -> Self {
        self.weapons.push(MountedWeapon {
            weapon,
            location,
            ammo,
        });
        self
    }

    pub fn location(&self, location: Location) -> Option<&LocationDefinition> {
        self.locations.iter().find(|l| l.location == location)
    }

    pub fn location_index(&self, location: Location) -> Option<usize> {
        self.locations.iter().position(|l| l.location == location)
    }

    pub fn first_vital(&self) -> Option<Location> {
        self.locations.iter().find(|l| l.vital).map(|l| l.location)
    }

    /// Where a hit on `location` lands on this unit
    ///
    /// Missing locations follow the transfer chain; if the chain runs out the
    /// hit goes to the first vital location.
    pub fn resolve_location(&self, location: Location) -> Option<Location> {
        let mut current = Some(location);
        while let Some(candidate) = current {
            if self.location(candidate).is_some() {
                return Some(candidate);
            }
            current = candidate.transfer_target();
        }
        self.first_vital()
    }

    /// Shots a weapon starts each trial with; `None` never runs dry
    pub fn starting_ammo(&self, weapon_index: usize) -> Option<u32> {
        self.weapons
            .get(weapon_index)
            .and_then(|m| m.ammo.or(m.weapon.ammo))
    }

    /// Location holding a weapon's ammunition: its first ammo slot, else the weapon itself
    pub fn ammo_location(&self, weapon_index: usize) -> Option<Location> {
        self.locations
            .iter()
            .find(|l| l.slots.contains(&Component::Ammo(weapon_index)))
            .map(|l| l.location)
            .or_else(|| self.weapons.get(weapon_index).map(|m| m.location))
    }

    pub fn total_armor(&self) -> u32 {
        self.locations.iter().map(|l| l.armor + l.rear_armor).sum()
    }

    pub fn total_structure(&self) -> u32 {
        self.locations.iter().map(|l| l.structure).sum()
    }

    /// Heat shed per turn with every sink intact
    pub fn dissipation(&self) -> u32 {
        if self.double_heat_sinks {
            self.heat_sinks * 2
        } else {
            self.heat_sinks
        }
    }

    /// Check that the unit can be fought with
    pub fn validate(&self) -> Result<(), DefinitionError> {
        if self.locations.is_empty() {
            return Err(DefinitionError::NoLocations);
        }

        let mut seen = HashSet::new();
        for loc in &self.locations {
            if !seen.insert(loc.location) {
                return Err(DefinitionError::DuplicateLocation(loc.location));
            }
            if loc.structure == 0 {
                return Err(DefinitionError::ZeroStructure(loc.location));
            }
        }
        if self.first_vital().is_none() {
            return Err(DefinitionError::NoVitalLocation);
        }

        for mount in &self.weapons {
            if self.location(mount.location).is_none() {
                return Err(DefinitionError::MissingLocation {
                    weapon: mount.weapon.name.clone(),
                    location: mount.location,
                });
            }
        }

        for loc in &self.locations {
            for slot in &loc.slots {
                match *slot {
                    Component::Weapon(index) | Component::Ammo(index)
                        if index >= self.weapons.len() =>
                    {
                        return Err(DefinitionError::BadSlotReference {
                            location: loc.location,
                            index,
                        });
                    }
                    Component::Ammo(index) if self.starting_ammo(index).is_none() => {
                        return Err(DefinitionError::AmmoWithoutAmmoWeapon(
                            self.weapons[index].weapon.name.clone(),
                        ));
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn laser() -> WeaponInstance {
        WeaponInstance::new("Medium Laser", 5, 3, [0, 3, 6, 9])
    }

    fn torso_only() -> UnitDefinition {
        UnitDefinition::new("Brick", 50)
            .with_location(LocationDefinition::new(Location::CenterTorso, 30, 20))
            .with_location(LocationDefinition::new(Location::LeftTorso, 20, 12))
            .with_location(LocationDefinition::new(Location::RightTorso, 20, 12))
    }

    #[test]
    fn test_run_speed_rounds_up() {
        assert_eq!(Movement::walking(4).run_mp, 6);
        assert_eq!(Movement::walking(5).run_mp, 8);
        assert_eq!(Movement::walking(0).run_mp, 0);
    }

    #[test]
    fn test_resolve_missing_location() {
        let unit = torso_only();
        assert_eq!(
            unit.resolve_location(Location::LeftArm),
            Some(Location::LeftTorso)
        );
        assert_eq!(
            unit.resolve_location(Location::RightLeg),
            Some(Location::RightTorso)
        );
        // Head has no transfer target, so it lands on the first vital location
        assert_eq!(
            unit.resolve_location(Location::Head),
            Some(Location::CenterTorso)
        );
    }

    #[test]
    fn test_vital_defaults_and_override() {
        let head = LocationDefinition::new(Location::Head, 9, 3);
        assert!(head.vital);
        let arm = LocationDefinition::new(Location::LeftArm, 9, 3).with_vital(true);
        assert!(arm.vital);
    }

    #[test]
    fn test_ammo_location_prefers_ammo_slot() {
        let ac = WeaponInstance::new("AC/20", 20, 7, [0, 3, 6, 9]).with_ammo(5);
        let unit = UnitDefinition::new("Hunch", 50)
            .with_location(LocationDefinition::new(Location::CenterTorso, 30, 16))
            .with_location(
                LocationDefinition::new(Location::LeftTorso, 20, 12)
                    .with_slots(vec![Component::Ammo(0)]),
            )
            .with_location(LocationDefinition::new(Location::RightTorso, 20, 12))
            .with_weapon(ac, Location::RightTorso);

        assert_eq!(unit.ammo_location(0), Some(Location::LeftTorso));
        assert_eq!(unit.starting_ammo(0), Some(5));
        assert!(unit.validate().is_ok());
    }

    #[test]
    fn test_ammo_override() {
        let ac = WeaponInstance::new("AC/5", 5, 1, [3, 6, 12, 18]).with_ammo(20);
        let unit = torso_only().with_weapon_ammo(ac, Location::CenterTorso, Some(40));
        assert_eq!(unit.starting_ammo(0), Some(40));
        assert_eq!(unit.ammo_location(0), Some(Location::CenterTorso));
    }

    #[test]
    fn test_validate_errors() {
        assert_eq!(
            UnitDefinition::new("Empty", 20).validate(),
            Err(DefinitionError::NoLocations)
        );

        let no_vital = UnitDefinition::new("Limbs", 20)
            .with_location(LocationDefinition::new(Location::LeftArm, 5, 3));
        assert_eq!(no_vital.validate(), Err(DefinitionError::NoVitalLocation));

        let duplicate =
            torso_only().with_location(LocationDefinition::new(Location::LeftTorso, 1, 1));
        assert_eq!(
            duplicate.validate(),
            Err(DefinitionError::DuplicateLocation(Location::LeftTorso))
        );

        let floating = torso_only().with_weapon(laser(), Location::LeftArm);
        assert!(matches!(
            floating.validate(),
            Err(DefinitionError::MissingLocation { .. })
        ));

        let mut energy_ammo = torso_only().with_weapon(laser(), Location::CenterTorso);
        energy_ammo.locations[0].slots.push(Component::Ammo(0));
        assert_eq!(
            energy_ammo.validate(),
            Err(DefinitionError::AmmoWithoutAmmoWeapon("Medium Laser".to_string()))
        );

        let mut dangling = torso_only();
        dangling.locations[1].slots.push(Component::Weapon(3));
        assert!(matches!(
            dangling.validate(),
            Err(DefinitionError::BadSlotReference { index: 3, .. })
        ));
    }

    #[test]
    fn test_slot_keywords() {
        assert_eq!(Component::from_keyword("Engine"), Some(Component::Engine));
        assert_eq!(
            Component::from_keyword("Upper Arm Actuator"),
            Some(Component::Actuator)
        );
        assert_eq!(Component::from_keyword("Hip"), Some(Component::Actuator));
        assert_eq!(
            Component::from_keyword("Jump Jet"),
            Some(Component::Structural)
        );
        assert_eq!(Component::from_keyword("Medium Laser"), None);
        assert!(Component::Gyro.degrades());
        assert!(!Component::Engine.degrades());
    }

    #[test]
    fn test_totals() {
        let unit = torso_only().with_heat_sinks(10, true);
        assert_eq!(unit.total_armor(), 70);
        assert_eq!(unit.total_structure(), 44);
        assert_eq!(unit.dissipation(), 20);
    }
}
