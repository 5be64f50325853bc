use crate::catalog::WeaponCatalog;
use crate::config::UnitFileConfig;
use crate::definition::{Component, LocationDefinition, MountedWeapon, Movement, UnitDefinition};
use crate::{ConfigError, DefinitionError};
use std::collections::HashMap;
use std::path::Path;
use tables_core::{standard_structure, Location};

/// Unit definitions keyed by name, loaded from TOML or JSON files
#[derive(Debug, Default)]
pub struct UnitRegistry {
    units: HashMap<String, UnitDefinition>,
}

impl UnitRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every unit file in a directory (recursively)
    pub fn load(dir: &Path, catalog: &WeaponCatalog) -> Result<Self, ConfigError> {
        let mut registry = Self::new();
        registry.load_dir(dir, catalog)?;
        Ok(registry)
    }

    fn load_dir(&mut self, dir: &Path, catalog: &WeaponCatalog) -> Result<(), ConfigError> {
        if !dir.exists() {
            return Ok(());
        }

        let entries = std::fs::read_dir(dir).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(dir.to_path_buf()),
        })?;

        for entry in entries {
            let entry = entry.map_err(|e| ConfigError::Io {
                error: e,
                path: Some(dir.to_path_buf()),
            })?;
            let path = entry.path();

            if path.is_dir() {
                self.load_dir(&path, catalog)?;
            } else if path
                .extension()
                .is_some_and(|ext| ext == "toml" || ext == "json")
            {
                self.load_file(&path, catalog)?;
            }
        }

        Ok(())
    }

    /// Load a single unit file; the format follows the extension
    pub fn load_file(&mut self, path: &Path, catalog: &WeaponCatalog) -> Result<(), ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;

        let config: UnitFileConfig = if path.extension().is_some_and(|ext| ext == "json") {
            serde_json::from_str(&content).map_err(|e| ConfigError::Json {
                error: e,
                path: Some(path.to_path_buf()),
            })?
        } else {
            toml::from_str(&content).map_err(|e| ConfigError::Parse {
                error: e,
                path: Some(path.to_path_buf()),
            })?
        };

        let name = config.unit.name.clone();
        let unit = build_unit(config, catalog).map_err(|e| ConfigError::Definition {
            unit: name,
            source: e,
            path: Some(path.to_path_buf()),
        })?;

        self.units.insert(unit.name.clone(), unit);
        Ok(())
    }

    /// Parse a single TOML unit without registering it
    pub fn parse_unit(content: &str, catalog: &WeaponCatalog) -> Result<UnitDefinition, ConfigError> {
        let config: UnitFileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            error: e,
            path: None,
        })?;
        let name = config.unit.name.clone();
        build_unit(config, catalog).map_err(|e| ConfigError::Definition {
            unit: name,
            source: e,
            path: None,
        })
    }

    /// Register a unit built in code
    pub fn insert(&mut self, unit: UnitDefinition) -> Result<(), DefinitionError> {
        unit.validate()?;
        self.units.insert(unit.name.clone(), unit);
        Ok(())
    }

    /// Get a unit by name
    pub fn get(&self, name: &str) -> Option<&UnitDefinition> {
        self.units.get(name)
    }

    /// Get a unit by name, failing for unknown names
    pub fn require(&self, name: &str) -> Result<&UnitDefinition, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownUnit(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.units.contains_key(name)
    }

    /// List all unit names
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.units.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }
}

/// Resolve weapons against the catalog and lay out critical slots
fn build_unit(
    config: UnitFileConfig,
    catalog: &WeaponCatalog,
) -> Result<UnitDefinition, DefinitionError> {
    let header = config.unit;
    let movement = Movement {
        walk_mp: header.walk_mp,
        run_mp: header
            .run_mp
            .unwrap_or_else(|| Movement::walking(header.walk_mp).run_mp),
        jump_mp: header.jump_mp,
    };

    let mut unit = UnitDefinition::new(&header.name, header.tonnage)
        .with_movement(movement)
        .with_gunnery(header.gunnery)
        .with_heat_sinks(header.heat_sinks, header.double_heat_sinks)
        .with_engine(header.engine);

    for mount in config.weapons {
        let weapon = catalog.lookup(&mount.name)?.clone();
        unit = unit.with_weapon_ammo(weapon, mount.location, mount.ammo);
    }

    let standard = standard_structure(header.tonnage);
    let mut assigned = vec![false; unit.weapons.len()];
    for loc in config.locations {
        let structure = match loc.structure {
            Some(points) => points,
            None => standard
                .ok_or(DefinitionError::UnknownTonnage(header.tonnage))?
                .for_location(loc.location),
        };

        let mut slots = Vec::new();
        for name in &loc.slots {
            expand_slot(name, loc.location, &unit.weapons, &mut assigned, &mut slots)?;
        }

        let mut definition = LocationDefinition::new(loc.location, loc.armor, structure)
            .with_rear_armor(loc.rear_armor)
            .with_slots(slots);
        if loc.case {
            definition = definition.with_case();
        }
        if let Some(vital) = loc.vital {
            definition = definition.with_vital(vital);
        }
        unit = unit.with_location(definition);
    }

    unit.validate()?;
    Ok(unit)
}

/// Turn one slot name into components
///
/// `Ammo <weapon>` names the ammunition bin of the first mount of that weapon.
/// A weapon name claims the next unassigned mount of that weapon in the same
/// location and fills one slot per critical slot the weapon occupies.
fn expand_slot(
    name: &str,
    location: Location,
    weapons: &[MountedWeapon],
    assigned: &mut [bool],
    slots: &mut Vec<Component>,
) -> Result<(), DefinitionError> {
    let name = name.trim();

    if let Some(ammo_for) = name.strip_prefix("Ammo ") {
        let index = weapons
            .iter()
            .position(|m| m.weapon.name == ammo_for.trim())
            .ok_or_else(|| DefinitionError::UnknownSlot {
                location,
                slot: name.to_string(),
            })?;
        slots.push(Component::Ammo(index));
        return Ok(());
    }

    if weapons.iter().any(|m| m.weapon.name == name) {
        let index = (0..weapons.len())
            .find(|&i| {
                !assigned[i] && weapons[i].location == location && weapons[i].weapon.name == name
            })
            .ok_or_else(|| DefinitionError::SlotWithoutWeapon {
                location,
                slot: name.to_string(),
            })?;
        assigned[index] = true;
        let count = weapons[index].weapon.crit_slots as usize;
        slots.extend(std::iter::repeat(Component::Weapon(index)).take(count));
        return Ok(());
    }

    let component = Component::from_keyword(name).ok_or_else(|| DefinitionError::UnknownSlot {
        location,
        slot: name.to_string(),
    })?;
    slots.push(component);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CatalogError;
    use crate::EngineType;
    use std::io::Write;
    use tempfile::TempDir;

    const HUNCHBACK: &str = r#"
[unit]
name = "Hunchback HBK-4G"
tonnage = 50
walk_mp = 4
heat_sinks = 13

[[locations]]
location = "HD"
armor = 9
slots = ["Cockpit", "Sensors", "Life Support"]

[[locations]]
location = "CT"
armor = 26
rear_armor = 5
slots = ["Engine", "Engine", "Engine", "Gyro", "Gyro"]

[[locations]]
location = "RT"
armor = 20
rear_armor = 4
slots = ["AC/20", "Ammo AC/20", "Ammo AC/20"]

[[locations]]
location = "LT"
armor = 20
rear_armor = 4

[[locations]]
location = "LA"
armor = 16
slots = ["Medium Laser", "Shoulder", "Upper Arm Actuator"]

[[locations]]
location = "RA"
armor = 16
slots = ["Medium Laser"]

[[weapons]]
name = "AC/20"
location = "RT"
ammo = 10

[[weapons]]
name = "Medium Laser"
location = "LA"

[[weapons]]
name = "Medium Laser"
location = "RA"
"#;

    fn create_test_unit(dir: &Path, name: &str, content: &str) {
        let path = dir.join(name);
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(content.as_bytes()).unwrap();
    }

    #[test]
    fn test_parse_unit() {
        let catalog = WeaponCatalog::standard();
        let unit = UnitRegistry::parse_unit(HUNCHBACK, &catalog).unwrap();

        assert_eq!(unit.name, "Hunchback HBK-4G");
        assert_eq!(unit.movement.run_mp, 6);
        assert_eq!(unit.gunnery, 4);
        assert_eq!(unit.engine, EngineType::Standard);
        assert_eq!(unit.weapons.len(), 3);
        assert_eq!(unit.starting_ammo(0), Some(10));
        assert_eq!(unit.starting_ammo(1), None);

        // Structure comes from the 50 ton row when not given
        assert_eq!(unit.location(Location::CenterTorso).unwrap().structure, 16);
        assert_eq!(unit.location(Location::LeftArm).unwrap().structure, 8);
    }

    #[test]
    fn test_weapon_slots_expand() {
        let catalog = WeaponCatalog::standard();
        let unit = UnitRegistry::parse_unit(HUNCHBACK, &catalog).unwrap();

        let rt = unit.location(Location::RightTorso).unwrap();
        let weapon_slots = rt
            .slots
            .iter()
            .filter(|s| **s == Component::Weapon(0))
            .count();
        assert_eq!(weapon_slots, 10);
        assert_eq!(rt.slots.len(), 12);
        assert_eq!(unit.ammo_location(0), Some(Location::RightTorso));

        // Two lasers of the same name land on separate mounts
        let la = unit.location(Location::LeftArm).unwrap();
        assert_eq!(la.slots[0], Component::Weapon(1));
        assert_eq!(la.slots[1], Component::Actuator);
        let ra = unit.location(Location::RightArm).unwrap();
        assert_eq!(ra.slots, vec![Component::Weapon(2)]);
    }

    #[test]
    fn test_unknown_weapon_rejected() {
        let catalog = WeaponCatalog::standard();
        let content = HUNCHBACK.replace("name = \"AC/20\"", "name = \"Gauss Rifle\"");
        let result = UnitRegistry::parse_unit(&content, &catalog);
        match result {
            Err(ConfigError::Definition { source, .. }) => assert_eq!(
                source,
                DefinitionError::Catalog(CatalogError::NotFound("Gauss Rifle".to_string()))
            ),
            other => panic!("expected unknown weapon, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_slot_rejected() {
        let catalog = WeaponCatalog::standard();
        let content = HUNCHBACK.replace("\"Life Support\"", "\"Coffee Maker\"");
        let result = UnitRegistry::parse_unit(&content, &catalog);
        assert!(matches!(
            result,
            Err(ConfigError::Definition {
                source: DefinitionError::UnknownSlot { .. },
                ..
            })
        ));
    }

    #[test]
    fn test_odd_tonnage_needs_structure() {
        let catalog = WeaponCatalog::standard();
        let content = HUNCHBACK.replace("tonnage = 50", "tonnage = 52");
        let result = UnitRegistry::parse_unit(&content, &catalog);
        assert!(matches!(
            result,
            Err(ConfigError::Definition {
                source: DefinitionError::UnknownTonnage(52),
                ..
            })
        ));
    }

    #[test]
    fn test_load_directory() {
        let dir = TempDir::new().unwrap();
        create_test_unit(dir.path(), "hunchback.toml", HUNCHBACK);

        let nested = dir.path().join("light");
        std::fs::create_dir(&nested).unwrap();
        create_test_unit(
            &nested,
            "locust.json",
            r#"{
  "unit": { "name": "Locust LCT-1V", "tonnage": 20, "walk_mp": 8, "engine": "standard" },
  "locations": [
    { "location": "CT", "armor": 10, "rear_armor": 2 },
    { "location": "HD", "armor": 6 }
  ],
  "weapons": [ { "name": "Medium Laser", "location": "CT" } ]
}"#,
        );
        create_test_unit(dir.path(), "notes.txt", "not a unit");

        let catalog = WeaponCatalog::standard();
        let registry = UnitRegistry::load(dir.path(), &catalog).unwrap();
        assert_eq!(registry.len(), 2);
        let locust = registry.require("Locust LCT-1V").unwrap();
        assert_eq!(locust.movement.run_mp, 12);
        assert_eq!(locust.location(Location::CenterTorso).unwrap().structure, 6);
        assert!(matches!(
            registry.require("Atlas AS7-D"),
            Err(ConfigError::UnknownUnit(_))
        ));
    }

    #[test]
    fn test_load_bad_json() {
        let dir = TempDir::new().unwrap();
        create_test_unit(dir.path(), "broken.json", "{ \"unit\": ");
        let result = UnitRegistry::load(dir.path(), &WeaponCatalog::standard());
        assert!(matches!(result, Err(ConfigError::Json { .. })));
    }

    #[test]
    fn test_missing_directory_is_empty() {
        let dir = TempDir::new().unwrap();
        let registry =
            UnitRegistry::load(&dir.path().join("nowhere"), &WeaponCatalog::standard()).unwrap();
        assert!(registry.is_empty());
    }

    #[test]
    fn test_insert_validates() {
        let mut registry = UnitRegistry::new();
        assert_eq!(
            registry.insert(UnitDefinition::new("Ghost", 20)),
            Err(DefinitionError::NoLocations)
        );
        let unit = UnitDefinition::new("Post", 20)
            .with_location(LocationDefinition::new(Location::CenterTorso, 1, 1));
        registry.insert(unit).unwrap();
        assert!(registry.contains("Post"));
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["Post"]);
    }
}
