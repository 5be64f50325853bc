use crate::weapon::{standard_weapons, WeaponInstance};
use crate::{CatalogError, ConfigError};
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct WeaponFileConfig {
    #[serde(default)]
    weapons: Vec<WeaponInstance>,
}

/// Registry of weapon properties, read-only once loading is done
#[derive(Debug, Clone, Default)]
pub struct WeaponCatalog {
    weapons: HashMap<String, WeaponInstance>,
}

impl WeaponCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog holding the standard weapon set
    pub fn standard() -> Self {
        let weapons = standard_weapons()
            .into_iter()
            .map(|w| (w.name.clone(), w))
            .collect();
        WeaponCatalog { weapons }
    }

    /// Add or replace a weapon after validating it
    pub fn register(&mut self, weapon: WeaponInstance) -> Result<(), CatalogError> {
        weapon.validate().map_err(|reason| CatalogError::Invalid {
            name: weapon.name.clone(),
            reason,
        })?;
        self.weapons.insert(weapon.name.clone(), weapon);
        Ok(())
    }

    /// Weapon by exact name
    pub fn lookup(&self, name: &str) -> Result<&WeaponInstance, CatalogError> {
        self.weapons
            .get(name)
            .ok_or_else(|| CatalogError::NotFound(name.to_string()))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.weapons.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.weapons.keys().map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.weapons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weapons.is_empty()
    }

    /// Register every `[[weapons]]` entry of a TOML file, returning how many were added
    pub fn load_file(&mut self, path: &Path) -> Result<usize, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;
        self.register_toml(&content, Some(path))
    }

    /// Register every `[[weapons]]` entry of a TOML string
    pub fn parse(&mut self, content: &str) -> Result<usize, ConfigError> {
        self.register_toml(content, None)
    }

    fn register_toml(&mut self, content: &str, path: Option<&Path>) -> Result<usize, ConfigError> {
        let config: WeaponFileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            error: e,
            path: path.map(Path::to_path_buf),
        })?;

        let count = config.weapons.len();
        for weapon in config.weapons {
            self.register(weapon).map_err(|e| ConfigError::Catalog {
                source: e,
                path: path.map(Path::to_path_buf),
            })?;
        }
        Ok(count)
    }
}
