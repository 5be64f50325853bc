//! mech_core - Weapon catalog and combat unit definitions
//!
//! Definitions are immutable once built. Combat code creates fresh per-trial
//! state from them and never writes back.

mod catalog;
mod config;
mod definition;
mod registry;
mod weapon;

pub use catalog::WeaponCatalog;
pub use config::{LocationConfig, MountConfig, UnitFileConfig, UnitHeaderConfig};
pub use definition::{
    Component, EngineType, LocationDefinition, MountedWeapon, Movement, UnitDefinition,
};
pub use registry::UnitRegistry;
pub use weapon::{standard_weapons, RangeBracket, WeaponInstance};

use std::path::PathBuf;
use tables_core::Location;
use thiserror::Error;

/// Weapon catalog failure
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CatalogError {
    #[error("Unknown weapon: {0}")]
    NotFound(String),
    #[error("Invalid weapon '{name}': {reason}")]
    Invalid { name: String, reason: String },
}

/// A unit definition that cannot be fought with
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DefinitionError {
    #[error("Unit has no locations")]
    NoLocations,
    #[error("Location {0} is defined twice")]
    DuplicateLocation(Location),
    #[error("Unit has no vital location")]
    NoVitalLocation,
    #[error("Location {0} has no internal structure")]
    ZeroStructure(Location),
    #[error("No standard internal structure for {0} tons")]
    UnknownTonnage(u32),
    #[error("Weapon '{weapon}' is mounted in missing location {location}")]
    MissingLocation { weapon: String, location: Location },
    #[error("Slot in {location} refers to weapon index {index}, which is not mounted")]
    BadSlotReference { location: Location, index: usize },
    #[error("Ammo slot for '{0}', which takes no ammunition")]
    AmmoWithoutAmmoWeapon(String),
    #[error("Unknown slot '{slot}' in {location}")]
    UnknownSlot { location: Location, slot: String },
    #[error("Slot '{slot}' in {location} has no unassigned weapon of that name there")]
    SlotWithoutWeapon { location: Location, slot: String },
    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Error loading weapon or unit configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path:?}': {error}")]
    Parse {
        error: toml::de::Error,
        path: Option<PathBuf>,
    },
    #[error("JSON error in '{path:?}': {error}")]
    Json {
        error: serde_json::Error,
        path: Option<PathBuf>,
    },
    #[error("Invalid weapon data in '{path:?}': {source}")]
    Catalog {
        source: CatalogError,
        path: Option<PathBuf>,
    },
    #[error("Invalid unit '{unit}' in '{path:?}': {source}")]
    Definition {
        unit: String,
        source: DefinitionError,
        path: Option<PathBuf>,
    },
    #[error("Unknown unit: {0}")]
    UnknownUnit(String),
}
