//! Error taxonomy for the combat engine

use mech_core::{CatalogError, DefinitionError};
use std::path::PathBuf;
use tables_core::Location;
use thiserror::Error;

/// Bad input, detected before any trial runs
#[derive(Debug, Error)]
pub enum ConfigurationError {
    #[error(transparent)]
    Tables(#[from] tables_core::ConfigError),
    #[error(transparent)]
    Units(#[from] mech_core::ConfigError),
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error("Unit '{unit}' cannot be fought with: {source}")]
    Definition {
        unit: String,
        source: DefinitionError,
    },
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
    #[error("Invalid rules: {0}")]
    Rules(String),
    #[error("Invalid scenario: {0}")]
    Scenario(String),
    #[error("Invalid soak settings: {0}")]
    Soak(String),
}

/// Engine bug: state the rules can never produce
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvariantViolation {
    #[error("{attacker} attacked {target}, which is already destroyed")]
    AttackOnDestroyedUnit { attacker: String, target: String },
    #[error("{unit} has no weapon at index {index}")]
    WeaponIndexOutOfRange { unit: String, index: usize },
    #[error("{unit} has no location to absorb a hit on {location}")]
    NoLocation { unit: String, location: Location },
}

/// Anything that aborts a run
#[derive(Debug, Error)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),
    #[error("Invariant violated: {0}")]
    Invariant(#[from] InvariantViolation),
    #[error("Failed to seed from OS entropy: {0}")]
    Entropy(#[from] rand::Error),
}
