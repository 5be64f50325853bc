//! Configuration: rules data and scenario settings
//!
//! Every section has defaults, so a TOML file only needs the values it changes.

mod heat;
mod rules;
mod scenario;
mod soak;

pub use heat::{HeatBand, HeatConfig, MovementHeat};
pub use rules::{
    AttackerMovementModifiers, ProbabilityCurve, RangeModifiers, Rules, TargetMovementBand,
    ToHitConfig,
};
pub use scenario::{FirePolicy, MovementAi, ScenarioConfig};
pub use soak::{DamageProfile, SoakConfig};

use crate::error::ConfigurationError;
use serde::de::DeserializeOwned;
use std::path::Path;

/// Read and deserialize a TOML file
pub(crate) fn load_toml<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigurationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigurationError::Io {
        error: e,
        path: Some(path.to_path_buf()),
    })?;
    toml::from_str(&content).map_err(|e| ConfigurationError::Parse {
        error: e,
        path: Some(path.to_path_buf()),
    })
}

/// Deserialize a TOML string
pub(crate) fn parse_toml<T: DeserializeOwned>(content: &str) -> Result<T, ConfigurationError> {
    toml::from_str(content).map_err(|e| ConfigurationError::Parse {
        error: e,
        path: None,
    })
}
