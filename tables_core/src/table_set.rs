use crate::cluster::ClusterTable;
use crate::config::{LocationWeightConfig, TableFileConfig};
use crate::critical::CriticalTable;
use crate::hit_location::HitLocationTable;
use crate::location::Location;
use crate::threshold::ThresholdTable;
use crate::{ConfigError, TableError};
use std::path::Path;

/// The full set of probability tables used by one ruleset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSet {
    pub hit_location: HitLocationTable,
    pub cluster: ClusterTable,
    pub critical: CriticalTable,
}

impl TableSet {
    /// Standard tabletop tables
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a table set from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            error: e,
            path: Some(path.to_path_buf()),
        })?;

        let config: TableFileConfig = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            error: e,
            path: Some(path.to_path_buf()),
        })?;

        Self::from_config(config).map_err(|e| ConfigError::Validation {
            message: e.to_string(),
            path: Some(path.to_path_buf()),
        })
    }

    /// Parse a table set from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: TableFileConfig = toml::from_str(content).map_err(|e| ConfigError::Parse {
            error: e,
            path: None,
        })?;

        Self::from_config(config).map_err(|e| ConfigError::Validation {
            message: e.to_string(),
            path: None,
        })
    }

    /// Build from config, keeping standard tables for omitted sections
    pub fn from_config(config: TableFileConfig) -> Result<Self, TableError> {
        let mut set = TableSet::default();

        let hit = config.hit_location;
        override_facing(&mut set.hit_location.front, hit.front)?;
        override_facing(&mut set.hit_location.left, hit.left)?;
        override_facing(&mut set.hit_location.right, hit.right)?;
        override_facing(&mut set.hit_location.rear, hit.rear)?;

        if !config.cluster.is_empty() {
            set.cluster =
                ClusterTable::from_rows(config.cluster.into_iter().map(|r| (r.size, r.hits)))?;
        }

        if !config.critical.is_empty() {
            let severity = ThresholdTable::from_weights(
                config.critical.into_iter().map(|c| (c.slots, c.weight)),
            )?;
            set.critical = CriticalTable::new(severity);
        }

        Ok(set)
    }
}

fn override_facing(
    table: &mut ThresholdTable<Location>,
    weights: Vec<LocationWeightConfig>,
) -> Result<(), TableError> {
    if weights.is_empty() {
        return Ok(());
    }
    *table = ThresholdTable::from_weights(weights.into_iter().map(|w| (w.location, w.weight)))?;
    Ok(())
}
