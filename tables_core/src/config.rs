use crate::location::Location;
use serde::Deserialize;

/// TOML configuration for a table set file
///
/// Every section is optional; a missing section keeps the standard table.
#[derive(Debug, Default, Deserialize)]
pub struct TableFileConfig {
    #[serde(default)]
    pub hit_location: HitLocationConfig,
    #[serde(default)]
    pub cluster: Vec<ClusterRowConfig>,
    #[serde(default)]
    pub critical: Vec<CriticalWeightConfig>,
}

/// Weighted locations per facing
#[derive(Debug, Default, Deserialize)]
pub struct HitLocationConfig {
    #[serde(default)]
    pub front: Vec<LocationWeightConfig>,
    #[serde(default)]
    pub left: Vec<LocationWeightConfig>,
    #[serde(default)]
    pub right: Vec<LocationWeightConfig>,
    #[serde(default)]
    pub rear: Vec<LocationWeightConfig>,
}

#[derive(Debug, Deserialize)]
pub struct LocationWeightConfig {
    pub location: Location,
    pub weight: u32,
}

/// One launcher size row: hits for 2d6 totals 2 through 12
#[derive(Debug, Deserialize)]
pub struct ClusterRowConfig {
    pub size: u32,
    pub hits: [u32; 11],
}

#[derive(Debug, Deserialize)]
pub struct CriticalWeightConfig {
    pub slots: u32,
    pub weight: u32,
}
