use crate::definition::EngineType;
use serde::Deserialize;
use tables_core::Location;

fn default_gunnery() -> u32 {
    4
}

fn default_heat_sinks() -> u32 {
    10
}

/// One unit file: a `[unit]` header plus `[[locations]]` and `[[weapons]]`
#[derive(Debug, Deserialize)]
pub struct UnitFileConfig {
    pub unit: UnitHeaderConfig,
    #[serde(default)]
    pub locations: Vec<LocationConfig>,
    #[serde(default)]
    pub weapons: Vec<MountConfig>,
}

#[derive(Debug, Deserialize)]
pub struct UnitHeaderConfig {
    pub name: String,
    pub tonnage: u32,
    pub walk_mp: u32,
    /// Defaults to one and a half times walking, rounded up
    pub run_mp: Option<u32>,
    #[serde(default)]
    pub jump_mp: u32,
    #[serde(default = "default_gunnery")]
    pub gunnery: u32,
    #[serde(default = "default_heat_sinks")]
    pub heat_sinks: u32,
    #[serde(default)]
    pub double_heat_sinks: bool,
    #[serde(default)]
    pub engine: EngineType,
}

#[derive(Debug, Deserialize)]
pub struct LocationConfig {
    pub location: Location,
    pub armor: u32,
    #[serde(default)]
    pub rear_armor: u32,
    /// Defaults to the standard structure for the unit's tonnage
    pub structure: Option<u32>,
    /// Slot names; a weapon name fills as many slots as the weapon occupies
    #[serde(default)]
    pub slots: Vec<String>,
    #[serde(default)]
    pub case: bool,
    pub vital: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct MountConfig {
    pub name: String,
    pub location: Location,
    pub ammo: Option<u32>,
}
