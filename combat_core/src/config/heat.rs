use crate::unit::MovementMode;
use serde::{Deserialize, Serialize};

/// Effects applying from `min_heat` up to the next band
///
/// Avoid numbers are 2d6 targets: rolling below one triggers the effect.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeatBand {
    pub min_heat: u32,
    #[serde(default)]
    pub to_hit: i32,
    #[serde(default)]
    pub mp_penalty: u32,
    #[serde(default)]
    pub shutdown_avoid: Option<u8>,
    #[serde(default)]
    pub ammo_avoid: Option<u8>,
    #[serde(default)]
    pub automatic_shutdown: bool,
}

impl HeatBand {
    fn new(min_heat: u32, to_hit: i32, mp_penalty: u32) -> Self {
        HeatBand {
            min_heat,
            to_hit,
            mp_penalty,
            shutdown_avoid: None,
            ammo_avoid: None,
            automatic_shutdown: false,
        }
    }
}

fn default_bands() -> Vec<HeatBand> {
    vec![
        HeatBand::new(5, 1, 1),
        HeatBand {
            shutdown_avoid: Some(6),
            ..HeatBand::new(10, 2, 2)
        },
        HeatBand {
            shutdown_avoid: Some(8),
            ammo_avoid: Some(6),
            ..HeatBand::new(15, 3, 3)
        },
        HeatBand {
            automatic_shutdown: true,
            ..HeatBand::new(20, 4, 4)
        },
    ]
}

fn default_restart_chance() -> f64 {
    0.5
}

fn default_engine_hit_heat() -> u32 {
    5
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementHeat {
    pub walk: u32,
    pub run: u32,
    /// Jumping costs one heat per jump MP, never less than this
    pub jump_minimum: u32,
}

impl Default for MovementHeat {
    fn default() -> Self {
        MovementHeat {
            walk: 1,
            run: 2,
            jump_minimum: 3,
        }
    }
}

/// Heat scale, recovery and per-source heat costs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HeatConfig {
    #[serde(default = "default_bands")]
    pub bands: Vec<HeatBand>,
    /// Chance per heat phase that a shut-down unit restarts
    #[serde(default = "default_restart_chance")]
    pub restart_chance: f64,
    /// Extra heat per turn for each engine critical
    #[serde(default = "default_engine_hit_heat")]
    pub engine_hit_heat: u32,
    #[serde(default)]
    pub movement: MovementHeat,
}

impl Default for HeatConfig {
    fn default() -> Self {
        HeatConfig {
            bands: default_bands(),
            restart_chance: default_restart_chance(),
            engine_hit_heat: default_engine_hit_heat(),
            movement: MovementHeat::default(),
        }
    }
}

impl HeatConfig {
    /// Highest band reached at this heat level; `None` below the first band
    pub fn band(&self, heat: u32) -> Option<&HeatBand> {
        self.bands.iter().rev().find(|band| heat >= band.min_heat)
    }

    pub fn to_hit_penalty(&self, heat: u32) -> i32 {
        self.band(heat).map_or(0, |band| band.to_hit)
    }

    pub fn mp_penalty(&self, heat: u32) -> u32 {
        self.band(heat).map_or(0, |band| band.mp_penalty)
    }

    pub fn is_automatic_shutdown(&self, heat: u32) -> bool {
        self.band(heat).is_some_and(|band| band.automatic_shutdown)
    }

    pub fn movement_heat(&self, mode: MovementMode, jump_mp: u32) -> u32 {
        match mode {
            MovementMode::Stand => 0,
            MovementMode::Walk => self.movement.walk,
            MovementMode::Run => self.movement.run,
            MovementMode::Jump => jump_mp.max(self.movement.jump_minimum),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if !(0.0..=1.0).contains(&self.restart_chance) {
            return Err(format!(
                "restart chance {} outside [0, 1]",
                self.restart_chance
            ));
        }
        if self.bands.windows(2).any(|w| w[1].min_heat <= w[0].min_heat) {
            return Err("heat bands must be strictly increasing".to_string());
        }
        for band in &self.bands {
            for avoid in [band.shutdown_avoid, band.ammo_avoid].into_iter().flatten() {
                if !(2..=13).contains(&avoid) {
                    return Err(format!(
                        "avoid number {} at heat {} outside 2-13",
                        avoid, band.min_heat
                    ));
                }
            }
        }
        Ok(())
    }
}
