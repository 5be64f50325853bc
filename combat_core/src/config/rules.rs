//! To-hit modifiers and the full rules bundle

use super::heat::HeatConfig;
use super::{load_toml, parse_toml};
use crate::error::ConfigurationError;
use crate::unit::MovementMode;
use mech_core::RangeBracket;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tables_core::dice::probability_at_least;
use tables_core::TableSet;

/// Everything a trial needs besides the two units and the scenario
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Rules {
    pub tables: TableSet,
    pub to_hit: ToHitConfig,
    pub heat: HeatConfig,
}

#[derive(Debug, Default, Deserialize)]
struct RulesFileConfig {
    #[serde(default)]
    to_hit: ToHitConfig,
    #[serde(default)]
    heat: HeatConfig,
}

impl Rules {
    /// Standard rules
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rules from a TOML file
    ///
    /// One file may carry `[to_hit]`, `[heat]` and the table sections together.
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let config: RulesFileConfig = load_toml(path)?;
        let tables = TableSet::load(path)?;
        Self::from_parts(tables, config)
    }

    /// Parse rules from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigurationError> {
        let config: RulesFileConfig = parse_toml(content)?;
        let tables = TableSet::parse(content)?;
        Self::from_parts(tables, config)
    }

    fn from_parts(tables: TableSet, config: RulesFileConfig) -> Result<Self, ConfigurationError> {
        let rules = Rules {
            tables,
            to_hit: config.to_hit,
            heat: config.heat,
        };
        rules.validate()?;
        Ok(rules)
    }

    /// Replace the to-hit probability curve
    pub fn with_curve(mut self, curve: ProbabilityCurve) -> Self {
        self.to_hit.curve = curve;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.to_hit.validate().map_err(ConfigurationError::Rules)?;
        self.heat.validate().map_err(ConfigurationError::Rules)?;
        Ok(())
    }
}

/// Maps a target number to a hit probability
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProbabilityCurve {
    /// Chance of rolling at least the target number on 2d6
    TwoD6 {
        #[serde(default = "default_true")]
        natural_two_misses: bool,
    },
    /// Fixed probability regardless of modifiers
    Constant { probability: f64 },
}

impl Default for ProbabilityCurve {
    fn default() -> Self {
        ProbabilityCurve::TwoD6 {
            natural_two_misses: true,
        }
    }
}

impl ProbabilityCurve {
    pub fn always_hit() -> Self {
        ProbabilityCurve::Constant { probability: 1.0 }
    }

    pub fn probability(&self, target_number: i32) -> f64 {
        match self {
            ProbabilityCurve::TwoD6 { natural_two_misses } => {
                let needed = if *natural_two_misses {
                    target_number.max(3)
                } else {
                    target_number
                };
                probability_at_least(needed)
            }
            ProbabilityCurve::Constant { probability } => *probability,
        }
    }
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RangeModifiers {
    pub short: i32,
    pub medium: i32,
    pub long: i32,
}

impl Default for RangeModifiers {
    fn default() -> Self {
        RangeModifiers {
            short: 0,
            medium: 2,
            long: 4,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackerMovementModifiers {
    pub stand: i32,
    pub walk: i32,
    pub run: i32,
    pub jump: i32,
}

impl Default for AttackerMovementModifiers {
    fn default() -> Self {
        AttackerMovementModifiers {
            stand: 0,
            walk: 1,
            run: 2,
            jump: 3,
        }
    }
}

/// Modifier applying from `min_hexes` moved up to the next band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetMovementBand {
    pub min_hexes: u32,
    pub modifier: i32,
}

fn default_target_movement() -> Vec<TargetMovementBand> {
    [(0, 0), (3, 1), (5, 2), (7, 3), (10, 4), (18, 5), (25, 6)]
        .into_iter()
        .map(|(min_hexes, modifier)| TargetMovementBand {
            min_hexes,
            modifier,
        })
        .collect()
}

fn default_immobile_target() -> i32 {
    -4
}

/// To-hit modifier tables and probability curve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToHitConfig {
    #[serde(default)]
    pub range: RangeModifiers,
    #[serde(default)]
    pub attacker_movement: AttackerMovementModifiers,
    #[serde(default = "default_target_movement")]
    pub target_movement: Vec<TargetMovementBand>,
    /// Applied instead of the movement table when the target is shut down
    #[serde(default = "default_immobile_target")]
    pub immobile_target: i32,
    #[serde(default)]
    pub curve: ProbabilityCurve,
}

impl Default for ToHitConfig {
    fn default() -> Self {
        ToHitConfig {
            range: RangeModifiers::default(),
            attacker_movement: AttackerMovementModifiers::default(),
            target_movement: default_target_movement(),
            immobile_target: default_immobile_target(),
            curve: ProbabilityCurve::default(),
        }
    }
}

impl ToHitConfig {
    /// Range modifier, or `None` when the target is out of range
    pub fn range_modifier(&self, bracket: RangeBracket) -> Option<i32> {
        match bracket {
            RangeBracket::Minimum { shortfall } => Some(self.range.short + shortfall as i32),
            RangeBracket::Short => Some(self.range.short),
            RangeBracket::Medium => Some(self.range.medium),
            RangeBracket::Long => Some(self.range.long),
            RangeBracket::OutOfRange => None,
        }
    }

    pub fn attacker_movement_modifier(&self, mode: MovementMode) -> i32 {
        match mode {
            MovementMode::Stand => self.attacker_movement.stand,
            MovementMode::Walk => self.attacker_movement.walk,
            MovementMode::Run => self.attacker_movement.run,
            MovementMode::Jump => self.attacker_movement.jump,
        }
    }

    pub fn target_movement_modifier(&self, hexes_moved: u32) -> i32 {
        self.target_movement
            .iter()
            .rev()
            .find(|band| hexes_moved >= band.min_hexes)
            .map(|band| band.modifier)
            .unwrap_or(0)
    }

    pub fn validate(&self) -> Result<(), String> {
        match self.target_movement.first() {
            Some(first) if first.min_hexes == 0 => {}
            _ => return Err("target movement table must start at 0 hexes".to_string()),
        }
        if self
            .target_movement
            .windows(2)
            .any(|w| w[1].min_hexes <= w[0].min_hexes)
        {
            return Err("target movement bands must be strictly increasing".to_string());
        }
        if let ProbabilityCurve::Constant { probability } = self.curve {
            if !(0.0..=1.0).contains(&probability) {
                return Err(format!("constant hit probability {} outside [0, 1]", probability));
            }
        }
        Ok(())
    }
}
