use super::{load_toml, parse_toml};
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tables_core::Facing;

/// How a unit picks which eligible weapons to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FirePolicy {
    /// Fire every eligible weapon
    #[default]
    All,
    /// Fire the most heat-efficient weapons while projected end-of-turn heat
    /// stays within `tolerance`; at least one weapon always fires
    HeatBudget { tolerance: u32 },
}

impl FirePolicy {
    pub fn heat_budget() -> Self {
        FirePolicy::HeatBudget { tolerance: 5 }
    }
}

/// How the units manage the range between them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MovementAi {
    /// Both walk; the range never changes
    Static,
    /// Both walk; the range closes by `closing_rate` each turn after the first
    #[default]
    Closure,
    /// The unit ahead at the current range kites, the other charges
    Optimal,
}

/// Settings for one Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub fights: u32,
    pub initial_distance: u32,
    /// Hexes closed per turn after the first
    pub closing_rate: u32,
    pub max_turns: u32,
    /// Record an event log for the first trial
    pub debug: bool,
    /// Closing stops at this distance
    pub min_range: u32,
    pub facing: Facing,
    pub fire_policy: FirePolicy,
    pub movement_ai: MovementAi,
    /// Absent seeds come from OS entropy
    pub seed: Option<u64>,
    pub parallel: bool,
    /// Wall-clock budget checked between trials
    pub time_budget_ms: Option<u64>,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        ScenarioConfig {
            fights: 1000,
            initial_distance: 6,
            closing_rate: 0,
            max_turns: 50,
            debug: false,
            min_range: 1,
            facing: Facing::Front,
            fire_policy: FirePolicy::All,
            movement_ai: MovementAi::Closure,
            seed: None,
            parallel: false,
            time_budget_ms: None,
        }
    }
}

impl ScenarioConfig {
    /// Load a scenario from a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let scenario: ScenarioConfig = load_toml(path)?;
        scenario.validate()?;
        Ok(scenario)
    }

    /// Parse a scenario from a TOML string
    pub fn parse(content: &str) -> Result<Self, ConfigurationError> {
        let scenario: ScenarioConfig = parse_toml(content)?;
        scenario.validate()?;
        Ok(scenario)
    }

    pub fn with_fights(mut self, fights: u32) -> Self {
        self.fights = fights;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn time_budget(&self) -> Option<Duration> {
        self.time_budget_ms.map(Duration::from_millis)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        if self.fights == 0 {
            return Err(ConfigurationError::Scenario(
                "fights must be greater than 0".to_string(),
            ));
        }
        if self.max_turns == 0 {
            return Err(ConfigurationError::Scenario(
                "max_turns must be greater than 0".to_string(),
            ));
        }
        if self.time_budget_ms == Some(0) {
            return Err(ConfigurationError::Scenario(
                "time budget must be positive when set".to_string(),
            ));
        }
        Ok(())
    }
}
