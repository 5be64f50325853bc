//! One engagement between two units, played turn by turn to a terminal state

mod events;
mod movement;
mod simulation;

pub use events::{AttackEvent, CombatEvent, EventSink, NullSink, StatusEvent, StatusKind};
pub use movement::{
    charge, heat_neutral_damage, optimal_movement, preferred_range, walk, MovementPlan,
};
pub use simulation::run_trial;

use crate::config::ScenarioConfig;
use serde::Serialize;
use tables_core::Facing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Side {
    A,
    B,
}

impl Side {
    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

/// Range and turn bookkeeping for one trial
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngagementState {
    pub range: u32,
    pub turn: u32,
    /// Facing every attack strikes
    pub facing: Facing,
    pub terminal: bool,
}

impl EngagementState {
    pub fn new(scenario: &ScenarioConfig) -> Self {
        EngagementState {
            range: scenario.initial_distance,
            turn: 0,
            facing: scenario.facing,
            terminal: false,
        }
    }

    /// Close by `rate` hexes without going below `floor`
    ///
    /// A range already inside the floor is held where it is.
    pub fn close(&mut self, rate: u32, floor: u32) {
        if self.range > floor {
            self.range = self.range.saturating_sub(rate).max(floor);
        }
    }

    /// Move the units `closure` hexes nearer, or apart when negative
    pub fn shift(&mut self, closure: i64, floor: u32) {
        let hexes = u32::try_from(closure.unsigned_abs()).unwrap_or(u32::MAX);
        if closure > 0 {
            self.close(hexes, floor);
        } else {
            self.range = self.range.saturating_add(hexes);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Winner {
    UnitA,
    UnitB,
    /// Both units destroyed in the same turn
    Draw,
    /// Neither unit destroyed when the turn ceiling was reached
    TurnLimit,
}

/// Result of one trial
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrialOutcome {
    pub winner: Winner,
    pub turns: u32,
    pub structure_fraction_a: f64,
    pub structure_fraction_b: f64,
    pub remaining_points_a: u32,
    pub remaining_points_b: u32,
    /// Armor and structure removed by each side's weapons
    pub damage_dealt_a: u32,
    pub damage_dealt_b: u32,
}
