//! Aggregate statistics over a batch of trials

use crate::engagement::{CombatEvent, TrialOutcome, Winner};
use serde::Serialize;

/// z-score for a two-sided 95% interval
pub const Z_95: f64 = 1.96;

/// Running sums over trial outcomes, reduced in trial order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Tally {
    pub trials: u32,
    pub unit_a_wins: u32,
    pub unit_b_wins: u32,
    pub mutual_kills: u32,
    pub turn_limit_draws: u32,
    structure_a: f64,
    structure_b: f64,
    remaining_a: u64,
    remaining_b: u64,
    turns: u64,
    damage_a: u64,
    damage_b: u64,
}

impl Tally {
    pub fn add(&mut self, outcome: &TrialOutcome) {
        self.trials += 1;
        match outcome.winner {
            Winner::UnitA => self.unit_a_wins += 1,
            Winner::UnitB => self.unit_b_wins += 1,
            Winner::Draw => self.mutual_kills += 1,
            Winner::TurnLimit => self.turn_limit_draws += 1,
        }
        self.structure_a += outcome.structure_fraction_a;
        self.structure_b += outcome.structure_fraction_b;
        self.remaining_a += outcome.remaining_points_a as u64;
        self.remaining_b += outcome.remaining_points_b as u64;
        self.turns += outcome.turns as u64;
        self.damage_a += outcome.damage_dealt_a as u64;
        self.damage_b += outcome.damage_dealt_b as u64;
    }

    fn mean(&self, total: f64) -> f64 {
        if self.trials == 0 {
            0.0
        } else {
            total / self.trials as f64
        }
    }
}

/// Result of a Monte Carlo run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleReport {
    pub unit_a: String,
    pub unit_b: String,
    pub unit_a_wins: u32,
    pub unit_b_wins: u32,
    /// Mutual destruction plus turn-limit draws
    pub draws: u32,
    pub turn_limit_draws: u32,
    pub total_trials: u32,
    pub mean_structure_remaining_a: f64,
    pub mean_structure_remaining_b: f64,
    /// Armor plus structure left at the end of a trial
    pub mean_remaining_points_a: f64,
    pub mean_remaining_points_b: f64,
    pub mean_turns: f64,
    pub mean_damage_dealt_a: f64,
    pub mean_damage_dealt_b: f64,
    /// Seed the batch ran under; rerunning with it reproduces the report
    pub seed: u64,
    /// False when the time budget stopped the batch early
    pub completed: bool,
    #[serde(skip)]
    pub debug_log: Option<Vec<CombatEvent>>,
}

impl BattleReport {
    pub fn from_tally(
        unit_a: &str,
        unit_b: &str,
        tally: &Tally,
        seed: u64,
        completed: bool,
        debug_log: Option<Vec<CombatEvent>>,
    ) -> Self {
        BattleReport {
            unit_a: unit_a.to_string(),
            unit_b: unit_b.to_string(),
            unit_a_wins: tally.unit_a_wins,
            unit_b_wins: tally.unit_b_wins,
            draws: tally.mutual_kills + tally.turn_limit_draws,
            turn_limit_draws: tally.turn_limit_draws,
            total_trials: tally.trials,
            mean_structure_remaining_a: tally.mean(tally.structure_a),
            mean_structure_remaining_b: tally.mean(tally.structure_b),
            mean_remaining_points_a: tally.mean(tally.remaining_a as f64),
            mean_remaining_points_b: tally.mean(tally.remaining_b as f64),
            mean_turns: tally.mean(tally.turns as f64),
            mean_damage_dealt_a: tally.mean(tally.damage_a as f64),
            mean_damage_dealt_b: tally.mean(tally.damage_b as f64),
            seed,
            completed,
            debug_log,
        }
    }

    /// Battle Value ratio of A to B, smoothed so a shutout stays finite
    pub fn bv_ratio(&self) -> f64 {
        (self.unit_a_wins as f64 + 0.5) / (self.unit_b_wins as f64 + 0.5)
    }

    /// Share of all trials unit A won
    pub fn win_rate(&self) -> f64 {
        if self.total_trials == 0 {
            return 0.0;
        }
        self.unit_a_wins as f64 / self.total_trials as f64
    }

    /// 95% Wilson score interval on unit A's win proportion
    pub fn win_rate_interval(&self) -> (f64, f64) {
        self.wilson_interval(Z_95)
    }

    pub fn wilson_interval(&self, z: f64) -> (f64, f64) {
        wilson_interval(self.unit_a_wins, self.total_trials, z)
    }
}

/// Wilson score interval for `successes` out of `trials`
pub fn wilson_interval(successes: u32, trials: u32, z: f64) -> (f64, f64) {
    if trials == 0 {
        return (0.0, 1.0);
    }
    let n = trials as f64;
    let p = successes as f64 / n;
    let z2 = z * z;
    let denominator = 1.0 + z2 / n;
    let center = (p + z2 / (2.0 * n)) / denominator;
    let margin = z * (p * (1.0 - p) / n + z2 / (4.0 * n * n)).sqrt() / denominator;
    ((center - margin).max(0.0), (center + margin).min(1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(winner: Winner, turns: u32) -> TrialOutcome {
        TrialOutcome {
            winner,
            turns,
            structure_fraction_a: 0.5,
            structure_fraction_b: 0.25,
            remaining_points_a: 50,
            remaining_points_b: 20,
            damage_dealt_a: 80,
            damage_dealt_b: 40,
        }
    }

    #[test]
    fn test_tally_means() {
        let mut tally = Tally::default();
        tally.add(&outcome(Winner::UnitA, 4));
        tally.add(&outcome(Winner::UnitB, 6));
        tally.add(&outcome(Winner::Draw, 5));
        tally.add(&outcome(Winner::TurnLimit, 5));

        let report = BattleReport::from_tally("A", "B", &tally, 7, true, None);
        assert_eq!(report.total_trials, 4);
        assert_eq!(report.draws, 2);
        assert_eq!(report.turn_limit_draws, 1);
        assert_eq!(report.mean_turns, 5.0);
        assert_eq!(report.mean_structure_remaining_a, 0.5);
        assert_eq!(report.mean_damage_dealt_b, 40.0);
        assert_eq!(report.mean_remaining_points_a, 50.0);
        assert_eq!(report.mean_remaining_points_b, 20.0);
        assert_eq!(report.win_rate(), 0.25);
    }

    #[test]
    fn test_bv_ratio_smoothing() {
        let mut tally = Tally::default();
        for _ in 0..10 {
            tally.add(&outcome(Winner::UnitA, 3));
        }
        let report = BattleReport::from_tally("A", "B", &tally, 0, true, None);
        assert_eq!(report.bv_ratio(), 21.0);
    }

    #[test]
    fn test_wilson_interval() {
        let (low, high) = wilson_interval(50, 100, Z_95);
        assert!((low - 0.4038).abs() < 1e-3);
        assert!((high - 0.5962).abs() < 1e-3);

        let (low, high) = wilson_interval(0, 20, Z_95);
        assert!(low < 1e-9);
        assert!(high > 0.0 && high < 0.2);

        assert_eq!(wilson_interval(0, 0, Z_95), (0.0, 1.0));
    }

    #[test]
    fn test_report_serializes_without_log() {
        let tally = Tally::default();
        let report = BattleReport::from_tally("A", "B", &tally, 1, false, Some(Vec::new()));
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("debug_log").is_none());
        assert_eq!(json["completed"], false);
    }
}
