//! Movement selection and range management

use super::EngagementState;
use crate::config::{MovementAi, Rules, ScenarioConfig};
use crate::unit::{MovementMode, MovementState, UnitState};
use std::cmp::Ordering;

/// Movement chosen for both units and the resulting change in range
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MovementPlan {
    pub movement: [MovementState; 2],
    /// Hexes the units end nearer to each other; negative opens the range
    pub closure: i64,
}

/// Damage per turn a unit can keep up at `range` without building heat
///
/// Ready weapons that reach the target are taken in damage-per-heat order
/// until dissipation is spent; the weapon that crosses the limit counts in
/// proportion. Heatless weapons always count in full.
pub fn heat_neutral_damage(unit: &UnitState<'_>, range: u32) -> f64 {
    let definition = unit.definition();
    let mut weapons: Vec<_> = definition
        .weapons
        .iter()
        .enumerate()
        .filter(|(i, mount)| unit.weapon_ready(*i) && mount.weapon.in_range(range))
        .map(|(_, mount)| &mount.weapon)
        .collect();
    weapons.sort_by(|x, y| {
        y.damage_per_heat()
            .partial_cmp(&x.damage_per_heat())
            .unwrap_or(Ordering::Equal)
    });

    let mut budget = unit.dissipation() as f64;
    let mut damage = 0.0;
    for weapon in weapons {
        let full = weapon.max_damage() as f64;
        if weapon.heat == 0 {
            damage += full;
            continue;
        }
        if budget <= 0.0 {
            break;
        }
        let share = (budget / weapon.heat as f64).min(1.0);
        damage += full * share;
        budget -= weapon.heat as f64 * share;
    }
    damage
}

/// Range at which `unit` out-damages `opponent` by the widest margin
///
/// Searches from one hex out to the longest reach of either unit. The nearest
/// of equally good ranges wins.
pub fn preferred_range(unit: &UnitState<'_>, opponent: &UnitState<'_>) -> u32 {
    let reach = unit
        .definition()
        .weapons
        .iter()
        .chain(&opponent.definition().weapons)
        .map(|mount| mount.weapon.long_range)
        .max()
        .unwrap_or(0)
        .max(1);

    let mut best = (1, f64::NEG_INFINITY);
    for range in 1..=reach {
        let advantage = heat_neutral_damage(unit, range) - heat_neutral_damage(opponent, range);
        if advantage > best.1 {
            best = (range, advantage);
        }
    }
    best.0
}

/// Walking, running and jumping MP left after the heat penalty
fn speeds(unit: &UnitState<'_>, rules: &Rules) -> (u32, u32, u32) {
    if unit.is_destroyed() || unit.is_shut_down() {
        return (0, 0, 0);
    }
    let movement = unit.definition().movement;
    let penalty = rules.heat.mp_penalty(unit.heat.level);
    (
        movement.walk_mp.saturating_sub(penalty),
        movement.run_mp.saturating_sub(penalty),
        movement.jump_mp.saturating_sub(penalty),
    )
}

fn moving(mode: MovementMode, hexes: u32) -> MovementState {
    if hexes == 0 {
        MovementState::default()
    } else {
        MovementState { mode, hexes }
    }
}

/// Walk at full speed less the heat penalty; shut-down units stand still
pub fn walk(unit: &UnitState<'_>, rules: &Rules) -> MovementState {
    let (walk, _, _) = speeds(unit, rules);
    moving(MovementMode::Walk, walk)
}

/// Fastest way across the ground: jump when it covers more than running
pub fn charge(unit: &UnitState<'_>, rules: &Rules) -> MovementState {
    let (_, run, jump) = speeds(unit, rules);
    if jump > run {
        moving(MovementMode::Jump, jump)
    } else {
        moving(MovementMode::Run, run)
    }
}

/// Range-seeking movement for both units at the current `range`
///
/// The unit with the better heat-neutral damage walks away while the other
/// charges. When neither has the edge, each walks toward its preferred range.
pub fn optimal_movement(
    a: &UnitState<'_>,
    b: &UnitState<'_>,
    range: u32,
    rules: &Rules,
) -> MovementPlan {
    let damage_a = heat_neutral_damage(a, range);
    let damage_b = heat_neutral_damage(b, range);

    match damage_a.partial_cmp(&damage_b).unwrap_or(Ordering::Equal) {
        Ordering::Greater => {
            let (kite, rush) = (walk(a, rules), charge(b, rules));
            MovementPlan {
                movement: [kite, rush],
                closure: rush.hexes as i64 - kite.hexes as i64,
            }
        }
        Ordering::Less => {
            let (rush, kite) = (charge(a, rules), walk(b, rules));
            MovementPlan {
                movement: [rush, kite],
                closure: rush.hexes as i64 - kite.hexes as i64,
            }
        }
        Ordering::Equal => {
            let movement = [walk(a, rules), walk(b, rules)];
            let closure: i64 = [(a, b, movement[0]), (b, a, movement[1])]
                .iter()
                .map(|(unit, opponent, step)| {
                    let hexes = step.hexes as i64;
                    match range.cmp(&preferred_range(unit, opponent)) {
                        Ordering::Greater => hexes,
                        Ordering::Less => -hexes,
                        Ordering::Equal => 0,
                    }
                })
                .sum();
            MovementPlan { movement, closure }
        }
    }
}

/// Set both units' movement for the turn and move the range accordingly
pub(super) fn plan_movement(
    units: &mut [UnitState<'_>; 2],
    engagement: &mut EngagementState,
    scenario: &ScenarioConfig,
    rules: &Rules,
) {
    match scenario.movement_ai {
        MovementAi::Static | MovementAi::Closure => {
            if scenario.movement_ai == MovementAi::Closure && engagement.turn > 1 {
                engagement.close(scenario.closing_rate, scenario.min_range);
            }
            for unit in units.iter_mut() {
                unit.movement = walk(unit, rules);
            }
        }
        MovementAi::Optimal => {
            let plan = optimal_movement(&units[0], &units[1], engagement.range, rules);
            for (unit, movement) in units.iter_mut().zip(plan.movement) {
                unit.movement = movement;
            }
            engagement.shift(plan.closure, scenario.min_range);
            tracing::trace!(
                turn = engagement.turn,
                closure = plan.closure,
                range = engagement.range,
                "range-seeking movement"
            );
        }
    }
}
