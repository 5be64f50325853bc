//! Turn loop: movement, simultaneous fire, heat, termination

use super::events::{AttackEvent, CombatEvent, EventSink, StatusEvent, StatusKind};
use super::movement::plan_movement;
use super::{EngagementState, Side, TrialOutcome, Winner};
use crate::combat::{resolve_attack, AttackResult};
use crate::config::{FirePolicy, Rules, ScenarioConfig};
use crate::error::InvariantViolation;
use crate::heat::{resolve_heat, HeatReport};
use crate::unit::UnitState;
use mech_core::UnitDefinition;
use rand::Rng;
use std::cmp::Ordering;
use tables_core::Location;

/// Play one engagement from fresh state to a terminal condition
///
/// Unit A's weapons resolve before unit B's each turn, but both firing sets
/// are fixed when the attack phase starts, so a unit destroyed mid-phase
/// still returns fire. Attacks whose target is already destroyed are skipped
/// without touching the random source.
pub fn run_trial<R, S>(
    unit_a: &UnitDefinition,
    unit_b: &UnitDefinition,
    scenario: &ScenarioConfig,
    rules: &Rules,
    rng: &mut R,
    sink: &mut S,
) -> Result<TrialOutcome, InvariantViolation>
where
    R: Rng + ?Sized,
    S: EventSink + ?Sized,
{
    let mut units = [UnitState::new(unit_a), UnitState::new(unit_b)];
    let mut engagement = EngagementState::new(scenario);
    let mut damage_dealt = [0u32; 2];

    let winner = loop {
        engagement.turn += 1;
        plan_movement(&mut units, &mut engagement, scenario, rules);
        if sink.enabled() {
            for side in [Side::A, Side::B] {
                let unit = &units[side.index()];
                let kind = StatusKind::Moved {
                    mode: unit.movement.mode,
                    hexes: unit.movement.hexes,
                    range: engagement.range,
                };
                sink.record(status(engagement.turn, side, unit, kind));
            }
        }

        let plans = [
            fire_plan(&units[0], &units[1], &engagement, scenario, rules),
            fire_plan(&units[1], &units[0], &engagement, scenario, rules),
        ];

        for side in [Side::A, Side::B] {
            for &weapon in &plans[side.index()] {
                let (attacker, target) = pair(&mut units, side);
                if target.is_destroyed() {
                    continue;
                }
                let result =
                    resolve_attack(attacker, weapon, target, &engagement, rules, rng)?;
                damage_dealt[side.index()] += result.total_damage();
                if sink.enabled() {
                    record_attack(sink, engagement.turn, attacker, side, &result);
                }
            }
        }

        for side in [Side::A, Side::B] {
            let unit = &mut units[side.index()];
            if unit.is_destroyed() {
                continue;
            }
            let report = resolve_heat(unit, &rules.heat, rng)?;
            if sink.enabled() {
                record_heat(sink, engagement.turn, unit, side, &report);
            }
        }

        if sink.enabled() {
            for side in [Side::A, Side::B] {
                let unit = &units[side.index()];
                if let Some(cause) = unit.destroyed {
                    sink.record(status(engagement.turn, side, unit, StatusKind::Destroyed { cause }));
                }
            }
        }

        match (units[0].is_destroyed(), units[1].is_destroyed()) {
            (true, true) => break Winner::Draw,
            (false, true) => break Winner::UnitA,
            (true, false) => break Winner::UnitB,
            (false, false) if engagement.turn >= scenario.max_turns => break Winner::TurnLimit,
            (false, false) => {}
        }
    };
    engagement.terminal = true;

    let [a, b] = &units;
    let outcome = TrialOutcome {
        winner,
        turns: engagement.turn,
        structure_fraction_a: a.structure_fraction(),
        structure_fraction_b: b.structure_fraction(),
        remaining_points_a: a.remaining_points(),
        remaining_points_b: b.remaining_points(),
        damage_dealt_a: damage_dealt[0],
        damage_dealt_b: damage_dealt[1],
    };

    tracing::debug!(
        winner = ?outcome.winner,
        turns = outcome.turns,
        structure_a = outcome.structure_fraction_a,
        structure_b = outcome.structure_fraction_b,
        "trial finished"
    );

    Ok(outcome)
}

/// Attacker and target for `side`, borrowed together
fn pair<'a, 'd>(
    units: &'a mut [UnitState<'d>; 2],
    side: Side,
) -> (&'a mut UnitState<'d>, &'a mut UnitState<'d>) {
    let [a, b] = units;
    match side {
        Side::A => (a, b),
        Side::B => (b, a),
    }
}

/// Weapons `attacker` will fire this phase, in loadout order
fn fire_plan(
    attacker: &UnitState<'_>,
    target: &UnitState<'_>,
    engagement: &EngagementState,
    scenario: &ScenarioConfig,
    rules: &Rules,
) -> Vec<usize> {
    if !attacker.can_attack() || target.is_destroyed() {
        return Vec::new();
    }
    let definition = attacker.definition();
    let eligible: Vec<usize> = (0..definition.weapons.len())
        .filter(|&i| attacker.weapon_ready(i) && definition.weapons[i].weapon.in_range(engagement.range))
        .collect();

    let FirePolicy::HeatBudget { tolerance } = scenario.fire_policy else {
        return eligible;
    };

    let mut ranked = eligible;
    ranked.sort_by(|&x, &y| {
        let x = definition.weapons[x].weapon.damage_per_heat();
        let y = definition.weapons[y].weapon.damage_per_heat();
        y.partial_cmp(&x).unwrap_or(Ordering::Equal)
    });

    let baseline = attacker.heat.level
        + attacker.heat.pending
        + rules
            .heat
            .movement_heat(attacker.movement.mode, definition.movement.jump_mp)
        + attacker.engine_hits * rules.heat.engine_hit_heat;
    let mut projected = baseline as i64 - attacker.dissipation() as i64;

    let mut chosen = Vec::new();
    for weapon in ranked {
        let heat = definition.weapons[weapon].weapon.heat as i64;
        if chosen.is_empty() || projected + heat <= tolerance as i64 {
            chosen.push(weapon);
            projected += heat;
        }
    }
    chosen.sort_unstable();
    chosen
}

fn status(turn: u32, side: Side, unit: &UnitState<'_>, kind: StatusKind) -> CombatEvent {
    CombatEvent::Status(StatusEvent {
        turn,
        side,
        unit: unit.name().to_string(),
        kind,
    })
}

fn record_attack<S: EventSink + ?Sized>(
    sink: &mut S,
    turn: u32,
    attacker: &UnitState<'_>,
    side: Side,
    result: &AttackResult,
) {
    if !result.fired {
        return;
    }
    let event = |hit: bool,
                 location: Option<Location>,
                 damage: Option<u32>,
                 critical_effect: Option<String>| {
        CombatEvent::Attack(AttackEvent {
            turn,
            actor: attacker.name().to_string(),
            weapon: result.weapon.clone(),
            hit,
            location,
            damage,
            critical_effect,
        })
    };

    if result.hits.is_empty() {
        sink.record(event(false, None, None, None));
    }
    for hit in &result.hits {
        let criticals = (!hit.criticals.is_empty()).then(|| {
            hit.criticals
                .iter()
                .map(|c| c.to_string())
                .collect::<Vec<_>>()
                .join("; ")
        });
        sink.record(event(true, Some(hit.location), Some(hit.damage), criticals));
    }
    if result.jammed {
        sink.record(status(
            turn,
            side,
            attacker,
            StatusKind::WeaponJammed {
                weapon: result.weapon.clone(),
            },
        ));
    }
}

fn record_heat<S: EventSink + ?Sized>(
    sink: &mut S,
    turn: u32,
    unit: &UnitState<'_>,
    side: Side,
    report: &HeatReport,
) {
    sink.record(status(turn, side, unit, StatusKind::Heat { level: report.level }));
    if report.shut_down {
        sink.record(status(turn, side, unit, StatusKind::Shutdown));
    }
    if report.restarted {
        sink.record(status(turn, side, unit, StatusKind::Restart));
    }
    if let Some(explosion) = &report.explosion {
        sink.record(status(
            turn,
            side,
            unit,
            StatusKind::AmmoExplosion {
                weapon: explosion.weapon.clone(),
                location: explosion.damage.location,
            },
        ));
    }
}
