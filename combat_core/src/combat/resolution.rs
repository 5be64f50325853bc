//! Single attack resolution

use super::to_hit::to_hit_breakdown;
use crate::config::Rules;
use crate::engagement::EngagementState;
use crate::error::InvariantViolation;
use crate::unit::{CriticalEffect, UnitState};
use mech_core::WeaponInstance;
use rand::Rng;
use tables_core::dice::roll_2d6;
use tables_core::Location;

/// One projectile (or whole-weapon hit) landing on the target
#[derive(Debug, Clone, PartialEq)]
pub struct HitRecord {
    pub location: Location,
    /// Armor and structure actually removed
    pub damage: u32,
    pub location_destroyed: bool,
    pub criticals: Vec<CriticalEffect>,
}

/// Outcome of one weapon's attack
#[derive(Debug, Clone, PartialEq)]
pub struct AttackResult {
    pub weapon: String,
    /// At least one shot left the barrel
    pub fired: bool,
    pub hit: bool,
    /// `None` when the target was out of range
    pub target_number: Option<i32>,
    pub probability: f64,
    pub shots: u32,
    pub jammed: bool,
    pub hits: Vec<HitRecord>,
    pub target_destroyed: bool,
}

impl AttackResult {
    fn new(weapon: &str) -> Self {
        AttackResult {
            weapon: weapon.to_string(),
            fired: false,
            hit: false,
            target_number: None,
            probability: 0.0,
            shots: 0,
            jammed: false,
            hits: Vec::new(),
            target_destroyed: false,
        }
    }

    pub fn total_damage(&self) -> u32 {
        self.hits.iter().map(|h| h.damage).sum()
    }
}

/// Resolve one weapon fired by `attacker` at `target`
///
/// Out-of-range attacks and weapons that are destroyed, jammed or empty
/// return unfired without consuming randomness. A normal shot
/// spends ammunition and heat, then draws once against the hit probability;
/// on a hit the cluster table decides how many projectiles connect and each
/// draws its own location. Streak launchers draw first and only spend
/// ammunition and heat on a hit. An Ultra autocannon whose first shot hits
/// takes a second shot while ammunition remains, unless a 2 on 2d6 jams it.
pub fn resolve_attack<R: Rng + ?Sized>(
    attacker: &mut UnitState<'_>,
    weapon: usize,
    target: &mut UnitState<'_>,
    engagement: &EngagementState,
    rules: &Rules,
    rng: &mut R,
) -> Result<AttackResult, InvariantViolation> {
    if target.is_destroyed() {
        return Err(InvariantViolation::AttackOnDestroyedUnit {
            attacker: attacker.name().to_string(),
            target: target.name().to_string(),
        });
    }

    let definition = attacker.definition();
    let breakdown = to_hit_breakdown(attacker, weapon, target, engagement, rules)?;
    let stats = &definition.weapons[weapon].weapon;
    let mut result = AttackResult::new(&stats.name);

    if !attacker.weapon_ready(weapon) {
        return Ok(result);
    }
    let Some(breakdown) = breakdown else {
        return Ok(result);
    };
    let target_number = breakdown.target_number();
    let probability = rules.to_hit.curve.probability(target_number);
    result.target_number = Some(target_number);
    result.probability = probability;

    if stats.streak {
        result.fired = true;
        if rng.gen::<f64>() < probability && attacker.fire_weapon(weapon)? {
            attacker.add_heat(stats.heat);
            result.shots = 1;
            result.hit = true;
            deliver(stats, stats.projectiles(), target, engagement, rules, rng, &mut result)?;
        }
    } else {
        shoot(attacker, weapon, stats, target, engagement, rules, probability, rng, &mut result)?;

        if stats.ultra && result.hit && !target.is_destroyed() && attacker.weapon_ready(weapon) {
            if roll_2d6(rng) == 2 {
                attacker.weapons[weapon].jammed = true;
                result.jammed = true;
            } else {
                shoot(attacker, weapon, stats, target, engagement, rules, probability, rng, &mut result)?;
            }
        }
    }

    result.target_destroyed = target.is_destroyed();

    tracing::trace!(
        attacker = %definition.name,
        target = %target.name(),
        weapon = %stats.name,
        target_number,
        hit = result.hit,
        damage = result.total_damage(),
        "attack resolved"
    );

    Ok(result)
}

#[allow(clippy::too_many_arguments)]
fn shoot<R: Rng + ?Sized>(
    attacker: &mut UnitState<'_>,
    weapon: usize,
    stats: &WeaponInstance,
    target: &mut UnitState<'_>,
    engagement: &EngagementState,
    rules: &Rules,
    probability: f64,
    rng: &mut R,
    result: &mut AttackResult,
) -> Result<(), InvariantViolation> {
    if !attacker.fire_weapon(weapon)? {
        return Ok(());
    }
    attacker.add_heat(stats.heat);
    result.fired = true;
    result.shots += 1;

    if rng.gen::<f64>() >= probability {
        return Ok(());
    }
    result.hit = true;

    let connecting = if stats.is_cluster() {
        let first = rng.gen();
        let second = rng.gen();
        rules.tables.cluster.hits(stats.cluster_size, first, second)
    } else {
        1
    };
    deliver(stats, connecting, target, engagement, rules, rng, result)
}

/// Land `projectiles` hits, each with its own location draw
fn deliver<R: Rng + ?Sized>(
    stats: &WeaponInstance,
    projectiles: u32,
    target: &mut UnitState<'_>,
    engagement: &EngagementState,
    rules: &Rules,
    rng: &mut R,
    result: &mut AttackResult,
) -> Result<(), InvariantViolation> {
    for _ in 0..projectiles {
        if target.is_destroyed() {
            break;
        }
        let location = rules
            .tables
            .hit_location
            .lookup(engagement.facing, rng.gen());
        let damage = target.apply_damage(
            location,
            stats.damage,
            engagement.facing,
            &rules.tables.critical,
            rng,
        )?;
        result.hits.push(HitRecord {
            location: damage.location,
            damage: damage.armor_damage + damage.structure_damage,
            location_destroyed: damage.location_destroyed,
            criticals: damage.criticals,
        });
    }

    if stats.target_heat > 0 {
        target.add_heat(stats.target_heat);
    }
    Ok(())
}
