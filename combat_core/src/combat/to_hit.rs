//! To-hit target numbers

use crate::config::Rules;
use crate::engagement::EngagementState;
use crate::error::InvariantViolation;
use crate::unit::UnitState;

/// Every modifier that went into a target number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ToHitBreakdown {
    pub gunnery: i32,
    pub range: i32,
    pub heat: i32,
    pub target_movement: i32,
    pub attacker_movement: i32,
    pub weapon: i32,
    pub damage: i32,
}

impl ToHitBreakdown {
    pub fn target_number(&self) -> i32 {
        self.gunnery
            + self.range
            + self.heat
            + self.target_movement
            + self.attacker_movement
            + self.weapon
            + self.damage
    }
}

/// Modifiers for `attacker` firing weapon `weapon` at `target`
///
/// Returns `None` when the target is beyond the weapon's long range.
pub fn to_hit_breakdown(
    attacker: &UnitState<'_>,
    weapon: usize,
    target: &UnitState<'_>,
    engagement: &EngagementState,
    rules: &Rules,
) -> Result<Option<ToHitBreakdown>, InvariantViolation> {
    let definition = attacker.definition();
    let mount = definition
        .weapons
        .get(weapon)
        .ok_or_else(|| InvariantViolation::WeaponIndexOutOfRange {
            unit: definition.name.clone(),
            index: weapon,
        })?;

    let Some(range) = rules
        .to_hit
        .range_modifier(mount.weapon.bracket(engagement.range))
    else {
        return Ok(None);
    };

    let target_movement = if target.is_shut_down() {
        rules.to_hit.immobile_target
    } else {
        rules.to_hit.target_movement_modifier(target.movement.hexes)
    };

    Ok(Some(ToHitBreakdown {
        gunnery: definition.gunnery as i32,
        range,
        heat: rules.heat.to_hit_penalty(attacker.heat.level),
        target_movement,
        attacker_movement: rules.to_hit.attacker_movement_modifier(attacker.movement.mode),
        weapon: mount.weapon.to_hit_modifier,
        damage: attacker.damage_modifier(),
    }))
}

/// Chance in `[0, 1]` that the attack hits; zero when out of range
pub fn to_hit_probability(
    attacker: &UnitState<'_>,
    weapon: usize,
    target: &UnitState<'_>,
    engagement: &EngagementState,
    rules: &Rules,
) -> Result<f64, InvariantViolation> {
    Ok(to_hit_breakdown(attacker, weapon, target, engagement, rules)?
        .map_or(0.0, |b| rules.to_hit.curve.probability(b.target_number())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProbabilityCurve;
    use crate::unit::MovementMode;
    use mech_core::{LocationDefinition, UnitDefinition, WeaponInstance};
    use tables_core::{Facing, Location};

    fn shooter() -> UnitDefinition {
        UnitDefinition::new("Shooter", 50)
            .with_gunnery(4)
            .with_location(LocationDefinition::new(Location::CenterTorso, 20, 16))
            .with_weapon(
                WeaponInstance::new("Large Laser", 8, 8, [0, 5, 10, 15]),
                Location::CenterTorso,
            )
            .with_weapon(
                WeaponInstance::new("LRM 5", 1, 2, [6, 7, 14, 21]).with_cluster(5),
                Location::CenterTorso,
            )
            .with_weapon(
                WeaponInstance::new("Medium Pulse Laser", 6, 4, [0, 2, 4, 6]).with_to_hit(-2),
                Location::CenterTorso,
            )
    }

    fn at_range(range: u32) -> EngagementState {
        EngagementState {
            range,
            turn: 1,
            facing: Facing::Front,
            terminal: false,
        }
    }

    #[test]
    fn test_range_brackets() {
        let def = shooter();
        let attacker = UnitState::new(&def);
        let target = UnitState::new(&def);
        let rules = Rules::new();

        let short = to_hit_breakdown(&attacker, 0, &target, &at_range(3), &rules)
            .unwrap()
            .unwrap();
        assert_eq!(short.target_number(), 4);

        let long = to_hit_breakdown(&attacker, 0, &target, &at_range(14), &rules)
            .unwrap()
            .unwrap();
        assert_eq!(long.range, 4);
        assert_eq!(long.target_number(), 8);

        assert!(to_hit_breakdown(&attacker, 0, &target, &at_range(16), &rules)
            .unwrap()
            .is_none());
        assert_eq!(
            to_hit_probability(&attacker, 0, &target, &at_range(16), &rules).unwrap(),
            0.0
        );
    }

    #[test]
    fn test_minimum_range_penalty() {
        let def = shooter();
        let attacker = UnitState::new(&def);
        let target = UnitState::new(&def);

        // LRM minimum range 6 at 2 hexes: +4
        let breakdown = to_hit_breakdown(&attacker, 1, &target, &at_range(2), &Rules::new())
            .unwrap()
            .unwrap();
        assert_eq!(breakdown.range, 4);
    }

    #[test]
    fn test_movement_heat_and_weapon_modifiers() {
        let def = shooter();
        let mut attacker = UnitState::new(&def);
        let mut target = UnitState::new(&def);
        let rules = Rules::new();

        attacker.movement.mode = MovementMode::Run;
        attacker.heat.level = 11;
        target.movement.hexes = 5;

        let breakdown = to_hit_breakdown(&attacker, 2, &target, &at_range(1), &rules)
            .unwrap()
            .unwrap();
        assert_eq!(breakdown.attacker_movement, 2);
        assert_eq!(breakdown.heat, 2);
        assert_eq!(breakdown.target_movement, 2);
        assert_eq!(breakdown.weapon, -2);
        assert_eq!(breakdown.target_number(), 4 + 2 + 2 + 2 - 2);

        target.heat.shutdown = true;
        let immobile = to_hit_breakdown(&attacker, 2, &target, &at_range(1), &rules)
            .unwrap()
            .unwrap();
        assert_eq!(immobile.target_movement, -4);
    }

    #[test]
    fn test_sensor_damage_modifier() {
        let def = shooter();
        let mut attacker = UnitState::new(&def);
        let target = UnitState::new(&def);

        attacker.sensor_hits = 1;
        let breakdown = to_hit_breakdown(&attacker, 0, &target, &at_range(3), &Rules::new())
            .unwrap()
            .unwrap();
        assert_eq!(breakdown.damage, 2);
    }

    #[test]
    fn test_probability_curves() {
        let def = shooter();
        let attacker = UnitState::new(&def);
        let target = UnitState::new(&def);

        // 4 or better on 2d6: 33 of 36
        let p = to_hit_probability(&attacker, 0, &target, &at_range(3), &Rules::new()).unwrap();
        assert!((p - 33.0 / 36.0).abs() < 1e-12);

        let certain = Rules::new().with_curve(ProbabilityCurve::always_hit());
        let p = to_hit_probability(&attacker, 0, &target, &at_range(14), &certain).unwrap();
        assert_eq!(p, 1.0);
    }

    #[test]
    fn test_bad_weapon_index() {
        let def = shooter();
        let attacker = UnitState::new(&def);
        let target = UnitState::new(&def);
        let result = to_hit_breakdown(&attacker, 9, &target, &at_range(3), &Rules::new());
        assert!(matches!(
            result,
            Err(InvariantViolation::WeaponIndexOutOfRange { index: 9, .. })
        ));
    }
}
