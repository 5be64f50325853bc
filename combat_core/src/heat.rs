//! End-of-turn heat resolution
//!
//! Heat generated during the turn (weapons, movement, engine damage, enemy
//! flamers) is added, dissipation is subtracted, and the resulting level is
//! checked against the configured bands for shutdown and ammunition explosion.

use crate::config::HeatConfig;
use crate::error::InvariantViolation;
use crate::unit::{DamageResult, UnitState};
use rand::Rng;
use tables_core::dice::roll_2d6;

/// What happened to one unit in the heat phase
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HeatReport {
    pub generated: u32,
    pub dissipated: u32,
    /// Heat level after the phase
    pub level: u32,
    /// The unit shut down this phase
    pub shut_down: bool,
    /// The unit came back from a shutdown this phase
    pub restarted: bool,
    pub explosion: Option<HeatExplosion>,
}

/// Ammunition cooked off by heat
#[derive(Debug, Clone, PartialEq)]
pub struct HeatExplosion {
    pub weapon: String,
    pub damage: DamageResult,
}

/// Resolve the heat phase for a unit that is still in the fight
pub fn resolve_heat<R: Rng + ?Sized>(
    unit: &mut UnitState<'_>,
    config: &HeatConfig,
    rng: &mut R,
) -> Result<HeatReport, InvariantViolation> {
    let definition = unit.definition();
    let movement = config.movement_heat(unit.movement.mode, definition.movement.jump_mp);
    let generated = unit.heat.pending + movement + unit.engine_hits * config.engine_hit_heat;
    let dissipated = unit.dissipation();

    unit.heat.pending = 0;
    unit.heat.level = (unit.heat.level + generated).saturating_sub(dissipated);
    let level = unit.heat.level;

    let mut report = HeatReport {
        generated,
        dissipated,
        level,
        ..HeatReport::default()
    };

    if unit.heat.shutdown {
        if !config.is_automatic_shutdown(level) && rng.gen::<f64>() < config.restart_chance {
            unit.heat.shutdown = false;
            report.restarted = true;
        }
    } else if let Some(band) = config.band(level) {
        let shut_down = if band.automatic_shutdown {
            true
        } else if let Some(avoid) = band.shutdown_avoid {
            roll_2d6(rng) < avoid
        } else {
            false
        };
        if shut_down {
            unit.heat.shutdown = true;
            report.shut_down = true;
        }
    }

    let ammo_avoid = config.band(level).and_then(|band| band.ammo_avoid);
    if let (Some(avoid), true) = (ammo_avoid, unit.has_ammo()) {
        if roll_2d6(rng) < avoid {
            let loaded: Vec<usize> = (0..unit.weapons.len())
                .filter(|i| unit.ammo_remaining(*i).is_some_and(|n| n > 0))
                .collect();
            let pick = ((rng.gen::<f64>() * loaded.len() as f64) as usize).min(loaded.len() - 1);
            let weapon = loaded[pick];
            if let Some(damage) = unit.explode_ammo(weapon)? {
                report.explosion = Some(HeatExplosion {
                    weapon: definition.weapons[weapon].weapon.name.clone(),
                    damage,
                });
            }
        }
    }

    tracing::debug!(
        unit = %definition.name,
        generated,
        dissipated,
        level,
        shutdown = unit.heat.shutdown,
        "heat phase"
    );

    Ok(report)
}
