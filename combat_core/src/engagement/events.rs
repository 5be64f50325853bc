use super::Side;
use crate::unit::{DestructionCause, MovementMode};
use serde::Serialize;
use tables_core::Location;

/// One line of a trial's debug log
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    Attack(AttackEvent),
    Status(StatusEvent),
}

/// A miss, or one projectile connecting
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackEvent {
    pub turn: u32,
    pub actor: String,
    pub weapon: String,
    pub hit: bool,
    pub location: Option<Location>,
    pub damage: Option<u32>,
    pub critical_effect: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatusEvent {
    pub turn: u32,
    pub side: Side,
    pub unit: String,
    pub kind: StatusKind,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StatusKind {
    Moved { mode: MovementMode, hexes: u32, range: u32 },
    Heat { level: u32 },
    Shutdown,
    Restart,
    WeaponJammed { weapon: String },
    AmmoExplosion { weapon: String, location: Location },
    Destroyed { cause: DestructionCause },
}

/// Receives events as a trial plays out
pub trait EventSink {
    /// Skip building events nobody will read
    fn enabled(&self) -> bool {
        true
    }

    fn record(&mut self, event: CombatEvent);
}

impl EventSink for Vec<CombatEvent> {
    fn record(&mut self, event: CombatEvent) {
        self.push(event);
    }
}

/// Discards everything
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn enabled(&self) -> bool {
        false
    }

    fn record(&mut self, _event: CombatEvent) {}
}
