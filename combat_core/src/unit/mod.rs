//! Per-trial mutable state for one combatant

mod critical;
mod state;

pub use critical::CriticalEffect;
pub use state::{
    DamageResult, DestructionCause, HeatState, LocationState, MovementMode, MovementState,
    SlotState, UnitState, WeaponState, ENGINE_HITS_TO_DESTROY, SENSOR_HITS_TO_BLIND,
};
