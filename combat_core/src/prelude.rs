//! Prelude module for convenient imports
//!
//! ```rust
//! use combat_core::prelude::*;
//! ```

// Running battles
pub use crate::runner::{BattleReport, DeathCause, MonteCarloRunner, SoakReport, SoakRunner};
pub use crate::engagement::{run_trial, CombatEvent, EventSink, NullSink, TrialOutcome, Winner};

// Combat
pub use crate::combat::{resolve_attack, to_hit_probability, AttackResult};
pub use crate::unit::{CriticalEffect, DamageResult, UnitState};

// Config
pub use crate::config::{
    DamageProfile, FirePolicy, MovementAi, ProbabilityCurve, Rules, ScenarioConfig, SoakConfig,
};

// Errors
pub use crate::error::{ConfigurationError, InvariantViolation, SimError};

// Re-exports from the data crates
pub use mech_core::{LocationDefinition, UnitDefinition, UnitRegistry, WeaponCatalog, WeaponInstance};
pub use tables_core::{Facing, Location, TableSet};
