//! combat_core - Combat resolution and Monte Carlo battle value estimation
//!
//! This library provides:
//! - UnitState: per-trial damage, critical, ammunition and heat state
//! - Combat resolution: to-hit numbers and single weapon attacks
//! - Engagement loop: movement, simultaneous fire, heat, termination
//! - MonteCarloRunner: repeated seeded trials aggregated into a BattleReport
//! - SoakRunner: damage absorbed before destruction under fixed damage profiles
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use combat_core::prelude::*;
//! use std::path::Path;
//!
//! let catalog = WeaponCatalog::standard();
//! let registry = UnitRegistry::load(Path::new("units/"), &catalog)?;
//! let scenario = ScenarioConfig::default().with_fights(5000).with_seed(42);
//!
//! let runner = MonteCarloRunner::from_registry(
//!     &registry,
//!     "Hunchback HBK-4G",
//!     "Centurion CN9-A",
//!     Rules::new(),
//!     scenario,
//! )?;
//! let report = runner.run()?;
//! let (low, high) = report.win_rate_interval();
//! println!("BV ratio {:.2} (A wins {:.1}%-{:.1}%)", report.bv_ratio(), low * 100.0, high * 100.0);
//! ```

pub mod combat;
pub mod config;
pub mod engagement;
pub mod error;
pub mod heat;
pub mod prelude;
pub mod runner;
pub mod unit;

// Core API
pub use runner::{BattleReport, MonteCarloRunner, SoakReport, SoakRunner};
pub use engagement::{run_trial, TrialOutcome, Winner};
pub use combat::{resolve_attack, to_hit_probability, AttackResult};
pub use unit::{DamageResult, UnitState};

// Configuration
pub use config::{DamageProfile, FirePolicy, MovementAi, ProbabilityCurve, Rules, ScenarioConfig, SoakConfig};

// Errors
pub use error::{ConfigurationError, InvariantViolation, SimError};

// Re-export the data crates callers need to build units
pub use mech_core::{UnitDefinition, UnitRegistry, WeaponCatalog, WeaponInstance};
pub use tables_core::{Facing, Location, TableSet};
