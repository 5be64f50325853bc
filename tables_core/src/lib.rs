//! tables_core - Static probability tables for combat resolution
//!
//! Every table is a pure lookup over uniform draws in `[0, 1)`:
//! - Hit location by attack facing
//! - Cluster hits by launcher size and a 2d6 sum
//! - Critical severity by structure-penetrating hits
//! - Standard internal structure by tonnage

mod cluster;
mod config;
mod critical;
pub mod dice;
mod hit_location;
mod location;
mod structure;
mod table_set;
mod threshold;

pub use cluster::ClusterTable;
pub use critical::CriticalTable;
pub use hit_location::HitLocationTable;
pub use location::{Facing, Location};
pub use structure::{standard_structure, StructureRow};
pub use table_set::TableSet;
pub use threshold::ThresholdTable;

use std::path::PathBuf;
use thiserror::Error;

/// Error loading table configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error reading '{path:?}': {error}")]
    Io {
        error: std::io::Error,
        path: Option<PathBuf>,
    },
    #[error("Parse error in '{path:?}': {error}")]
    Parse {
        error: toml::de::Error,
        path: Option<PathBuf>,
    },
    #[error("Validation error in '{path:?}': {message}")]
    Validation {
        message: String,
        path: Option<PathBuf>,
    },
}

/// Error building a table from raw data
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TableError {
    #[error("Table has no outcomes with positive weight")]
    Empty,
    #[error("Probability {0} is negative or not finite")]
    InvalidProbability(f64),
    #[error("Probabilities sum to {0}, expected 1.0")]
    MassMismatch(f64),
    #[error("Cluster row for size {size}: {reason}")]
    InvalidClusterRow { size: u32, reason: String },
}
