mod monte_carlo;
mod report;
mod soak;

pub use monte_carlo::MonteCarloRunner;
pub use report::{wilson_interval, BattleReport, Tally, Z_95};
pub use soak::{DeathCause, DeathCauses, ProfileReport, SoakReport, SoakRunner};
