use super::{load_toml, parse_toml};
use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;
use tables_core::Facing;

/// Kind of punishment a soak run throws at a unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DamageProfile {
    /// One large direct-fire hit at a time
    Concentrated,
    /// Small missile-sized hits, each to its own location
    Cluster,
    /// Either of the above with even odds per hit
    Mixed,
}

impl DamageProfile {
    pub fn all() -> Vec<DamageProfile> {
        vec![
            DamageProfile::Concentrated,
            DamageProfile::Cluster,
            DamageProfile::Mixed,
        ]
    }
}

/// Settings for a damage soak run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoakConfig {
    /// Units destroyed per profile
    pub iterations: u32,
    pub profiles: Vec<DamageProfile>,
    pub facing: Facing,
    pub concentrated_min: u32,
    pub concentrated_max: u32,
    pub cluster_damage: u32,
    /// Give up on a unit after this much damage
    pub damage_cap: u32,
    /// Start each unit with half its ammunition, as if it had been firing
    pub halve_ammo: bool,
    /// Treat every location as CASE-protected
    pub auto_case: bool,
    pub seed: Option<u64>,
    pub parallel: bool,
}

impl Default for SoakConfig {
    fn default() -> Self {
        SoakConfig {
            iterations: 10_000,
            profiles: DamageProfile::all(),
            facing: Facing::Front,
            concentrated_min: 5,
            concentrated_max: 15,
            cluster_damage: 2,
            damage_cap: 5000,
            halve_ammo: true,
            auto_case: false,
            seed: None,
            parallel: false,
        }
    }
}

impl SoakConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigurationError> {
        let config: SoakConfig = load_toml(path)?;
        config.validate()?;
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigurationError> {
        let config: SoakConfig = parse_toml(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_iterations(mut self, iterations: u32) -> Self {
        self.iterations = iterations;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn concentrated_range(&self) -> RangeInclusive<u32> {
        self.concentrated_min..=self.concentrated_max
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        let fail = |message: &str| Err(ConfigurationError::Soak(message.to_string()));
        if self.iterations == 0 {
            return fail("iterations must be greater than 0");
        }
        if self.profiles.is_empty() {
            return fail("at least one damage profile is required");
        }
        if self.concentrated_min == 0 || self.concentrated_min > self.concentrated_max {
            return fail("concentrated damage range must be positive and ordered");
        }
        if self.cluster_damage == 0 {
            return fail("cluster damage must be positive");
        }
        if self.damage_cap == 0 {
            return fail("damage cap must be positive");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = SoakConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.profiles.len(), 3);
        assert_eq!(config.concentrated_range(), 5..=15);
    }

    #[test]
    fn test_parse_overrides() {
        let config = SoakConfig::parse(
            r#"
iterations = 200
profiles = ["cluster"]
auto_case = true
seed = 3
"#,
        )
        .unwrap();
        assert_eq!(config.iterations, 200);
        assert_eq!(config.profiles, vec![DamageProfile::Cluster]);
        assert!(config.auto_case);
        assert!(config.halve_ammo);
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let inverted = SoakConfig {
            concentrated_min: 10,
            concentrated_max: 5,
            ..SoakConfig::default()
        };
        assert!(matches!(inverted.validate(), Err(ConfigurationError::Soak(_))));

        let empty = SoakConfig::parse("profiles = []\n");
        assert!(matches!(empty, Err(ConfigurationError::Soak(_))));

        assert!(SoakConfig::default().with_iterations(0).validate().is_err());
    }
}
