use serde::{Deserialize, Serialize};

fn default_crit_slots() -> u32 {
    1
}

/// Immutable weapon properties
///
/// For cluster weapons `damage` is per projectile and `cluster_size` is the
/// number of projectiles per firing. A `cluster_size` of 0 is a single hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponInstance {
    pub name: String,
    pub damage: u32,
    pub heat: u32,
    #[serde(default)]
    pub min_range: u32,
    pub short_range: u32,
    pub medium_range: u32,
    pub long_range: u32,
    #[serde(default)]
    pub cluster_size: u32,
    /// Shots carried by default; `None` never runs dry
    #[serde(default)]
    pub ammo: Option<u32>,
    #[serde(default)]
    pub to_hit_modifier: i32,
    /// All-or-nothing launcher that spends nothing on a miss
    #[serde(default)]
    pub streak: bool,
    /// Takes a second shot per turn with jam risk
    #[serde(default)]
    pub ultra: bool,
    /// Heat added to the target on a hit
    #[serde(default)]
    pub target_heat: u32,
    #[serde(default = "default_crit_slots")]
    pub crit_slots: u32,
}

/// Range band a target distance falls into
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeBracket {
    /// Inside minimum range; penalty grows by one per hex short
    Minimum { shortfall: u32 },
    Short,
    Medium,
    Long,
    OutOfRange,
}

impl WeaponInstance {
    /// Single-hit energy weapon with the given brackets `[min, short, medium, long]`
    pub fn new(name: &str, damage: u32, heat: u32, ranges: [u32; 4]) -> Self {
        let [min_range, short_range, medium_range, long_range] = ranges;
        WeaponInstance {
            name: name.to_string(),
            damage,
            heat,
            min_range,
            short_range,
            medium_range,
            long_range,
            cluster_size: 0,
            ammo: None,
            to_hit_modifier: 0,
            streak: false,
            ultra: false,
            target_heat: 0,
            crit_slots: 1,
        }
    }

    pub fn with_ammo(mut self, shots: u32) -> Self {
        self.ammo = Some(shots);
        self
    }

    pub fn with_cluster(mut self, size: u32) -> Self {
        self.cluster_size = size;
        self
    }

    pub fn with_to_hit(mut self, modifier: i32) -> Self {
        self.to_hit_modifier = modifier;
        self
    }

    pub fn with_target_heat(mut self, heat: u32) -> Self {
        self.target_heat = heat;
        self
    }

    pub fn with_crit_slots(mut self, slots: u32) -> Self {
        self.crit_slots = slots;
        self
    }

    pub fn streak(mut self) -> Self {
        self.streak = true;
        self
    }

    pub fn ultra(mut self) -> Self {
        self.ultra = true;
        self
    }

    /// Bracket for a target at `distance` hexes
    pub fn bracket(&self, distance: u32) -> RangeBracket {
        if distance > self.long_range {
            RangeBracket::OutOfRange
        } else if distance < self.min_range {
            RangeBracket::Minimum {
                shortfall: self.min_range - distance,
            }
        } else if distance <= self.short_range {
            RangeBracket::Short
        } else if distance <= self.medium_range {
            RangeBracket::Medium
        } else {
            RangeBracket::Long
        }
    }

    pub fn in_range(&self, distance: u32) -> bool {
        self.bracket(distance) != RangeBracket::OutOfRange
    }

    pub fn is_cluster(&self) -> bool {
        self.cluster_size > 0
    }

    pub fn uses_ammo(&self) -> bool {
        self.ammo.is_some()
    }

    /// Projectiles per firing, at least one
    pub fn projectiles(&self) -> u32 {
        self.cluster_size.max(1)
    }

    /// Damage if every projectile connects
    pub fn max_damage(&self) -> u32 {
        self.damage * self.projectiles()
    }

    /// Expected-damage ordering key for heat-budgeted fire; heatless weapons sort first
    pub fn damage_per_heat(&self) -> f64 {
        if self.heat == 0 {
            f64::INFINITY
        } else {
            self.max_damage() as f64 / self.heat as f64
        }
    }

    /// Check internal consistency of the brackets and slots
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("weapon name must not be empty".to_string());
        }
        if self.short_range == 0 {
            return Err("short range must be at least 1".to_string());
        }
        if !(self.short_range <= self.medium_range && self.medium_range <= self.long_range) {
            return Err(format!(
                "ranges must be ordered short <= medium <= long, got {}/{}/{}",
                self.short_range, self.medium_range, self.long_range
            ));
        }
        if self.min_range > self.long_range {
            return Err("minimum range exceeds long range".to_string());
        }
        if self.crit_slots == 0 {
            return Err("weapon must occupy at least one critical slot".to_string());
        }
        if self.streak && !self.is_cluster() {
            return Err("streak launchers need a cluster size".to_string());
        }
        Ok(())
    }
}

/// Standard energy, ballistic and missile weapons
pub fn standard_weapons() -> Vec<WeaponInstance> {
    vec![
        // Energy
        WeaponInstance::new("Small Laser", 3, 1, [0, 1, 2, 3]),
        WeaponInstance::new("Medium Laser", 5, 3, [0, 3, 6, 9]),
        WeaponInstance::new("Large Laser", 8, 8, [0, 5, 10, 15]).with_crit_slots(2),
        WeaponInstance::new("PPC", 10, 10, [3, 6, 12, 18]).with_crit_slots(3),
        WeaponInstance::new("ER Large Laser", 8, 12, [0, 7, 14, 19]).with_crit_slots(2),
        WeaponInstance::new("ER PPC", 10, 15, [0, 7, 14, 23]).with_crit_slots(3),
        WeaponInstance::new("Small Pulse Laser", 3, 2, [0, 1, 2, 3]).with_to_hit(-2),
        WeaponInstance::new("Medium Pulse Laser", 6, 4, [0, 2, 4, 6]).with_to_hit(-2),
        WeaponInstance::new("Large Pulse Laser", 9, 10, [0, 3, 7, 10])
            .with_to_hit(-2)
            .with_crit_slots(2),
        WeaponInstance::new("Flamer", 2, 3, [0, 1, 2, 3]).with_target_heat(2),
        // Ballistic
        WeaponInstance::new("AC/2", 2, 1, [4, 8, 16, 24]).with_ammo(45),
        WeaponInstance::new("AC/5", 5, 1, [3, 6, 12, 18])
            .with_ammo(20)
            .with_crit_slots(4),
        WeaponInstance::new("AC/10", 10, 3, [0, 5, 10, 15])
            .with_ammo(10)
            .with_crit_slots(7),
        WeaponInstance::new("AC/20", 20, 7, [0, 3, 6, 9])
            .with_ammo(5)
            .with_crit_slots(10),
        WeaponInstance::new("Ultra AC/5", 5, 1, [2, 6, 12, 18])
            .with_ammo(20)
            .ultra()
            .with_crit_slots(5),
        WeaponInstance::new("LB 10-X AC", 1, 2, [0, 6, 12, 18])
            .with_ammo(10)
            .with_cluster(10)
            .with_crit_slots(6),
        WeaponInstance::new("Machine Gun", 2, 0, [0, 1, 2, 3]).with_ammo(200),
        // Missile
        WeaponInstance::new("SRM-2", 2, 2, [0, 3, 6, 9])
            .with_ammo(50)
            .with_cluster(2),
        WeaponInstance::new("SRM-4", 2, 3, [0, 3, 6, 9])
            .with_ammo(25)
            .with_cluster(4),
        WeaponInstance::new("SRM-6", 2, 4, [0, 3, 6, 9])
            .with_ammo(15)
            .with_cluster(6)
            .with_crit_slots(2),
        WeaponInstance::new("LRM-5", 1, 2, [6, 7, 14, 21])
            .with_ammo(24)
            .with_cluster(5),
        WeaponInstance::new("LRM-10", 1, 4, [6, 7, 14, 21])
            .with_ammo(12)
            .with_cluster(10)
            .with_crit_slots(2),
        WeaponInstance::new("LRM-15", 1, 5, [6, 7, 14, 21])
            .with_ammo(8)
            .with_cluster(15)
            .with_crit_slots(3),
        WeaponInstance::new("LRM-20", 1, 6, [6, 7, 14, 21])
            .with_ammo(6)
            .with_cluster(20)
            .with_crit_slots(5),
        WeaponInstance::new("Streak SRM-2", 2, 2, [0, 3, 6, 9])
            .with_ammo(50)
            .with_cluster(2)
            .streak(),
        WeaponInstance::new("Streak SRM-4", 2, 3, [0, 3, 6, 9])
            .with_ammo(25)
            .with_cluster(4)
            .streak(),
        WeaponInstance::new("Streak SRM-6", 2, 4, [0, 3, 6, 9])
            .with_ammo(15)
            .with_cluster(6)
            .streak()
            .with_crit_slots(2),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find(name: &str) -> WeaponInstance {
        standard_weapons()
            .into_iter()
            .find(|w| w.name == name)
            .unwrap()
    }

    #[test]
    fn test_brackets() {
        let ppc = find("PPC");
        assert_eq!(ppc.bracket(1), RangeBracket::Minimum { shortfall: 2 });
        assert_eq!(ppc.bracket(3), RangeBracket::Short);
        assert_eq!(ppc.bracket(6), RangeBracket::Short);
        assert_eq!(ppc.bracket(7), RangeBracket::Medium);
        assert_eq!(ppc.bracket(18), RangeBracket::Long);
        assert_eq!(ppc.bracket(19), RangeBracket::OutOfRange);
        assert!(!ppc.in_range(19));
    }

    #[test]
    fn test_cluster_damage() {
        let lrm = find("LRM-20");
        assert!(lrm.is_cluster());
        assert_eq!(lrm.max_damage(), 20);
        let laser = find("Medium Laser");
        assert_eq!(laser.projectiles(), 1);
        assert_eq!(laser.max_damage(), 5);
    }

    #[test]
    fn test_standard_set_is_valid() {
        let weapons = standard_weapons();
        assert_eq!(weapons.len(), 27);
        for weapon in &weapons {
            assert!(weapon.validate().is_ok(), "{} invalid", weapon.name);
        }
    }

    #[test]
    fn test_pulse_lasers_easier_to_hit() {
        for weapon in standard_weapons() {
            if weapon.name.contains("Pulse") {
                assert_eq!(weapon.to_hit_modifier, -2);
            } else {
                assert_eq!(weapon.to_hit_modifier, 0);
            }
        }
    }

    #[test]
    fn test_heatless_weapons_sort_first() {
        let mg = find("Machine Gun");
        let laser = find("Medium Laser");
        assert!(mg.damage_per_heat() > laser.damage_per_heat());
    }

    #[test]
    fn test_validate_rejects_bad_ranges() {
        let weapon = WeaponInstance::new("Broken", 5, 3, [0, 6, 3, 9]);
        assert!(weapon.validate().is_err());
        let streak = WeaponInstance::new("Streak", 2, 2, [0, 3, 6, 9]).streak();
        assert!(streak.validate().is_err());
    }
}
