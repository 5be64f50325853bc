use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Body locations of a combat unit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Location {
    #[serde(rename = "HD")]
    Head,
    #[serde(rename = "CT")]
    CenterTorso,
    #[serde(rename = "LT")]
    LeftTorso,
    #[serde(rename = "RT")]
    RightTorso,
    #[serde(rename = "LA")]
    LeftArm,
    #[serde(rename = "RA")]
    RightArm,
    #[serde(rename = "LL")]
    LeftLeg,
    #[serde(rename = "RL")]
    RightLeg,
}

impl Location {
    /// All locations in standard record-sheet order
    pub fn all() -> &'static [Location] {
        &[
            Location::Head,
            Location::CenterTorso,
            Location::LeftTorso,
            Location::RightTorso,
            Location::LeftArm,
            Location::RightArm,
            Location::LeftLeg,
            Location::RightLeg,
        ]
    }

    /// Short record-sheet code
    pub fn code(&self) -> &'static str {
        match self {
            Location::Head => "HD",
            Location::CenterTorso => "CT",
            Location::LeftTorso => "LT",
            Location::RightTorso => "RT",
            Location::LeftArm => "LA",
            Location::RightArm => "RA",
            Location::LeftLeg => "LL",
            Location::RightLeg => "RL",
        }
    }

    /// Where excess damage goes once this location is gone
    pub fn transfer_target(&self) -> Option<Location> {
        match self {
            Location::Head | Location::CenterTorso => None,
            Location::LeftTorso | Location::RightTorso => Some(Location::CenterTorso),
            Location::LeftArm | Location::LeftLeg => Some(Location::LeftTorso),
            Location::RightArm | Location::RightLeg => Some(Location::RightTorso),
        }
    }

    /// Losing a vital location destroys the unit
    pub fn is_vital(&self) -> bool {
        matches!(self, Location::Head | Location::CenterTorso)
    }

    /// Torso locations carry separate rear armor
    pub fn has_rear_armor(&self) -> bool {
        matches!(
            self,
            Location::CenterTorso | Location::LeftTorso | Location::RightTorso
        )
    }

    pub fn is_side_torso(&self) -> bool {
        matches!(self, Location::LeftTorso | Location::RightTorso)
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Location {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Location::all()
            .iter()
            .copied()
            .find(|loc| loc.code().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown location '{}'", s))
    }
}

/// Direction an attack arrives from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Facing {
    #[default]
    Front,
    Left,
    Right,
    Rear,
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Facing::Front => write!(f, "front"),
            Facing::Left => write!(f, "left"),
            Facing::Right => write!(f, "right"),
            Facing::Rear => write!(f, "rear"),
        }
    }
}
