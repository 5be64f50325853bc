use crate::location::{Facing, Location};
use crate::threshold::{table_from_2d6_column, ThresholdTable};

use Location::*;

/// 2d6 columns (totals 2 through 12) of the standard hit location tables
const FRONT_COLUMN: [Location; 11] = [
    CenterTorso, RightArm, RightArm, RightLeg, RightTorso, CenterTorso, LeftTorso, LeftLeg,
    LeftArm, LeftArm, Head,
];
const LEFT_COLUMN: [Location; 11] = [
    LeftTorso, LeftLeg, LeftArm, LeftArm, LeftLeg, LeftTorso, CenterTorso, RightTorso, RightArm,
    RightLeg, Head,
];
const RIGHT_COLUMN: [Location; 11] = [
    RightTorso, RightLeg, RightArm, RightArm, RightLeg, RightTorso, CenterTorso, LeftTorso,
    LeftArm, LeftLeg, Head,
];
const REAR_COLUMN: [Location; 11] = [
    CenterTorso, RightTorso, RightTorso, RightLeg, RightTorso, CenterTorso, LeftTorso, LeftLeg,
    LeftTorso, LeftTorso, Head,
];

/// Hit location distribution for each attack facing
#[derive(Debug, Clone, PartialEq)]
pub struct HitLocationTable {
    pub front: ThresholdTable<Location>,
    pub left: ThresholdTable<Location>,
    pub right: ThresholdTable<Location>,
    pub rear: ThresholdTable<Location>,
}

impl Default for HitLocationTable {
    fn default() -> Self {
        HitLocationTable {
            front: table_from_2d6_column(&FRONT_COLUMN),
            left: table_from_2d6_column(&LEFT_COLUMN),
            right: table_from_2d6_column(&RIGHT_COLUMN),
            rear: table_from_2d6_column(&REAR_COLUMN),
        }
    }
}

impl HitLocationTable {
    /// Table for a given facing
    pub fn for_facing(&self, facing: Facing) -> &ThresholdTable<Location> {
        match facing {
            Facing::Front => &self.front,
            Facing::Left => &self.left,
            Facing::Right => &self.right,
            Facing::Rear => &self.rear,
        }
    }

    /// Location struck by an attack from `facing` given a draw in `[0, 1)`
    pub fn lookup(&self, facing: Facing, draw: f64) -> Location {
        *self.for_facing(facing).lookup(draw)
    }
}
