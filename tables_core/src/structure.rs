//! Standard internal structure by tonnage

use crate::location::Location;

/// Internal structure points for one tonnage class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureRow {
    pub head: u32,
    pub center_torso: u32,
    pub side_torso: u32,
    pub arm: u32,
    pub leg: u32,
}

impl StructureRow {
    pub fn for_location(&self, location: Location) -> u32 {
        match location {
            Location::Head => self.head,
            Location::CenterTorso => self.center_torso,
            Location::LeftTorso | Location::RightTorso => self.side_torso,
            Location::LeftArm | Location::RightArm => self.arm,
            Location::LeftLeg | Location::RightLeg => self.leg,
        }
    }

    pub fn total(&self) -> u32 {
        self.head + self.center_torso + 2 * (self.side_torso + self.arm + self.leg)
    }
}

const fn row(center_torso: u32, side_torso: u32, arm: u32, leg: u32) -> StructureRow {
    StructureRow {
        head: 3,
        center_torso,
        side_torso,
        arm,
        leg,
    }
}

const STRUCTURE_BY_TONNAGE: [(u32, StructureRow); 17] = [
    (20, row(6, 5, 3, 4)),
    (25, row(8, 6, 4, 6)),
    (30, row(10, 7, 5, 7)),
    (35, row(11, 8, 6, 8)),
    (40, row(12, 10, 6, 10)),
    (45, row(14, 11, 7, 11)),
    (50, row(16, 12, 8, 12)),
    (55, row(18, 13, 9, 13)),
    (60, row(20, 14, 10, 14)),
    (65, row(21, 15, 10, 15)),
    (70, row(22, 15, 11, 15)),
    (75, row(23, 16, 12, 16)),
    (80, row(25, 17, 13, 17)),
    (85, row(27, 18, 14, 18)),
    (90, row(29, 19, 15, 19)),
    (95, row(30, 20, 16, 20)),
    (100, row(31, 21, 17, 21)),
];

/// Structure row for a tonnage; only 5-ton steps from 20 to 100 exist
pub fn standard_structure(tonnage: u32) -> Option<StructureRow> {
    STRUCTURE_BY_TONNAGE
        .iter()
        .find(|(t, _)| *t == tonnage)
        .map(|(_, row)| *row)
}
