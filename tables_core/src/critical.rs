use crate::threshold::{table_from_2d6_column, ThresholdTable};

/// Critical slots affected per 2d6 total (2 through 12)
const SEVERITY_COLUMN: [u32; 11] = [0, 0, 0, 0, 0, 0, 1, 1, 2, 2, 3];

/// Critical hit severity table
///
/// One check is made per structure-penetrating hit. A location that took no
/// structure damage never rolls.
#[derive(Debug, Clone, PartialEq)]
pub struct CriticalTable {
    severity: ThresholdTable<u32>,
}

impl Default for CriticalTable {
    fn default() -> Self {
        CriticalTable {
            severity: table_from_2d6_column(&SEVERITY_COLUMN),
        }
    }
}

impl CriticalTable {
    pub fn new(severity: ThresholdTable<u32>) -> Self {
        CriticalTable { severity }
    }

    /// Number of critical slots affected
    pub fn slots_affected(&self, penetrating_hits: u32, draw: f64) -> u32 {
        if penetrating_hits == 0 {
            return 0;
        }
        *self.severity.lookup(draw)
    }

    /// Chance that a penetrating hit produces at least one critical
    pub fn critical_chance(&self) -> f64 {
        self.severity.probability_where(|slots| *slots > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_penetration_no_crits() {
        let table = CriticalTable::default();
        assert_eq!(table.slots_affected(0, 0.999), 0);
    }

    #[test]
    fn test_severity_distribution() {
        let table = CriticalTable::default();
        // 8 or better on 2d6
        assert!((table.critical_chance() - 15.0 / 36.0).abs() < 1e-12);
        assert_eq!(table.slots_affected(1, 0.0), 0);
        assert_eq!(table.slots_affected(1, 0.9999), 3);
    }
}
