use crate::dice::two_d6_from_draws;
use crate::TableError;
use std::collections::BTreeMap;

/// Projectiles connecting per 2d6 total (columns 2 through 12), keyed by launcher size
const STANDARD_ROWS: [(u32, [u32; 11]); 7] = [
    (2, [1, 1, 1, 1, 1, 1, 2, 2, 2, 2, 2]),
    (4, [1, 1, 2, 2, 2, 3, 3, 3, 3, 4, 4]),
    (5, [1, 2, 2, 3, 3, 3, 3, 4, 4, 5, 5]),
    (6, [2, 2, 3, 3, 4, 4, 4, 4, 5, 5, 6]),
    (10, [3, 3, 4, 6, 6, 6, 6, 8, 8, 10, 10]),
    (15, [5, 5, 6, 9, 9, 9, 9, 12, 12, 15, 15]),
    (20, [6, 6, 9, 12, 12, 12, 12, 16, 16, 20, 20]),
];

/// Cluster hits table
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterTable {
    rows: BTreeMap<u32, [u32; 11]>,
}

impl Default for ClusterTable {
    fn default() -> Self {
        ClusterTable {
            rows: STANDARD_ROWS.into_iter().collect(),
        }
    }
}

impl ClusterTable {
    /// Build a table from explicit rows, validating each one
    pub fn from_rows<I>(rows: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (u32, [u32; 11])>,
    {
        let mut table = BTreeMap::new();
        for (size, hits) in rows {
            if size == 0 {
                return Err(TableError::InvalidClusterRow {
                    size,
                    reason: "size must be positive".to_string(),
                });
            }
            if let Some(bad) = hits.iter().find(|h| **h > size) {
                return Err(TableError::InvalidClusterRow {
                    size,
                    reason: format!("{} hits exceeds launcher size", bad),
                });
            }
            if hits.windows(2).any(|w| w[1] < w[0]) {
                return Err(TableError::InvalidClusterRow {
                    size,
                    reason: "hits must not decrease as the roll rises".to_string(),
                });
            }
            table.insert(size, hits);
        }
        if table.is_empty() {
            return Err(TableError::Empty);
        }
        Ok(ClusterTable { rows: table })
    }

    /// Row used for a launcher size: exact match, else the nearest size (smaller on ties)
    fn row_for(&self, cluster_size: u32) -> Option<&[u32; 11]> {
        if let Some(row) = self.rows.get(&cluster_size) {
            return Some(row);
        }
        self.rows
            .iter()
            .min_by_key(|(size, _)| size.abs_diff(cluster_size))
            .map(|(_, row)| row)
    }

    /// Projectiles connecting for a launcher of `cluster_size` given a 2d6 total
    pub fn hits_for_roll(&self, cluster_size: u32, roll: u8) -> u32 {
        if cluster_size <= 1 {
            return cluster_size;
        }
        let column = roll.clamp(2, 12) as usize - 2;
        self.row_for(cluster_size)
            .map(|row| row[column].min(cluster_size))
            .unwrap_or(cluster_size)
    }

    /// Projectiles connecting given two independent draws in `[0, 1)`
    pub fn hits(&self, cluster_size: u32, first: f64, second: f64) -> u32 {
        self.hits_for_roll(cluster_size, two_d6_from_draws(first, second))
    }

    /// Expected fraction of a launcher's projectiles that connect
    pub fn expected_fraction(&self, cluster_size: u32) -> f64 {
        if cluster_size == 0 {
            return 0.0;
        }
        let expected: f64 = (2..=12u8)
            .zip(crate::dice::TWO_D6_WEIGHTS)
            .map(|(roll, ways)| {
                self.hits_for_roll(cluster_size, roll) as f64 * ways as f64
            })
            .sum::<f64>()
            / crate::dice::TWO_D6_COMBINATIONS as f64;
        expected / cluster_size as f64
    }

    pub fn sizes(&self) -> impl Iterator<Item = u32> + '_ {
        self.rows.keys().copied()
    }
}
