use crate::TableError;

/// Tolerance when checking that explicit probabilities sum to one
const MASS_TOLERANCE: f64 = 1e-6;

/// Ordered list of `(upper_bound, outcome)` buckets over `[0, 1)`
///
/// Bucket `i` covers draws in `[upper[i-1], upper[i])`. The last bound is
/// always exactly 1.0 so rounding never leaves a gap at the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdTable<T> {
    buckets: Vec<Bucket<T>>,
}

#[derive(Debug, Clone, PartialEq)]
struct Bucket<T> {
    upper: f64,
    outcome: T,
}

impl<T: Clone> ThresholdTable<T> {
    /// Build from integer weights; zero-weight outcomes are dropped
    pub fn from_weights<I>(weights: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (T, u32)>,
    {
        let weights: Vec<(T, u32)> = weights.into_iter().filter(|(_, w)| *w > 0).collect();
        let total: u64 = weights.iter().map(|(_, w)| *w as u64).sum();
        if total == 0 {
            return Err(TableError::Empty);
        }

        let masses = weights
            .into_iter()
            .map(|(outcome, w)| (outcome, w as f64 / total as f64));
        Ok(Self::cumulative(masses))
    }

    /// Build from explicit probabilities that must sum to one
    pub fn from_probabilities<I>(probabilities: I) -> Result<Self, TableError>
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let mut masses = Vec::new();
        for (outcome, p) in probabilities {
            if !p.is_finite() || p < 0.0 {
                return Err(TableError::InvalidProbability(p));
            }
            if p > 0.0 {
                masses.push((outcome, p));
            }
        }
        if masses.is_empty() {
            return Err(TableError::Empty);
        }

        let total: f64 = masses.iter().map(|(_, p)| p).sum();
        if (total - 1.0).abs() > MASS_TOLERANCE {
            return Err(TableError::MassMismatch(total));
        }
        Ok(Self::cumulative(masses))
    }

    /// Accumulate non-empty masses; the remainder lands in the last bucket
    pub(crate) fn cumulative<I>(masses: I) -> Self
    where
        I: IntoIterator<Item = (T, f64)>,
    {
        let mut running = 0.0;
        let mut buckets: Vec<Bucket<T>> = masses
            .into_iter()
            .map(|(outcome, p)| {
                running += p;
                Bucket {
                    upper: running,
                    outcome,
                }
            })
            .collect();
        if let Some(last) = buckets.last_mut() {
            last.upper = 1.0;
        }
        ThresholdTable { buckets }
    }

    /// Outcome for a draw in `[0, 1)`
    pub fn lookup(&self, draw: f64) -> &T {
        let idx = self
            .buckets
            .partition_point(|b| b.upper <= draw)
            .min(self.buckets.len() - 1);
        &self.buckets[idx].outcome
    }

    /// Probability mass of each bucket, in order
    pub fn masses(&self) -> impl Iterator<Item = (&T, f64)> + '_ {
        let mut lower = 0.0;
        self.buckets.iter().map(move |b| {
            let mass = b.upper - lower;
            lower = b.upper;
            (&b.outcome, mass)
        })
    }

    /// Total probability of outcomes matching a predicate
    pub fn probability_where(&self, mut pred: impl FnMut(&T) -> bool) -> f64 {
        self.masses()
            .filter(|(outcome, _)| pred(outcome))
            .map(|(_, mass)| mass)
            .sum()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Merge a 2d6 column (totals 2..=12) into weighted outcomes, first-seen order
pub(crate) fn weights_from_2d6_column<T: Clone + PartialEq>(column: &[T; 11]) -> Vec<(T, u32)> {
    let mut weights: Vec<(T, u32)> = Vec::new();
    for (outcome, ways) in column.iter().zip(crate::dice::TWO_D6_WEIGHTS) {
        match weights.iter_mut().find(|(o, _)| o == outcome) {
            Some((_, w)) => *w += ways,
            None => weights.push((outcome.clone(), ways)),
        }
    }
    weights
}

/// Threshold table for a 2d6 column; the 36 combinations are never empty
pub(crate) fn table_from_2d6_column<T: Clone + PartialEq>(column: &[T; 11]) -> ThresholdTable<T> {
    let total = crate::dice::TWO_D6_COMBINATIONS as f64;
    ThresholdTable::cumulative(
        weights_from_2d6_column(column)
            .into_iter()
            .map(|(o, w)| (o, w as f64 / total)),
    )
}
