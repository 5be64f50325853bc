//! Dice helpers mapping uniform draws onto six-sided dice

use rand::Rng;

/// Ways to roll each 2d6 total, indexed from 2 to 12
pub const TWO_D6_WEIGHTS: [u32; 11] = [1, 2, 3, 4, 5, 6, 5, 4, 3, 2, 1];

/// Total number of 2d6 combinations
pub const TWO_D6_COMBINATIONS: u32 = 36;

/// Map a draw in `[0, 1)` onto a single die face 1-6
///
/// Draws outside the interval are clamped so a stray 1.0 still lands on a six.
pub fn die_from_draw(draw: f64) -> u8 {
    let face = (draw.clamp(0.0, 1.0) * 6.0).floor() as u8 + 1;
    face.min(6)
}

/// Sum two independent draws as a 2d6 roll
pub fn two_d6_from_draws(first: f64, second: f64) -> u8 {
    die_from_draw(first) + die_from_draw(second)
}

/// Roll 2d6 by consuming exactly two draws from the random source
pub fn roll_2d6<R: Rng + ?Sized>(rng: &mut R) -> u8 {
    let first = rng.gen::<f64>();
    let second = rng.gen::<f64>();
    two_d6_from_draws(first, second)
}

/// Probability of rolling at least `target` on 2d6
pub fn probability_at_least(target: i32) -> f64 {
    if target <= 2 {
        return 1.0;
    }
    if target > 12 {
        return 0.0;
    }
    let ways: u32 = TWO_D6_WEIGHTS[(target - 2) as usize..].iter().sum();
    ways as f64 / TWO_D6_COMBINATIONS as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_die_faces_cover_range() {
        assert_eq!(die_from_draw(0.0), 1);
        assert_eq!(die_from_draw(0.1666), 1);
        assert_eq!(die_from_draw(0.5), 4);
        assert_eq!(die_from_draw(0.9999), 6);
        assert_eq!(die_from_draw(1.0), 6);
    }

    #[test]
    fn test_weights_sum() {
        assert_eq!(TWO_D6_WEIGHTS.iter().sum::<u32>(), TWO_D6_COMBINATIONS);
    }

    #[test]
    fn test_probability_at_least() {
        assert!((probability_at_least(2) - 1.0).abs() < f64::EPSILON);
        assert!((probability_at_least(7) - 21.0 / 36.0).abs() < 1e-12);
        assert!((probability_at_least(12) - 1.0 / 36.0).abs() < 1e-12);
        assert_eq!(probability_at_least(13), 0.0);
    }

    #[test]
    fn test_roll_2d6_distribution() {
        let mut rng = ChaCha8Rng::seed_from_u64(7);
        let mut sevens = 0;
        let iterations = 36_000;
        for _ in 0..iterations {
            let roll = roll_2d6(&mut rng);
            assert!((2..=12).contains(&roll));
            if roll == 7 {
                sevens += 1;
            }
        }
        let ratio = sevens as f64 / iterations as f64;
        assert!((ratio - 6.0 / 36.0).abs() < 0.01, "ratio was {}", ratio);
    }
}
