//! Sampling helpers for the genetic operators

use rand::Rng;

/// Weighted random selection
///
/// Returns an index into `weights` using the cumulative distribution.
/// Non-positive totals fall back to index 0.
pub fn weighted_choice<R: Rng + ?Sized>(weights: &[f64], rng: &mut R) -> usize {
    let total: f64 = weights.iter().filter(|w| w.is_finite()).sum();
    if total <= 0.0 || weights.is_empty() {
        return 0;
    }

    let mut rand_val = rng.random::<f64>() * total;
    for (i, &weight) in weights.iter().enumerate() {
        if !weight.is_finite() {
            continue;
        }
        rand_val -= weight;
        if rand_val <= 0.0 {
            return i;
        }
    }
    weights.len() - 1
}

/// Linear rank weights for `n` items sorted best first
///
/// The best item weighs `n`, the worst weighs 1, so selection pressure does
/// not depend on the scale of the underlying costs.
pub fn rank_weights(n: usize) -> Vec<f64> {
    (0..n).map(|rank| (n - rank) as f64).collect()
}

/// Uniform sample from `[center - half_width, center + half_width]`
pub fn uniform_around<R: Rng + ?Sized>(rng: &mut R, center: f64, half_width: f64) -> f64 {
    if half_width <= 0.0 {
        return center;
    }
    rng.random_range(-half_width..=half_width) + center
}
