//! Tests for sampling helpers

#[cfg(test)]
mod tests {
    use quadstitch::math::probability::{rank_weights, uniform_around, weighted_choice};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    // Tests weighted choice never picks zero-weight entries
    // Verified by choosing uniformly
    #[test]
    fn test_weighted_choice_respects_zero_weights() {
        let mut rng = StdRng::seed_from_u64(42);
        let weights = [0.0, 3.0, 0.0, 1.0];
        let mut counts = [0usize; 4];
        for _ in 0..2000 {
            if let Some(count) = counts.get_mut(weighted_choice(&weights, &mut rng)) {
                *count += 1;
            }
        }
        assert_eq!(counts[0], 0);
        assert_eq!(counts[2], 0);
        assert!(counts[1] > 2 * counts[3], "{counts:?}");
    }

    // Tests degenerate weights fall back to the first index
    // Verified by dividing by a zero total
    #[test]
    fn test_weighted_choice_degenerate() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(weighted_choice(&[], &mut rng), 0);
        assert_eq!(weighted_choice(&[0.0, 0.0], &mut rng), 0);
        assert_eq!(weighted_choice(&[f64::NAN, 2.0], &mut rng), 1);
    }

    // Tests rank weights descend linearly from n to 1
    // Verified by starting at zero
    #[test]
    fn test_rank_weights() {
        assert_eq!(rank_weights(4), vec![4.0, 3.0, 2.0, 1.0]);
        assert!(rank_weights(0).is_empty());
    }

    // Tests uniform samples stay within the half width
    // Verified by sampling from [center, center + 2 * half_width]
    #[test]
    fn test_uniform_around() {
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..500 {
            let v = uniform_around(&mut rng, 3.0, 0.5);
            assert!((2.5..=3.5).contains(&v));
        }
        assert!((uniform_around(&mut rng, 3.0, 0.0) - 3.0).abs() < f64::EPSILON);
    }
}
