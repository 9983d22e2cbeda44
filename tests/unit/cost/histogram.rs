//! Tests for intensity histograms and their distance

#[cfg(test)]
mod tests {
    use quadstitch::cost::histogram::Histogram;

    fn filled(nbins: usize, values: &[f64]) -> Histogram {
        let mut hist = Histogram::new(nbins);
        for &v in values {
            hist.add(v);
        }
        hist
    }

    // Tests values land in the expected bins, including the upper edge
    // Verified by letting 1.0 index past the last bin
    #[test]
    fn test_binning() {
        let hist = filled(4, &[0.0, 0.1, 0.3, 0.99, 1.0, 1.5, -0.2]);

        assert!((hist.total() - 7.0).abs() < f64::EPSILON);
        let normalized = hist.normalized();
        let expected = [3.0 / 7.0, 1.0 / 7.0, 0.0, 3.0 / 7.0];
        for (got, want) in normalized.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{normalized:?}");
        }
    }

    // Tests non-finite samples are ignored
    // Verified by counting NaN into bin zero
    #[test]
    fn test_non_finite_ignored() {
        let hist = filled(8, &[f64::NAN, f64::INFINITY, 0.5]);
        assert!((hist.total() - 1.0).abs() < f64::EPSILON);
    }

    // Tests identical distributions are at distance zero and disjoint ones at one
    // Verified by dropping the one-half factor
    #[test]
    fn test_distance_range() {
        let a = filled(16, &[0.1, 0.2, 0.2, 0.9]);
        let b = filled(16, &[0.9, 0.2, 0.1, 0.2]);
        let c = filled(16, &[0.5, 0.55]);

        assert!(a.distance(&b).abs() < 1e-12);
        assert!((a.distance(&c) - 1.0).abs() < 1e-12);

        let half = filled(16, &[0.1, 0.5]);
        let d = a.distance(&half);
        assert!(d > 0.0 && d < 1.0, "distance {d}");
        assert!((d - half.distance(&a)).abs() < 1e-12);
    }

    // Tests an empty side is maximally distant
    // Verified by returning zero for empty histograms
    #[test]
    fn test_empty_is_maximal() {
        let empty = Histogram::new(16);
        let full = filled(16, &[0.3]);

        assert!(empty.is_empty());
        assert!((empty.distance(&full) - 1.0).abs() < f64::EPSILON);
        assert!((full.distance(&empty) - 1.0).abs() < f64::EPSILON);
        assert!(empty.normalized().iter().all(|v| v.abs() < f64::EPSILON));
    }

    // Tests a zero bin request still yields one bin
    // Verified by allowing an empty bin vector
    #[test]
    fn test_minimum_one_bin() {
        let hist = filled(0, &[0.7]);
        assert_eq!(hist.nbins(), 1);
        assert!((hist.total() - 1.0).abs() < f64::EPSILON);
    }
}
