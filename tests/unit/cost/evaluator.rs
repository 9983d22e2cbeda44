//! Tests for full-placement cost evaluation on a synthetic section

#[cfg(test)]
mod tests {
    use crate::fixtures::quadrant_set;
    use quadstitch::StitchError;
    use quadstitch::cost::{CostConfig, CostEvaluator, CostFunction};
    use quadstitch::fragment::{PositionLabel, Transform, TransformVector};

    fn config() -> CostConfig {
        CostConfig {
            nbins: 16,
            histogram_window: 4,
            outer_point_weight: 0.5,
            overlap_weight: 100.0,
            distance_scaling_horizontal: true,
            distance_scaling_vertical: true,
        }
    }

    fn shifted(label: PositionLabel, tx: f64, ty: f64) -> TransformVector {
        let mut transforms = TransformVector::IDENTITY;
        transforms.set(label, Transform::new(tx, ty, 0.0));
        transforms
    }

    // Tests the ground-truth layout has no overlap, gap, outer offset or disjoint seam
    // Verified by comparing outer end points without the abutting-pixel allowance
    #[test]
    fn test_ground_truth_terms() {
        let set = quadrant_set();
        let evaluator = CostEvaluator::new(&set, config()).expect("valid config");
        let terms = evaluator.breakdown(&TransformVector::IDENTITY);

        assert_eq!(terms.disjoint_seams, 0);
        assert!(terms.overlap.abs() < f64::EPSILON);
        assert!(terms.gap.abs() < 1e-9, "gap {}", terms.gap);
        assert!(terms.outer.abs() < 1e-9, "outer {}", terms.outer);
        assert!(terms.histogram < 4.0);

        let moved = evaluator.breakdown(&shifted(PositionLabel::UpperRight, 0.0, 0.05));
        assert!(moved.outer > 0.0);
        assert!(terms.total.is_finite());
        assert!((evaluator.cost(&TransformVector::IDENTITY) - terms.total).abs() < f64::EPSILON);
    }

    // Tests a disjoint placement is finite and strictly worse than ground truth
    // Verified by scoring disjoint seams as zero
    #[test]
    fn test_disjoint_placement_penalised() {
        let set = quadrant_set();
        let evaluator = CostEvaluator::new(&set, config()).expect("valid config");

        let truth = evaluator.cost(&TransformVector::IDENTITY);
        let apart = evaluator.breakdown(&shifted(PositionLabel::UpperRight, 0.0, -0.4));

        assert!(apart.disjoint_seams >= 1);
        assert!(apart.total.is_finite());
        assert!(apart.total > truth, "{} <= {truth}", apart.total);
    }

    // Tests cost never decreases as the overlap weight grows
    // Verified by subtracting the overlap term
    #[test]
    fn test_overlap_weight_monotone() {
        let set = quadrant_set();
        let overlapping = shifted(PositionLabel::UpperRight, -0.1, 0.0);

        let mut previous = f64::NEG_INFINITY;
        for weight in [0.0, 1.0, 50.0, 100.0, 400.0] {
            let evaluator = CostEvaluator::new(
                &set,
                CostConfig {
                    overlap_weight: weight,
                    ..config()
                },
            )
            .expect("valid config");
            let terms = evaluator.breakdown(&overlapping);
            assert!(terms.overlap > 0.0);
            assert!(terms.total > previous, "weight {weight}");
            previous = terms.total;
        }
    }

    // Tests shifted fragments cost more than the ground truth
    // Verified by dropping the gap term
    #[test]
    fn test_gap_increases_cost() {
        let set = quadrant_set();
        let evaluator = CostEvaluator::new(&set, config()).expect("valid config");

        let truth = evaluator.breakdown(&TransformVector::IDENTITY);
        let gapped = evaluator.breakdown(&shifted(PositionLabel::UpperRight, 0.05, 0.0));

        assert!(gapped.gap > truth.gap + 1.0);
        assert!(gapped.total > truth.total);
    }

    // Tests distance scaling switches normalise by the canvas side, not the diagonal
    // Verified by ignoring the horizontal switch
    #[test]
    fn test_distance_scaling() {
        let set = quadrant_set();
        let placement = shifted(PositionLabel::UpperRight, 0.05, 0.0);

        let scaled = CostEvaluator::new(&set, config()).expect("valid config");
        let diagonal = CostEvaluator::new(
            &set,
            CostConfig {
                distance_scaling_horizontal: false,
                distance_scaling_vertical: false,
                ..config()
            },
        )
        .expect("valid config");

        let with = scaled.breakdown(&placement).gap;
        let without = diagonal.breakdown(&placement).gap;
        assert!(with > without, "{with} <= {without}");
        assert!((with / without - std::f64::consts::SQRT_2).abs() < 1e-9);
    }

    // Tests invalid tuning is rejected at construction
    // Verified by accepting zero bins
    #[test]
    fn test_invalid_config_rejected() {
        let set = quadrant_set();
        let cases = [
            CostConfig {
                nbins: 0,
                ..config()
            },
            CostConfig {
                histogram_window: 0,
                ..config()
            },
            CostConfig {
                overlap_weight: -1.0,
                ..config()
            },
            CostConfig {
                outer_point_weight: f64::NAN,
                ..config()
            },
        ];
        for case in cases {
            assert!(matches!(
                CostEvaluator::new(&set, case),
                Err(StitchError::InvalidParameter { .. })
            ));
        }
    }

    // Tests plain closures act as cost functions
    // Verified by removing the blanket implementation
    #[test]
    fn test_closure_cost_function() {
        let cost = |t: &TransformVector| t.get(PositionLabel::LowerLeft).angle.abs();
        let mut transforms = TransformVector::IDENTITY;
        transforms.set(PositionLabel::LowerLeft, Transform::new(0.0, 0.0, -3.0));
        assert!((cost.cost(&transforms) - 3.0).abs() < f64::EPSILON);
    }
}
