//! Tests for the generational loop and its outcome

#[cfg(test)]
mod tests {
    use crate::fixtures::quadrant_set;
    use quadstitch::StitchError;
    use quadstitch::cost::{CostConfig, CostEvaluator, CostFunction};
    use quadstitch::fragment::{PositionLabel, Transform, TransformVector};
    use quadstitch::genetic::{
        CrossoverPolicy, GeneticConfig, GeneticOptimizer, MutationPolicy, OptimizationOutcome,
        ParentSelection, SearchSpace,
    };
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn config(seed: u64) -> GeneticConfig {
        GeneticConfig {
            population_size: 12,
            generation_count: 30,
            parent_count: 4,
            mating_pool_size: 8,
            crossover_probability: 0.5,
            crossover_policy: CrossoverPolicy::Scattered,
            mutation_probability: 0.25,
            mutation_policy: MutationPolicy::Random,
            parent_selection: ParentSelection::Rank,
            seed,
        }
    }

    fn target() -> TransformVector {
        let mut t = TransformVector::IDENTITY;
        t.set(PositionLabel::UpperRight, Transform::new(0.02, -0.01, 1.5));
        t.set(PositionLabel::LowerLeft, Transform::new(-0.015, 0.0, -2.0));
        t
    }

    fn quadratic(transforms: &TransformVector) -> f64 {
        transforms
            .to_genes()
            .iter()
            .zip(target().to_genes().iter())
            .map(|(a, b)| (a - b) * (a - b))
            .sum()
    }

    // Tests invalid sizes and probabilities are rejected
    // Verified by constructing with parent_count above population_size
    #[test]
    fn test_validate() {
        assert!(config(1).validate().is_ok());

        let bad = [
            (GeneticConfig { population_size: 1, ..config(1) }, "n_solutions"),
            (GeneticConfig { parent_count: 0, ..config(1) }, "n_parents"),
            (GeneticConfig { parent_count: 13, ..config(1) }, "n_parents"),
            (GeneticConfig { mating_pool_size: 0, ..config(1) }, "n_mating"),
            (GeneticConfig { crossover_probability: 1.5, ..config(1) }, "p_crossover"),
            (GeneticConfig { mutation_probability: -0.1, ..config(1) }, "p_mutation"),
        ];
        let space = SearchSpace::new(0.05, 5.0, None).expect("valid space");
        for (cfg, name) in bad {
            let result = GeneticOptimizer::new(&quadratic, cfg, space);
            assert!(
                matches!(result, Err(StitchError::InvalidParameter { parameter, .. }) if parameter == name),
                "{name}"
            );
        }
    }

    // Tests the warm start is kept as a member of the first generation
    // Verified by sampling the whole population at random
    #[test]
    fn test_initial_population_contains_warm_start() {
        let space = SearchSpace::new(0.05, 5.0, Some(target())).expect("valid space");
        let optimizer = GeneticOptimizer::new(&quadratic, config(3), space).expect("valid config");
        let mut rng = StdRng::seed_from_u64(3);
        let population = optimizer.initial_population(&mut rng);

        assert_eq!(population.len(), 12);
        assert_eq!(population.best().map(|c| c.transforms()), Some(target()));
        assert!(population.members().iter().all(|c| space.contains(&c.genes)));
    }

    // Tests the same seed reproduces the same run
    // Verified by seeding from entropy
    #[test]
    fn test_deterministic_for_seed() {
        let space = SearchSpace::new(0.05, 5.0, None).expect("valid space");
        let run = |seed| -> OptimizationOutcome {
            GeneticOptimizer::new(&quadratic, config(seed), space)
                .expect("valid config")
                .run()
        };

        let first = run(7);
        assert_eq!(first, run(7));
        assert_eq!(first.seed, 7);
        assert_eq!(first.history.len(), 30);
    }

    // Tests the best cost never increases across generations
    // Verified by replacing the whole population with offspring
    #[test]
    fn test_elitism_monotone_history() {
        let space = SearchSpace::new(0.05, 5.0, None).expect("valid space");
        let optimizer = GeneticOptimizer::new(&quadratic, config(11), space).expect("valid config");
        let mut seen = 0;
        let outcome = optimizer.run_with(|generation, population| {
            seen = generation;
            assert!(population.len() <= 12);
        });

        assert_eq!(seen, 30);
        assert!(outcome.cost <= outcome.initial_cost);
        for pair in outcome.history.windows(2) {
            if let [before, after] = pair {
                assert!(after <= before);
            }
        }
        assert!(outcome.improved());
        assert!(outcome.improvement() > 0.0);
        assert!((quadratic(&outcome.best) - outcome.cost).abs() < 1e-12);
    }

    // Tests a warm start at the optimum is never lost
    // Verified by dropping the warm start from the first generation
    #[test]
    fn test_warm_start_at_optimum() {
        let space = SearchSpace::new(0.05, 5.0, Some(target())).expect("valid space");
        let outcome = GeneticOptimizer::new(&quadratic, config(5), space)
            .expect("valid config")
            .run();

        assert!(outcome.cost.abs() < f64::EPSILON);
        assert_eq!(outcome.best, target());
        assert!(!outcome.improved());
    }

    // Tests a warm start at the true layout of a section stays near it
    // Verified by dropping the gap and outer point terms from the cost
    #[test]
    fn test_warm_start_on_section() {
        let set = quadrant_set();
        let cost_config = CostConfig {
            nbins: 16,
            histogram_window: 4,
            outer_point_weight: 0.5,
            overlap_weight: 100.0,
            distance_scaling_horizontal: true,
            distance_scaling_vertical: true,
        };
        let evaluator = CostEvaluator::new(&set, cost_config).expect("valid config");
        let truth = evaluator.cost(&TransformVector::IDENTITY);
        let space =
            SearchSpace::new(0.05, 10.0, Some(TransformVector::IDENTITY)).expect("valid space");
        let outcome = GeneticOptimizer::new(&evaluator, config(42), space)
            .expect("valid config")
            .run();

        assert!(outcome.initial_cost <= truth + 1e-12);
        let (shift, angle) = outcome.best.max_deviation(&TransformVector::IDENTITY);
        assert!(shift <= 0.02, "drifted {shift} of the canvas");
        assert!(angle <= 4.0, "drifted {angle} degrees");
        assert!(
            outcome.cost >= 0.75 * truth,
            "cost {} far below ground truth {truth}",
            outcome.cost
        );
    }

    // Tests a cost that is never finite still yields an outcome
    // Verified by panicking on an empty viable pool
    #[test]
    fn test_all_non_finite() {
        let space = SearchSpace::new(0.05, 5.0, None).expect("valid space");
        let nan = |_: &TransformVector| f64::NAN;
        let outcome = GeneticOptimizer::new(&nan, config(2), space)
            .expect("valid config")
            .run();

        assert!(outcome.cost.is_infinite());
        assert!(!outcome.improved());
        assert!(outcome.improvement().abs() < f64::EPSILON);
    }
}
