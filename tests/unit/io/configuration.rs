//! Tests for stitching parameters, their defaults and per-stage expansion

#[cfg(test)]
mod tests {
    use quadstitch::StitchError;
    use quadstitch::genetic::{CrossoverPolicy, ParentSelection};
    use quadstitch::io::configuration::{
        DEFAULT_HIST_SIZES, DEFAULT_RESOLUTIONS, StitchParameters, default_translation_ranges,
    };

    fn parameter_of(result: Result<(), StitchError>) -> Option<&'static str> {
        match result {
            Err(StitchError::InvalidParameter { parameter, .. }) => Some(parameter),
            _ => None,
        }
    }

    // Tests translation ranges shrink with resolution and the last repeats the previous
    // Verified by scaling against the previous stage instead of the first
    #[test]
    fn test_default_translation_ranges() {
        let ranges = default_translation_ranges(&DEFAULT_RESOLUTIONS);
        let expected = [0.05, 0.025, 0.05 / 6.0, 0.05 / 6.0];
        assert_eq!(ranges.len(), expected.len());
        for (got, want) in ranges.iter().zip(expected) {
            assert!((got - want).abs() < 1e-12, "{got} vs {want}");
        }
        assert_eq!(default_translation_ranges(&[0.3]), vec![0.05]);
        assert!(default_translation_ranges(&[]).is_empty());
    }

    // Tests the defaults are valid and produce one stage per resolution
    // Verified by dropping a histogram size
    #[test]
    fn test_defaults_valid() {
        let parameters = StitchParameters::default();
        assert!(parameters.validate().is_ok());
        let stages = parameters.stages().expect("valid defaults");
        assert_eq!(stages.len(), DEFAULT_RESOLUTIONS.len());
        assert_eq!(parameters.crossover_type, CrossoverPolicy::Scattered);
        assert_eq!(parameters.parent_selection, ParentSelection::Rank);
    }

    // Tests a stage carries its own resolution, ranges and histogram window
    // Verified by using stage 0's window for every stage
    #[test]
    fn test_stage_fields() {
        let parameters = StitchParameters {
            seed: 9,
            ..StitchParameters::default()
        };
        let stage = parameters.stage(2).expect("stage exists");
        assert!((stage.resolution - 0.15).abs() < f64::EPSILON);
        assert!((stage.angle_range - 5.0).abs() < f64::EPSILON);
        assert_eq!(stage.cost.histogram_window, 20);
        assert_eq!(stage.genetic.seed, 9);
        assert_eq!(stage.genetic.population_size, parameters.n_solutions);

        assert!(matches!(
            parameters.stage(4),
            Err(StitchError::InvalidParameter { parameter: "resolutions", .. })
        ));
    }

    // Tests replacing resolutions rebuilds every per-stage list
    // Verified by keeping the old translation ranges
    #[test]
    fn test_with_resolutions() {
        let parameters = StitchParameters::default().with_resolutions(vec![0.1, 0.2, 0.4, 0.8, 1.0]);
        assert!(parameters.validate().is_ok());
        assert_eq!(parameters.translation_range.len(), 5);
        assert_eq!(parameters.angle_range, vec![10.0, 10.0, 5.0, 5.0, 5.0]);
        assert_eq!(parameters.hist_sizes.last(), DEFAULT_HIST_SIZES.last());
    }

    // Tests invalid fields are reported by name
    // Verified by validating only the first stage
    #[test]
    fn test_validate_errors() {
        let base = StitchParameters::default();

        let mut descending = base.clone();
        descending.resolutions = vec![0.5, 0.15, 0.05, 0.025];
        assert_eq!(parameter_of(descending.validate()), Some("resolutions"));

        let mut above_one = base.clone();
        above_one.resolutions = vec![0.025, 0.05, 0.15, 1.5];
        assert_eq!(parameter_of(above_one.validate()), Some("resolutions"));

        let mut short = base.clone();
        short.angle_range.pop();
        assert_eq!(parameter_of(short.validate()), Some("angle_range"));

        let mut negative_pad = base.clone();
        negative_pad.pad_fraction = -0.1;
        assert_eq!(parameter_of(negative_pad.validate()), Some("pad_fraction"));

        let mut no_top_k = base.clone();
        no_top_k.top_k = 0;
        assert_eq!(parameter_of(no_top_k.validate()), Some("top_k"));

        let mut too_many_parents = base.clone();
        too_many_parents.n_parents = base.n_solutions + 1;
        assert_eq!(parameter_of(too_many_parents.validate()), Some("n_parents"));

        let mut no_bins = base;
        no_bins.nbins = 0;
        assert_eq!(parameter_of(no_bins.validate()), Some("nbins"));
        assert!(no_bins.stages().is_err());
    }
}
