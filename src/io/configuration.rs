//! Pipeline constants and runtime configuration defaults

use crate::cost::CostConfig;
use crate::genetic::{CrossoverPolicy, GeneticConfig, MutationPolicy, ParentSelection};
use crate::io::error::{Result, invalid_parameter};
use crate::schedule::StageConfig;

// Resolution schedule
/// Scale factors of the raw images, coarsest first
pub const DEFAULT_RESOLUTIONS: [f64; 4] = [0.025, 0.05, 0.15, 0.5];
/// Translation half width of the coarsest stage, as a fraction of the canvas
pub const BASE_TRANSLATION_RANGE: f64 = 0.05;
/// Angle half width per stage, in degrees
pub const DEFAULT_ANGLE_RANGES: [f64; 4] = [10.0, 10.0, 5.0, 5.0];
/// Canvas padding relative to the largest fragment side
pub const DEFAULT_PAD_FRACTION: f64 = 0.7;

// Genetic algorithm
/// Candidates per generation
pub const DEFAULT_N_SOLUTIONS: usize = 20;
/// Generations per stage
pub const DEFAULT_N_GENERATIONS: usize = 100;
/// Parents drawn per generation
pub const DEFAULT_N_PARENTS: usize = 3;
/// Offspring produced per generation
pub const DEFAULT_N_MATING: usize = 6;
/// Crossover probability
pub const DEFAULT_P_CROSSOVER: f64 = 0.5;
/// Per-gene mutation probability
pub const DEFAULT_P_MUTATION: f64 = 0.25;

// Cost function
/// Intensity histogram bins
pub const DEFAULT_NBINS: usize = 16;
/// Histogram window depth per stage, in pixels
pub const DEFAULT_HIST_SIZES: [usize; 4] = [4, 8, 20, 80];
/// Weight of the outer end-point term
pub const DEFAULT_OUTER_POINT_WEIGHT: f64 = 0.5;
/// Weight of the overlap term
pub const DEFAULT_OVERLAP_WEIGHT: f64 = 100.0;

// Configuration resolver
/// Candidate configurations optimized in candidate mode
pub const DEFAULT_TOP_K: usize = 3;

// Safety limit to prevent excessive memory allocation
/// Maximum canvas side after padding
pub const MAX_CANVAS_DIMENSION: usize = 20_000;

// Progress bar display settings
/// Width of progress bars in characters
pub const PROGRESS_BAR_WIDTH: u16 = 40;

// Default values for configurable parameters
/// Fixed seed for reproducible stitching
pub const DEFAULT_SEED: u64 = 42;

// Output settings
/// File name of the fused image inside the output directory
pub const OUTPUT_FILE_NAME: &str = "stitched.png";

/// Translation half width per stage
///
/// The range shrinks in proportion to the resolution gain over the first stage.
/// The last stage reuses the previous stage's range.
pub fn default_translation_ranges(resolutions: &[f64]) -> Vec<f64> {
    let base = resolutions.first().copied().unwrap_or(1.0);
    let mut ranges: Vec<f64> = resolutions
        .iter()
        .map(|&r| BASE_TRANSLATION_RANGE / (r / base))
        .collect();
    if ranges.len() > 1 {
        let previous = ranges.get(ranges.len() - 2).copied();
        if let (Some(last), Some(previous)) = (ranges.last_mut(), previous) {
            *last = previous;
        }
    }
    ranges
}

/// Every tunable of a stitching run
#[derive(Debug, Clone, PartialEq)]
pub struct StitchParameters {
    /// Ascending scale factors of the raw images
    pub resolutions: Vec<f64>,
    /// Translation half width per stage, as a fraction of the canvas
    pub translation_range: Vec<f64>,
    /// Angle half width per stage, in degrees
    pub angle_range: Vec<f64>,
    /// Population size
    pub n_solutions: usize,
    /// Generations per stage
    pub n_generations: usize,
    /// Parents per generation
    pub n_parents: usize,
    /// Offspring per generation
    pub n_mating: usize,
    /// Crossover probability
    pub p_crossover: f64,
    /// Crossover operator
    pub crossover_type: CrossoverPolicy,
    /// Per-gene mutation probability
    pub p_mutation: f64,
    /// Mutation operator
    pub mutation_type: MutationPolicy,
    /// Parent selection operator
    pub parent_selection: ParentSelection,
    /// Histogram bins
    pub nbins: usize,
    /// Histogram window depth per stage, in pixels
    pub hist_sizes: Vec<usize>,
    /// Weight of the outer end-point term
    pub outer_point_weight: f64,
    /// Weight of the overlap term
    pub overlap_weight: f64,
    /// Normalise horizontal distances by the canvas width
    pub distance_scaling_hor_required: bool,
    /// Normalise vertical distances by the canvas height
    pub distance_scaling_ver_required: bool,
    /// Canvas padding relative to the largest fragment side
    pub pad_fraction: f64,
    /// Base RNG seed; stage `i` uses `seed + i`
    pub seed: u64,
    /// Candidate configurations optimized in candidate mode
    pub top_k: usize,
}

impl Default for StitchParameters {
    fn default() -> Self {
        Self {
            resolutions: DEFAULT_RESOLUTIONS.to_vec(),
            translation_range: default_translation_ranges(&DEFAULT_RESOLUTIONS),
            angle_range: DEFAULT_ANGLE_RANGES.to_vec(),
            n_solutions: DEFAULT_N_SOLUTIONS,
            n_generations: DEFAULT_N_GENERATIONS,
            n_parents: DEFAULT_N_PARENTS,
            n_mating: DEFAULT_N_MATING,
            p_crossover: DEFAULT_P_CROSSOVER,
            crossover_type: CrossoverPolicy::Scattered,
            p_mutation: DEFAULT_P_MUTATION,
            mutation_type: MutationPolicy::Random,
            parent_selection: ParentSelection::Rank,
            nbins: DEFAULT_NBINS,
            hist_sizes: DEFAULT_HIST_SIZES.to_vec(),
            outer_point_weight: DEFAULT_OUTER_POINT_WEIGHT,
            overlap_weight: DEFAULT_OVERLAP_WEIGHT,
            distance_scaling_hor_required: true,
            distance_scaling_ver_required: true,
            pad_fraction: DEFAULT_PAD_FRACTION,
            seed: DEFAULT_SEED,
            top_k: DEFAULT_TOP_K,
        }
    }
}

impl StitchParameters {
    /// Check every field once
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        if self.resolutions.is_empty() {
            return Err(invalid_parameter(
                "resolutions",
                &"[]",
                &"at least one resolution is required",
            ));
        }
        let mut previous = 0.0;
        for &r in &self.resolutions {
            if !r.is_finite() || r <= previous || r > 1.0 {
                return Err(invalid_parameter(
                    "resolutions",
                    &r,
                    &"must be strictly ascending within (0, 1]",
                ));
            }
            previous = r;
        }

        let stages = self.resolutions.len();
        for (name, len) in [
            ("translation_range", self.translation_range.len()),
            ("angle_range", self.angle_range.len()),
            ("hist_sizes", self.hist_sizes.len()),
        ] {
            if len != stages {
                return Err(invalid_parameter(
                    name,
                    &len,
                    &format!("needs one entry per resolution ({stages})"),
                ));
            }
        }

        if !self.pad_fraction.is_finite() || self.pad_fraction < 0.0 {
            return Err(invalid_parameter(
                "pad_fraction",
                &self.pad_fraction,
                &"must be finite and non-negative",
            ));
        }
        if self.top_k == 0 {
            return Err(invalid_parameter("top_k", &self.top_k, &"must be positive"));
        }

        for index in 0..stages {
            let stage = self.stage(index)?;
            stage.cost.validate()?;
            stage.genetic.validate()?;
            for (name, range) in [
                ("translation_range", stage.translation_range),
                ("angle_range", stage.angle_range),
            ] {
                if !range.is_finite() || range < 0.0 {
                    return Err(invalid_parameter(
                        name,
                        &range,
                        &"must be finite and non-negative",
                    ));
                }
            }
        }
        Ok(())
    }

    /// Genetic-algorithm tuning shared by every stage
    pub const fn genetic(&self) -> GeneticConfig {
        GeneticConfig {
            population_size: self.n_solutions,
            generation_count: self.n_generations,
            parent_count: self.n_parents,
            mating_pool_size: self.n_mating,
            crossover_probability: self.p_crossover,
            crossover_policy: self.crossover_type,
            mutation_probability: self.p_mutation,
            mutation_policy: self.mutation_type,
            parent_selection: self.parent_selection,
            seed: self.seed,
        }
    }

    /// Configuration of stage `index`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if `index` has no entry in one of the per-stage lists
    pub fn stage(&self, index: usize) -> Result<StageConfig> {
        let missing = |name: &'static str| {
            invalid_parameter(name, &index, &"no entry for this resolution index")
        };
        let resolution = *self.resolutions.get(index).ok_or_else(|| missing("resolutions"))?;
        let translation_range = *self
            .translation_range
            .get(index)
            .ok_or_else(|| missing("translation_range"))?;
        let angle_range = *self
            .angle_range
            .get(index)
            .ok_or_else(|| missing("angle_range"))?;
        let histogram_window = *self
            .hist_sizes
            .get(index)
            .ok_or_else(|| missing("hist_sizes"))?;

        Ok(StageConfig {
            resolution,
            translation_range,
            angle_range,
            cost: CostConfig {
                nbins: self.nbins,
                histogram_window,
                outer_point_weight: self.outer_point_weight,
                overlap_weight: self.overlap_weight,
                distance_scaling_horizontal: self.distance_scaling_hor_required,
                distance_scaling_vertical: self.distance_scaling_ver_required,
            },
            genetic: self.genetic(),
        })
    }

    /// Configurations of every stage, coarsest first
    ///
    /// # Errors
    ///
    /// Returns the validation error if the parameters are invalid
    pub fn stages(&self) -> Result<Vec<StageConfig>> {
        self.validate()?;
        (0..self.resolutions.len()).map(|i| self.stage(i)).collect()
    }

    /// Replace the resolution list, recomputing the default per-stage lists
    ///
    /// Angle ranges and histogram windows beyond the defaults repeat the last default.
    #[must_use]
    pub fn with_resolutions(mut self, resolutions: Vec<f64>) -> Self {
        let per_stage = |defaults: &[f64], i: usize| {
            defaults
                .get(i)
                .or_else(|| defaults.last())
                .copied()
                .unwrap_or_default()
        };
        self.translation_range = default_translation_ranges(&resolutions);
        self.angle_range = (0..resolutions.len())
            .map(|i| per_stage(&DEFAULT_ANGLE_RANGES, i))
            .collect();
        self.hist_sizes = (0..resolutions.len())
            .map(|i| {
                DEFAULT_HIST_SIZES
                    .get(i)
                    .or_else(|| DEFAULT_HIST_SIZES.last())
                    .copied()
                    .unwrap_or(1)
            })
            .collect();
        self.resolutions = resolutions;
        self
    }
}
