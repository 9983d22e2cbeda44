//! Coarse-to-fine orchestration of the genetic optimizer
//!
//! Stages run strictly in order: every stage is warm-started from the best
//! placement of the previous one. A later stage that ends worse than its
//! predecessor is kept anyway; there is no rollback.

use crate::configuration::Configuration;
use crate::cost::{CostConfig, CostEvaluator};
use crate::fragment::{QuadrantSet, TransformVector};
use crate::genetic::{GeneticConfig, GeneticOptimizer, SearchSpace};
use crate::io::error::{Result, configuration_error, invalid_parameter};

/// Everything one resolution stage needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StageConfig {
    /// Scale factor of this stage relative to the raw images
    pub resolution: f64,
    /// Half width of the translation search, as a fraction of the canvas
    pub translation_range: f64,
    /// Half width of the angle search, in degrees
    pub angle_range: f64,
    /// Cost-function tuning
    pub cost: CostConfig,
    /// Optimizer tuning
    pub genetic: GeneticConfig,
}

/// Supplies freshly prepared fragments for each stage
pub trait FragmentSource {
    /// Fragments of stage `resolution_index`, with identity transforms
    ///
    /// # Errors
    ///
    /// Returns an error if the fragments cannot be loaded or prepared
    fn quadrants(&mut self, resolution_index: usize, stage: &StageConfig) -> Result<QuadrantSet>;
}

/// Summary of one finished stage
#[derive(Debug, Clone, PartialEq)]
pub struct StageReport {
    /// Stage index
    pub resolution_index: usize,
    /// Stage scale factor
    pub resolution: f64,
    /// Best cost of the stage
    pub cost: f64,
    /// Best cost of the stage's initial population
    pub initial_cost: f64,
    /// Whether the stage improved on its starting point
    pub improved: bool,
    /// Seed the stage's optimizer used
    pub seed: u64,
}

/// Final placement for one configuration
#[derive(Debug, Clone)]
pub struct StitchResult {
    /// Configuration this placement belongs to, if one was resolved
    pub configuration: Option<Configuration>,
    /// Best transforms at the finest resolution
    pub transforms: TransformVector,
    /// Cost of `transforms` at the finest resolution
    pub cost: f64,
    /// One report per stage, coarsest first
    pub stages: Vec<StageReport>,
    /// Fragments of the finest stage with `transforms` applied
    pub fragments: QuadrantSet,
}

/// Position of the scheduler in its stage sequence
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SchedulerState {
    /// Next stage to run
    pub resolution_index: usize,
    /// Best placement so far; `None` before the first stage
    pub current_best: Option<TransformVector>,
}

/// Runs the optimizer over an ascending list of resolutions
#[derive(Debug)]
pub struct MultiResolutionScheduler {
    stages: Vec<StageConfig>,
    state: SchedulerState,
    reports: Vec<StageReport>,
    last: Option<(QuadrantSet, f64)>,
}

impl MultiResolutionScheduler {
    /// Create a scheduler over `stages`, coarsest first
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for an empty stage list or resolutions that are
    /// not positive and strictly ascending
    pub fn new(stages: Vec<StageConfig>) -> Result<Self> {
        if stages.is_empty() {
            return Err(invalid_parameter(
                "resolutions",
                &"[]",
                &"at least one resolution is required",
            ));
        }
        let mut previous = 0.0;
        for stage in &stages {
            if !stage.resolution.is_finite() || stage.resolution <= previous {
                return Err(invalid_parameter(
                    "resolutions",
                    &stage.resolution,
                    &"resolutions must be positive and strictly ascending",
                ));
            }
            previous = stage.resolution;
        }

        Ok(Self {
            stages,
            state: SchedulerState::default(),
            reports: Vec::new(),
            last: None,
        })
    }

    /// Current state
    pub const fn state(&self) -> &SchedulerState {
        &self.state
    }

    /// Stage configurations
    pub fn stages(&self) -> &[StageConfig] {
        &self.stages
    }

    /// Whether every stage has run
    pub fn is_finished(&self) -> bool {
        self.state.resolution_index >= self.stages.len()
    }

    /// Run the next stage
    ///
    /// `on_generation` receives the generation number and best cost so far.
    ///
    /// # Errors
    ///
    /// Returns an error if all stages already ran, the source fails, or the
    /// stage configuration is invalid
    pub fn advance<S, F>(&mut self, source: &mut S, mut on_generation: F) -> Result<&StageReport>
    where
        S: FragmentSource + ?Sized,
        F: FnMut(usize, f64),
    {
        let index = self.state.resolution_index;
        let stage = *self.stages.get(index).ok_or_else(|| {
            invalid_parameter(
                "resolution_index",
                &index,
                &"all resolution stages already completed",
            )
        })?;

        let mut fragments = source.quadrants(index, &stage)?;
        if fragments.resolution_index() != index {
            return Err(configuration_error(&format!(
                "source returned fragments for resolution {} while running stage {index}",
                fragments.resolution_index()
            )));
        }

        tracing::info!(
            stage = index + 1,
            of = self.stages.len(),
            resolution = stage.resolution,
            canvas = ?fragments.shape(),
            warm_start = self.state.current_best.is_some(),
            "optimizing stitch"
        );

        let genetic = GeneticConfig {
            seed: stage.genetic.seed.wrapping_add(index as u64),
            ..stage.genetic
        };
        let space = SearchSpace::new(
            stage.translation_range,
            stage.angle_range,
            self.state.current_best,
        )?;
        let outcome = {
            let evaluator = CostEvaluator::new(&fragments, stage.cost)?;
            let optimizer = GeneticOptimizer::new(&evaluator, genetic, space)?;
            optimizer.run_with(|generation, population| {
                on_generation(
                    generation,
                    population.best().map_or(f64::INFINITY, |c| c.cost),
                );
            })
        };

        if !outcome.improved() {
            tracing::warn!(
                stage = index + 1,
                cost = outcome.cost,
                "stage did not improve on its starting point"
            );
        }
        tracing::info!(stage = index + 1, cost = outcome.cost, "stage finished");

        fragments.set_transforms(&outcome.best);
        self.state = SchedulerState {
            resolution_index: index + 1,
            current_best: Some(outcome.best),
        };
        self.last = Some((fragments, outcome.cost));
        self.reports.push(StageReport {
            resolution_index: index,
            resolution: stage.resolution,
            cost: outcome.cost,
            initial_cost: outcome.initial_cost,
            improved: outcome.improved(),
            seed: outcome.seed,
        });
        self.reports
            .last()
            .ok_or_else(|| configuration_error(&"stage report missing"))
    }

    /// Run every remaining stage and return the final placement
    ///
    /// # Errors
    ///
    /// Propagates the first stage error
    pub fn run<S>(mut self, source: &mut S) -> Result<StitchResult>
    where
        S: FragmentSource + ?Sized,
    {
        while !self.is_finished() {
            self.advance(source, |_, _| {})?;
        }
        self.finish()
    }

    /// Turn a finished scheduler into its result
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if stages remain to be run
    pub fn finish(self) -> Result<StitchResult> {
        let remaining = self.stages.len().saturating_sub(self.state.resolution_index);
        match (self.last, self.state.current_best) {
            (Some((fragments, cost)), Some(transforms)) if remaining == 0 => Ok(StitchResult {
                configuration: None,
                transforms,
                cost,
                stages: self.reports,
                fragments,
            }),
            _ => Err(invalid_parameter(
                "resolution_index",
                &self.state.resolution_index,
                &format!("{remaining} stage(s) have not run yet"),
            )),
        }
    }
}

impl StitchResult {
    /// Attach the configuration this placement was optimized for
    #[must_use]
    pub fn with_configuration(mut self, configuration: Configuration) -> Self {
        self.configuration = Some(configuration);
        self
    }
}
