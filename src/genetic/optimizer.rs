//! Generational loop of the genetic transform optimizer
//!
//! A run is a fold of `step` over `generation_count` generations. `step` takes the
//! previous population by value and returns the next one, so the only state
//! threaded through the loop is the population and the seeded RNG.

use crate::cost::CostFunction;
use crate::fragment::TransformVector;
use crate::genetic::operators::{
    CrossoverPolicy, MutationPolicy, ParentSelection, SearchSpace, crossover, mutate,
    select_parents,
};
use crate::genetic::population::{Candidate, Genes, Population};
use crate::io::error::{Result, invalid_parameter};
use rand::{Rng, SeedableRng, rngs::StdRng};
use rayon::prelude::*;

/// Genetic-algorithm tuning for one run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeneticConfig {
    /// Candidates kept per generation
    pub population_size: usize,
    /// Number of generations to run
    pub generation_count: usize,
    /// Parents drawn per generation
    pub parent_count: usize,
    /// Offspring produced per generation
    pub mating_pool_size: usize,
    /// Chance that a child is a crossover rather than a copy of its first parent
    pub crossover_probability: f64,
    /// Crossover operator
    pub crossover_policy: CrossoverPolicy,
    /// Per-gene mutation chance
    pub mutation_probability: f64,
    /// Mutation operator
    pub mutation_policy: MutationPolicy,
    /// Parent selection operator
    pub parent_selection: ParentSelection,
    /// RNG seed; recorded in the outcome
    pub seed: u64,
}

impl GeneticConfig {
    /// Check sizes and probabilities
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when a size is zero, parents exceed the
    /// population, or a probability falls outside [0, 1]
    pub fn validate(&self) -> Result<()> {
        if self.population_size < 2 {
            return Err(invalid_parameter(
                "n_solutions",
                &self.population_size,
                &"population needs at least 2 candidates",
            ));
        }
        if self.parent_count == 0 || self.parent_count > self.population_size {
            return Err(invalid_parameter(
                "n_parents",
                &self.parent_count,
                &format!("must be between 1 and n_solutions ({})", self.population_size),
            ));
        }
        if self.mating_pool_size == 0 {
            return Err(invalid_parameter(
                "n_mating",
                &self.mating_pool_size,
                &"must be positive",
            ));
        }
        for (name, p) in [
            ("p_crossover", self.crossover_probability),
            ("p_mutation", self.mutation_probability),
        ] {
            if !(0.0..=1.0).contains(&p) {
                return Err(invalid_parameter(name, &p, &"must lie in [0, 1]"));
            }
        }
        Ok(())
    }
}

/// Result of one optimizer run
#[derive(Debug, Clone, PartialEq)]
pub struct OptimizationOutcome {
    /// Best placement found
    pub best: TransformVector,
    /// Cost of `best`
    pub cost: f64,
    /// Best cost of the initial population
    pub initial_cost: f64,
    /// Best cost after each generation
    pub history: Vec<f64>,
    /// Seed the run used
    pub seed: u64,
}

impl OptimizationOutcome {
    /// Whether the run materially improved on its initial population
    ///
    /// `false` signals a low-confidence result: the generation budget was spent
    /// without beating the starting point (typically the warm start).
    pub fn improved(&self) -> bool {
        let tolerance = 1e-9 * self.initial_cost.abs().max(1.0);
        self.cost < self.initial_cost - tolerance
    }

    /// Cost reduction relative to the initial population's best
    pub fn improvement(&self) -> f64 {
        if self.initial_cost.is_finite() {
            self.initial_cost - self.cost
        } else {
            0.0
        }
    }
}

/// Population-based search for the lowest-cost `TransformVector`
pub struct GeneticOptimizer<'a, C: CostFunction> {
    cost: &'a C,
    config: GeneticConfig,
    space: SearchSpace,
}

impl<'a, C: CostFunction> GeneticOptimizer<'a, C> {
    /// Create an optimizer over `space` scored by `cost`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the configuration is invalid
    pub fn new(cost: &'a C, config: GeneticConfig, space: SearchSpace) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            cost,
            config,
            space,
        })
    }

    /// Configuration in use
    pub const fn config(&self) -> &GeneticConfig {
        &self.config
    }

    /// Search bounds in use
    pub const fn space(&self) -> &SearchSpace {
        &self.space
    }

    fn evaluate(&self, genes: Vec<Genes>) -> Vec<Candidate> {
        genes
            .into_par_iter()
            .map(|g| Candidate::new(g, self.cost.cost(&TransformVector::from_genes(&g))))
            .collect()
    }

    /// Sample and score the first generation
    ///
    /// A warm start, when present, is kept as the first member.
    pub fn initial_population(&self, rng: &mut StdRng) -> Population {
        let mut genes = Vec::with_capacity(self.config.population_size);
        if let Some(seed) = self.space.warm_start() {
            genes.push(seed.to_genes());
        }
        while genes.len() < self.config.population_size {
            genes.push(self.space.sample(rng));
        }
        Population::from_candidates(self.evaluate(genes))
    }

    /// Produce the next generation
    ///
    /// Parents are drawn, paired `(k, k + 1)` cyclically, crossed over and mutated;
    /// the offspring then displace the weakest members.
    pub fn step(&self, population: Population, rng: &mut StdRng) -> Population {
        let parents = select_parents(
            &population,
            self.config.parent_count,
            self.config.parent_selection,
            rng,
        );
        if parents.is_empty() {
            return population;
        }

        let mut offspring = Vec::with_capacity(self.config.mating_pool_size);
        for k in 0..self.config.mating_pool_size {
            let (Some(first), Some(second)) = (
                parents.get(k % parents.len()),
                parents.get((k + 1) % parents.len()),
            ) else {
                continue;
            };
            let mut child = if rng.random_bool(self.config.crossover_probability) {
                crossover(first, second, self.config.crossover_policy, rng)
            } else {
                *first
            };
            mutate(
                &mut child,
                &self.space,
                self.config.mutation_policy,
                self.config.mutation_probability,
                rng,
            );
            offspring.push(child);
        }

        let scored = self.evaluate(offspring);
        population.replace_weakest(scored, self.config.population_size)
    }

    /// Run the full generation budget
    pub fn run(&self) -> OptimizationOutcome {
        self.run_with(|_, _| {})
    }

    /// Run the full generation budget, reporting each generation to `on_generation`
    ///
    /// The callback receives the 1-based generation number and the new population.
    pub fn run_with<F>(&self, mut on_generation: F) -> OptimizationOutcome
    where
        F: FnMut(usize, &Population),
    {
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        let mut population = self.initial_population(&mut rng);
        let initial_cost = population.best().map_or(f64::INFINITY, |c| c.cost);
        let mut history = Vec::with_capacity(self.config.generation_count);

        for generation in 1..=self.config.generation_count {
            population = self.step(population, &mut rng);
            let best_cost = population.best().map_or(f64::INFINITY, |c| c.cost);
            history.push(best_cost);
            tracing::debug!(generation, best_cost, "generation complete");
            on_generation(generation, &population);
        }

        let (best, cost) = population.best().map_or_else(
            || {
                (
                    self.space.warm_start().unwrap_or(TransformVector::IDENTITY),
                    f64::INFINITY,
                )
            },
            |c| (c.transforms(), c.cost),
        );

        OptimizationOutcome {
            best,
            cost,
            initial_cost,
            history,
            seed: self.config.seed,
        }
    }
}
