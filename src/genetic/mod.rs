//! Genetic-algorithm transform optimizer

/// Search bounds and genetic operators
pub mod operators;
/// Generational loop and run outcome
pub mod optimizer;
/// Candidates and populations
pub mod population;

pub use operators::{CrossoverPolicy, MutationPolicy, ParentSelection, SearchSpace};
pub use optimizer::{GeneticConfig, GeneticOptimizer, OptimizationOutcome};
pub use population::{Candidate, Population};
