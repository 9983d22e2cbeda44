//! Search bounds and the selection, crossover and mutation operators

use crate::fragment::transform::{GENE_COUNT, GENES_PER_FRAGMENT, TransformVector};
use crate::genetic::population::{Candidate, Genes, Population};
use crate::io::error::{Result, invalid_parameter};
use crate::math::probability::{rank_weights, uniform_around, weighted_choice};
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// Number of contestants drawn per tournament
pub const TOURNAMENT_SIZE: usize = 3;

/// Per-gene search bounds, symmetric around a center
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchSpace {
    center: Genes,
    half_width: Genes,
    warm_start: Option<TransformVector>,
}

impl SearchSpace {
    /// Bounds of `center ± range` for every quadrant
    ///
    /// The center is the warm start when given, otherwise the initial layout.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for negative or non-finite ranges and for a
    /// warm start with non-finite components
    pub fn new(
        translation_range: f64,
        angle_range: f64,
        warm_start: Option<TransformVector>,
    ) -> Result<Self> {
        for (name, range) in [
            ("translation_range", translation_range),
            ("angle_range", angle_range),
        ] {
            if !range.is_finite() || range < 0.0 {
                return Err(invalid_parameter(
                    name,
                    &range,
                    &"must be finite and non-negative",
                ));
            }
        }
        if let Some(seed) = &warm_start {
            seed.validate("warm_start")?;
        }

        let center = warm_start.unwrap_or(TransformVector::IDENTITY).to_genes();
        let mut half_width = [0.0; GENE_COUNT];
        for (i, width) in half_width.iter_mut().enumerate() {
            *width = if i % GENES_PER_FRAGMENT == 2 {
                angle_range
            } else {
                translation_range
            };
        }

        Ok(Self {
            center,
            half_width,
            warm_start,
        })
    }

    /// Center of the bounds
    pub const fn center(&self) -> &Genes {
        &self.center
    }

    /// Half width of the bounds per gene
    pub const fn half_width(&self) -> &Genes {
        &self.half_width
    }

    /// Warm-start seed, if any
    pub const fn warm_start(&self) -> Option<TransformVector> {
        self.warm_start
    }

    /// Uniform random genes within the bounds
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Genes {
        let mut genes = [0.0; GENE_COUNT];
        for ((gene, &center), &width) in genes
            .iter_mut()
            .zip(self.center.iter())
            .zip(self.half_width.iter())
        {
            *gene = uniform_around(rng, center, width);
        }
        genes
    }

    /// Pull every gene back inside the bounds
    pub fn clamp(&self, genes: &mut Genes) {
        for ((gene, &center), &width) in genes
            .iter_mut()
            .zip(self.center.iter())
            .zip(self.half_width.iter())
        {
            *gene = if gene.is_finite() {
                gene.clamp(center - width, center + width)
            } else {
                center
            };
        }
    }

    /// Whether every gene lies inside the bounds
    pub fn contains(&self, genes: &Genes) -> bool {
        genes
            .iter()
            .zip(self.center.iter())
            .zip(self.half_width.iter())
            .all(|((&gene, &center), &width)| (gene - center).abs() <= width + 1e-12)
    }
}

macro_rules! policy_names {
    ($ty:ident { $($variant:ident => $name:literal),+ $(,)? }) => {
        impl $ty {
            /// Name used in parameter files and on the command line
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $name,)+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_ascii_lowercase().as_str() {
                    $($name => Ok(Self::$variant),)+
                    other => Err(format!("unknown {} '{other}'", stringify!($ty))),
                }
            }
        }
    };
}

/// How parents are drawn from a population
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParentSelection {
    /// Probability proportional to fitness rank
    #[default]
    Rank,
    /// The best candidates, in order
    SteadyState,
    /// Best of `TOURNAMENT_SIZE` random contestants
    Tournament,
    /// Uniformly at random
    Random,
}

policy_names!(ParentSelection {
    Rank => "rank",
    SteadyState => "sss",
    Tournament => "tournament",
    Random => "random",
});

/// How two parents combine into a child
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossoverPolicy {
    /// Every gene from a coin-flipped parent
    #[default]
    Scattered,
    /// Genes before a random cut from the first parent, after it from the second
    SinglePoint,
    /// Genes between two random cuts from the second parent
    TwoPoints,
}

policy_names!(CrossoverPolicy {
    Scattered => "scattered",
    SinglePoint => "single_point",
    TwoPoints => "two_points",
});

/// How a child's genes are perturbed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MutationPolicy {
    /// Add a uniform offset within the gene's range
    #[default]
    Random,
    /// Replace the gene with a fresh uniform sample within the bounds
    Reset,
}

policy_names!(MutationPolicy {
    Random => "random",
    Reset => "reset",
});

/// Draw `count` parents from the viable members of `population`
///
/// Candidates with non-finite cost never become parents unless nothing else is left.
pub fn select_parents<R: Rng + ?Sized>(
    population: &Population,
    count: usize,
    policy: ParentSelection,
    rng: &mut R,
) -> Vec<Genes> {
    let viable = population.viable();
    let pool: Vec<&Candidate> = if viable.is_empty() {
        population.members().iter().collect()
    } else {
        viable
    };
    if pool.is_empty() {
        return Vec::new();
    }

    let pick = |index: usize| pool.get(index).map(|c| c.genes);
    let mut parents = Vec::with_capacity(count);

    match policy {
        ParentSelection::SteadyState => {
            parents.extend((0..count).filter_map(|i| pick(i % pool.len())));
        }
        ParentSelection::Rank => {
            let weights = rank_weights(pool.len());
            for _ in 0..count {
                parents.extend(pick(weighted_choice(&weights, rng)));
            }
        }
        ParentSelection::Tournament => {
            for _ in 0..count {
                // Pool is sorted best first, so the lowest index wins
                let winner = (0..TOURNAMENT_SIZE)
                    .map(|_| rng.random_range(0..pool.len()))
                    .min()
                    .unwrap_or(0);
                parents.extend(pick(winner));
            }
        }
        ParentSelection::Random => {
            for _ in 0..count {
                parents.extend(pick(rng.random_range(0..pool.len())));
            }
        }
    }
    parents
}

/// Combine two parents into one child
pub fn crossover<R: Rng + ?Sized>(
    first: &Genes,
    second: &Genes,
    policy: CrossoverPolicy,
    rng: &mut R,
) -> Genes {
    let mut child = *first;
    match policy {
        CrossoverPolicy::Scattered => {
            for (gene, &other) in child.iter_mut().zip(second.iter()) {
                if rng.random_bool(0.5) {
                    *gene = other;
                }
            }
        }
        CrossoverPolicy::SinglePoint => {
            let cut = rng.random_range(1..GENE_COUNT);
            for (gene, &other) in child.iter_mut().zip(second.iter()).skip(cut) {
                *gene = other;
            }
        }
        CrossoverPolicy::TwoPoints => {
            let a = rng.random_range(0..GENE_COUNT);
            let b = rng.random_range(0..GENE_COUNT);
            let (start, end) = (a.min(b), a.max(b) + 1);
            for (gene, &other) in child
                .iter_mut()
                .zip(second.iter())
                .take(end)
                .skip(start)
            {
                *gene = other;
            }
        }
    }
    child
}

/// Perturb each gene with `probability`, then clamp to the bounds
pub fn mutate<R: Rng + ?Sized>(
    genes: &mut Genes,
    space: &SearchSpace,
    policy: MutationPolicy,
    probability: f64,
    rng: &mut R,
) {
    let probability = probability.clamp(0.0, 1.0);
    for ((gene, &center), &width) in genes
        .iter_mut()
        .zip(space.center().iter())
        .zip(space.half_width().iter())
    {
        if !rng.random_bool(probability) {
            continue;
        }
        *gene = match policy {
            MutationPolicy::Random => uniform_around(rng, *gene, width),
            MutationPolicy::Reset => uniform_around(rng, center, width),
        };
    }
    space.clamp(genes);
}
