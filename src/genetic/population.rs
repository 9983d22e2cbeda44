//! Candidates and cost-ordered populations

use crate::fragment::transform::{GENE_COUNT, TransformVector};
use std::cmp::Ordering;

/// Gene layout of one candidate: `[tx, ty, angle]` per quadrant
pub type Genes = [f64; GENE_COUNT];

/// One trial placement and its cost
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Candidate {
    /// Flattened transform parameters
    pub genes: Genes,
    /// Evaluated cost; non-finite evaluations are stored as `f64::INFINITY`
    pub cost: f64,
}

impl Candidate {
    /// Wrap genes and their evaluated cost
    ///
    /// A NaN or infinite cost marks the candidate as maximally unfit.
    pub const fn new(genes: Genes, cost: f64) -> Self {
        let cost = if cost.is_finite() { cost } else { f64::INFINITY };
        Self { genes, cost }
    }

    /// Whether the candidate may become a parent
    pub const fn is_viable(&self) -> bool {
        self.cost.is_finite()
    }

    /// Decode the genes into per-quadrant transforms
    pub fn transforms(&self) -> TransformVector {
        TransformVector::from_genes(&self.genes)
    }

    fn by_cost(a: &Self, b: &Self) -> Ordering {
        a.cost.total_cmp(&b.cost)
    }
}

/// Candidates of one generation, sorted from lowest to highest cost
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Population {
    members: Vec<Candidate>,
}

impl Population {
    /// Sort candidates into a population
    pub fn from_candidates(mut members: Vec<Candidate>) -> Self {
        members.sort_by(Candidate::by_cost);
        Self { members }
    }

    /// Lowest-cost candidate
    pub fn best(&self) -> Option<&Candidate> {
        self.members.first()
    }

    /// All candidates, best first
    pub fn members(&self) -> &[Candidate] {
        &self.members
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the population holds no candidate
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Candidates with finite cost, best first
    pub fn viable(&self) -> Vec<&Candidate> {
        self.members.iter().filter(|c| c.is_viable()).collect()
    }

    /// Merge offspring in and keep the `size` best
    ///
    /// The current best always survives because offspring only displace
    /// strictly worse members.
    pub fn replace_weakest(self, offspring: Vec<Candidate>, size: usize) -> Self {
        let mut members = self.members;
        members.extend(offspring);
        members.sort_by(Candidate::by_cost);
        members.truncate(size);
        Self { members }
    }
}
