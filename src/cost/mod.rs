//! Seam-alignment cost function
//!
//! Combines intensity-histogram similarity across each seam, edge gaps,
//! outer end-point distances and an overlap penalty into one scalar.

/// Full-placement cost evaluation
pub mod evaluator;
/// Intensity histograms
pub mod histogram;
/// Per-seam geometric measurements
pub mod seam;

pub use evaluator::{CostBreakdown, CostConfig, CostEvaluator, CostFunction};
