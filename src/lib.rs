//! Reassembly of a histological section from four tissue fragments
//!
//! Each fragment is assigned to a quadrant and placed by a rigid transform. The
//! transforms are found by a genetic algorithm that minimises a seam-alignment
//! cost, refined from coarse to fine resolution.

#![forbid(unsafe_code)]

/// Candidate fragment-to-quadrant assignments and top-K selection
pub mod configuration;
/// Seam-alignment cost function
pub mod cost;
/// Fragments, position labels and rigid transforms
pub mod fragment;
/// Genetic transform optimizer
pub mod genetic;
/// Input/output operations and error handling
pub mod io;
/// Mathematical utilities for resampling and random sampling
pub mod math;
/// Coarse-to-fine scheduling of the optimizer
pub mod schedule;

pub use io::error::{Result, StitchError};
