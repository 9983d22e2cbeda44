//! Candidate configurations from the upstream discrete search

/// Parsed candidate lines
pub mod candidate;
/// Candidate file reading and top-K selection
pub mod resolver;

pub use candidate::{Assignment, Configuration};
pub use resolver::{ConfigurationResolver, select_top_k};
