//! Mathematical utilities for rendering and sampling

/// Pixel sampling and rigid inverse mapping
pub mod interpolation;
/// Weighted and uniform sampling helpers
pub mod probability;
