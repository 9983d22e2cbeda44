//! Fragment model: quadrant labels, rigid transforms and positioned tissue fragments

/// Quadrant labels and seam layout
pub mod label;
/// Fragments and the per-resolution quadrant set
pub mod model;
/// Per-fragment and full-set rigid transforms
pub mod transform;

pub use label::{PositionLabel, Seam, SeamAxis};
pub use model::{Extent, Fragment, Positioned, QuadrantSet};
pub use transform::{Transform, TransformVector};
