//! Rigid transforms for single fragments and for the full quadrant set

use crate::fragment::label::PositionLabel;
use crate::io::error::{Result, invalid_parameter};

/// Number of genes per fragment (horizontal shift, vertical shift, angle)
pub const GENES_PER_FRAGMENT: usize = 3;

/// Number of genes in a full `TransformVector`
pub const GENE_COUNT: usize = GENES_PER_FRAGMENT * 4;

/// Rigid transform of one fragment
///
/// Translations are fractions of the canvas width/height, so the same values
/// describe the same placement at every resolution.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Transform {
    /// Horizontal translation as a fraction of canvas width
    pub tx: f64,
    /// Vertical translation as a fraction of canvas height
    pub ty: f64,
    /// Rotation in degrees, counter-clockwise on screen
    pub angle: f64,
}

impl Transform {
    /// The identity transform
    pub const IDENTITY: Self = Self {
        tx: 0.0,
        ty: 0.0,
        angle: 0.0,
    };

    /// Create a transform from its components
    pub const fn new(tx: f64, ty: f64, angle: f64) -> Self {
        Self { tx, ty, angle }
    }

    /// Whether all components are finite
    pub const fn is_finite(&self) -> bool {
        self.tx.is_finite() && self.ty.is_finite() && self.angle.is_finite()
    }

    /// Translation in pixels for a canvas of the given shape (rows, cols)
    pub fn pixel_offset(&self, shape: (usize, usize)) -> (f64, f64) {
        (self.ty * shape.0 as f64, self.tx * shape.1 as f64)
    }
}

/// Transforms for all four quadrants, in `PositionLabel::ALL` order
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TransformVector {
    transforms: [Transform; 4],
}

impl TransformVector {
    /// All four fragments at their initial layout
    pub const IDENTITY: Self = Self {
        transforms: [Transform::IDENTITY; 4],
    };

    /// Create from per-quadrant transforms in canonical order
    pub const fn new(transforms: [Transform; 4]) -> Self {
        Self { transforms }
    }

    /// Transform of the given quadrant
    pub const fn get(&self, label: PositionLabel) -> Transform {
        match label {
            PositionLabel::UpperLeft => self.transforms[0],
            PositionLabel::UpperRight => self.transforms[1],
            PositionLabel::LowerLeft => self.transforms[2],
            PositionLabel::LowerRight => self.transforms[3],
        }
    }

    /// Replace the transform of the given quadrant
    pub fn set(&mut self, label: PositionLabel, transform: Transform) {
        if let Some(slot) = self.transforms.get_mut(label.index()) {
            *slot = transform;
        }
    }

    /// Iterate over (label, transform) pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (PositionLabel, Transform)> + '_ {
        PositionLabel::ALL
            .iter()
            .zip(self.transforms.iter())
            .map(|(&label, &transform)| (label, transform))
    }

    /// Whether every component of every transform is finite
    pub fn is_finite(&self) -> bool {
        self.transforms.iter().all(Transform::is_finite)
    }

    /// Reject non-finite transforms before they enter the optimizer
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if any component is NaN or infinite
    pub fn validate(&self, parameter: &'static str) -> Result<()> {
        if self.is_finite() {
            Ok(())
        } else {
            Err(invalid_parameter(
                parameter,
                &format!("{self:?}"),
                &"transform components must be finite",
            ))
        }
    }

    /// Flatten into genes: `[tx, ty, angle]` per quadrant in canonical order
    pub fn to_genes(&self) -> [f64; GENE_COUNT] {
        let mut genes = [0.0; GENE_COUNT];
        for (chunk, transform) in genes
            .chunks_exact_mut(GENES_PER_FRAGMENT)
            .zip(self.transforms.iter())
        {
            if let [tx, ty, angle] = chunk {
                *tx = transform.tx;
                *ty = transform.ty;
                *angle = transform.angle;
            }
        }
        genes
    }

    /// Rebuild from genes produced by `to_genes`
    pub fn from_genes(genes: &[f64; GENE_COUNT]) -> Self {
        let mut transforms = [Transform::IDENTITY; 4];
        for (transform, chunk) in transforms
            .iter_mut()
            .zip(genes.chunks_exact(GENES_PER_FRAGMENT))
        {
            if let [tx, ty, angle] = chunk {
                *transform = Transform::new(*tx, *ty, *angle);
            }
        }
        Self { transforms }
    }

    /// Largest absolute per-gene difference in translation and in angle
    pub fn max_deviation(&self, other: &Self) -> (f64, f64) {
        self.transforms
            .iter()
            .zip(other.transforms.iter())
            .fold((0.0_f64, 0.0_f64), |(shift, angle), (a, b)| {
                (
                    shift.max((a.tx - b.tx).abs()).max((a.ty - b.ty).abs()),
                    angle.max((a.angle - b.angle).abs()),
                )
            })
    }
}
