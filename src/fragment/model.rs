//! In-memory tissue fragments and the four-fragment set of one resolution

use crate::fragment::label::PositionLabel;
use crate::fragment::transform::{Transform, TransformVector};
use crate::io::error::{Result, configuration_error};
use crate::math::interpolation::{InverseRigid, warp_channel, warp_mask};
use ndarray::{Array2, Array3, Axis};

/// Inclusive pixel bounds of a fragment's tissue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Extent {
    /// First occupied row
    pub min_row: usize,
    /// Last occupied row
    pub max_row: usize,
    /// First occupied column
    pub min_col: usize,
    /// Last occupied column
    pub max_col: usize,
}

impl Extent {
    /// Bounds of all `true` pixels, or `None` for an empty mask
    pub fn of_mask(mask: &Array2<bool>) -> Option<Self> {
        let mut extent: Option<Self> = None;
        for ((row, col), _) in mask.indexed_iter().filter(|(_, set)| **set) {
            extent = Some(match extent {
                None => Self {
                    min_row: row,
                    max_row: row,
                    min_col: col,
                    max_col: col,
                },
                Some(e) => Self {
                    min_row: e.min_row.min(row),
                    max_row: e.max_row.max(row),
                    min_col: e.min_col.min(col),
                    max_col: e.max_col.max(col),
                },
            });
        }
        extent
    }

    /// Smallest extent containing both
    pub fn union(self, other: Self) -> Self {
        Self {
            min_row: self.min_row.min(other.min_row),
            max_row: self.max_row.max(other.max_row),
            min_col: self.min_col.min(other.min_col),
            max_col: self.max_col.max(other.max_col),
        }
    }

    /// Center as (row, col)
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_row + self.max_row) as f64 / 2.0,
            (self.min_col + self.max_col) as f64 / 2.0,
        )
    }

    /// Height in pixels
    pub const fn height(&self) -> usize {
        self.max_row - self.min_row + 1
    }

    /// Width in pixels
    pub const fn width(&self) -> usize {
        self.max_col - self.min_col + 1
    }
}

/// Grayscale image and mask of a fragment after applying a transform
#[derive(Debug, Clone)]
pub struct Positioned {
    /// Grayscale intensities in [0, 1], zero outside tissue
    pub gray: Array2<f64>,
    /// Tissue mask
    pub mask: Array2<bool>,
}

/// One tissue fragment at one resolution, laid out on its padded canvas
///
/// The identity transform places the fragment at its quadrant's initial layout.
/// Image arrays never change after construction; only `transform` is updated.
#[derive(Debug, Clone)]
pub struct Fragment {
    /// Quadrant this fragment is assigned to
    pub label: PositionLabel,
    /// Original identity, usually the source file name
    pub identity: String,
    /// Resolution stage this fragment was prepared for
    pub resolution_index: usize,
    /// Current transform estimate
    pub transform: Transform,
    gray: Array2<f64>,
    color: Array3<u8>,
    mask: Array2<bool>,
    center: (f64, f64),
}

impl Fragment {
    /// Assemble a fragment from canvas-sized arrays
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the arrays disagree in shape, the color
    /// array does not have three channels, or the mask holds no tissue
    pub fn new(
        label: PositionLabel,
        identity: impl Into<String>,
        resolution_index: usize,
        gray: Array2<f64>,
        color: Array3<u8>,
        mask: Array2<bool>,
    ) -> Result<Self> {
        let identity = identity.into();
        let (rows, cols, channels) = color.dim();
        if gray.dim() != mask.dim() || (rows, cols) != mask.dim() || channels != 3 {
            return Err(configuration_error(&format!(
                "fragment '{identity}' ({label}) has mismatched arrays: gray {:?}, color {:?}, mask {:?}",
                gray.dim(),
                color.dim(),
                mask.dim()
            )));
        }
        let extent = Extent::of_mask(&mask).ok_or_else(|| {
            configuration_error(&format!("fragment '{identity}' ({label}) has an empty mask"))
        })?;

        Ok(Self {
            label,
            identity,
            resolution_index,
            transform: Transform::IDENTITY,
            gray,
            color,
            mask,
            center: extent.center(),
        })
    }

    /// Canvas shape as (rows, cols)
    pub fn shape(&self) -> (usize, usize) {
        self.mask.dim()
    }

    /// Untransformed grayscale canvas
    pub const fn gray(&self) -> &Array2<f64> {
        &self.gray
    }

    /// Untransformed color canvas (rows, cols, 3)
    pub const fn color(&self) -> &Array3<u8> {
        &self.color
    }

    /// Untransformed tissue mask
    pub const fn mask(&self) -> &Array2<bool> {
        &self.mask
    }

    /// Rotation center (row, col): the center of the untransformed tissue bounds
    pub const fn center(&self) -> (f64, f64) {
        self.center
    }

    fn inverse_mapping(&self, transform: Transform) -> InverseRigid {
        InverseRigid::new(
            self.center,
            transform.pixel_offset(self.shape()),
            transform.angle,
        )
    }

    /// Render grayscale and mask with `transform` applied
    ///
    /// Rotation happens about the fragment's own center, then translation.
    /// Content moved beyond the canvas is dropped; the padding around the initial
    /// layout keeps that from happening for transforms inside the search range.
    pub fn apply(&self, transform: Transform) -> Positioned {
        let mapping = self.inverse_mapping(transform);
        let mask = warp_mask(&self.mask.view(), &mapping);
        let mut gray = warp_channel(&self.gray.view(), &mapping);
        gray.zip_mut_with(&mask, |value, &inside| {
            if !inside {
                *value = 0.0;
            }
        });
        Positioned { gray, mask }
    }

    /// Render the color canvas with `transform` applied, as (rows, cols, 3)
    pub fn apply_color(&self, transform: Transform) -> Array3<u8> {
        let mapping = self.inverse_mapping(transform);
        let mask = warp_mask(&self.mask.view(), &mapping);
        let mut out = Array3::<u8>::zeros(self.color.dim());

        for (channel, mut plane) in out.axis_iter_mut(Axis(2)).enumerate() {
            let source = self.color.index_axis(Axis(2), channel).mapv(f64::from);
            let warped = warp_channel(&source.view(), &mapping);
            plane.zip_mut_with(&warped, |dst, &value| {
                *dst = value.round().clamp(0.0, 255.0) as u8;
            });
            plane.zip_mut_with(&mask, |dst, &inside| {
                if !inside {
                    *dst = 0;
                }
            });
        }
        out
    }

    /// Occupied region after applying `transform`, or `None` if nothing remains on the canvas
    pub fn bounding_extent(&self, transform: Transform) -> Option<Extent> {
        let mapping = self.inverse_mapping(transform);
        Extent::of_mask(&warp_mask(&self.mask.view(), &mapping))
    }
}

/// The four fragments of one resolution, one per quadrant
#[derive(Debug, Clone)]
pub struct QuadrantSet {
    fragments: [Fragment; 4],
}

impl QuadrantSet {
    /// Build a set from fragments in any order
    ///
    /// # Errors
    ///
    /// Returns a configuration error if a label is missing or assigned twice, or if
    /// the fragments do not share a canvas shape and resolution
    pub fn from_fragments(fragments: Vec<Fragment>) -> Result<Self> {
        if fragments.len() != 4 {
            return Err(configuration_error(&format!(
                "expected 4 fragments, got {}",
                fragments.len()
            )));
        }

        let mut slots: [Option<Fragment>; 4] = [None, None, None, None];
        for fragment in fragments {
            let label = fragment.label;
            let Some(slot) = slots.get_mut(label.index()) else {
                continue;
            };
            if let Some(existing) = slot {
                return Err(configuration_error(&format!(
                    "position {label} assigned to both '{}' and '{}'",
                    existing.identity, fragment.identity
                )));
            }
            *slot = Some(fragment);
        }

        let missing: Vec<String> = PositionLabel::ALL
            .iter()
            .zip(slots.iter())
            .filter(|(_, slot)| slot.is_none())
            .map(|(label, _)| label.to_string())
            .collect();
        let [Some(ul), Some(ur), Some(ll), Some(lr)] = slots else {
            return Err(configuration_error(&format!(
                "missing position label(s): {}",
                missing.join(", ")
            )));
        };

        let set = Self {
            fragments: [ul, ur, ll, lr],
        };
        let shape = set.shape();
        let resolution = set.resolution_index();
        if let Some(odd) = set
            .fragments
            .iter()
            .find(|f| f.shape() != shape || f.resolution_index != resolution)
        {
            return Err(configuration_error(&format!(
                "fragment '{}' ({}) has canvas {:?} at resolution {}, expected {shape:?} at {resolution}",
                odd.identity,
                odd.label,
                odd.shape(),
                odd.resolution_index
            )));
        }
        Ok(set)
    }

    /// Fragment at the given quadrant
    pub const fn get(&self, label: PositionLabel) -> &Fragment {
        match label {
            PositionLabel::UpperLeft => &self.fragments[0],
            PositionLabel::UpperRight => &self.fragments[1],
            PositionLabel::LowerLeft => &self.fragments[2],
            PositionLabel::LowerRight => &self.fragments[3],
        }
    }

    /// Iterate over fragments in canonical order
    pub fn iter(&self) -> impl Iterator<Item = &Fragment> {
        self.fragments.iter()
    }

    /// Shared canvas shape
    pub fn shape(&self) -> (usize, usize) {
        self.get(PositionLabel::UpperLeft).shape()
    }

    /// Shared resolution index
    pub const fn resolution_index(&self) -> usize {
        self.get(PositionLabel::UpperLeft).resolution_index
    }

    /// Current transforms of all fragments
    pub fn transforms(&self) -> TransformVector {
        let mut vector = TransformVector::IDENTITY;
        for fragment in &self.fragments {
            vector.set(fragment.label, fragment.transform);
        }
        vector
    }

    /// Store a transform vector into the fragments
    pub fn set_transforms(&mut self, transforms: &TransformVector) {
        for fragment in &mut self.fragments {
            fragment.transform = transforms.get(fragment.label);
        }
    }
}
