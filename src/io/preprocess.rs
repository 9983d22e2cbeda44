//! Resizing, masking and canvas layout of raw fragments
//!
//! Every resolution stage builds its fragments from the raw images again; only
//! transforms are carried between stages.

use crate::fragment::{Fragment, PositionLabel, QuadrantSet};
use crate::io::configuration::MAX_CANVAS_DIMENSION;
use crate::io::error::{Result, configuration_error, invalid_parameter};
use crate::io::image::{load_gray, load_rgb, mask_to_array};
use crate::schedule::{FragmentSource, StageConfig};
use image::imageops::{self, FilterType};
use image::{GrayImage, RgbImage};
use ndarray::{Array2, Array3};
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// A full-resolution fragment image with its tissue mask
#[derive(Debug, Clone)]
pub struct RawFragment {
    /// Quadrant the fragment is assigned to
    pub label: PositionLabel,
    /// Original identity, usually the file name
    pub identity: String,
    /// Color image
    pub image: RgbImage,
    /// Tissue mask, same size as `image`
    pub mask: GrayImage,
}

impl RawFragment {
    /// Pair an image with its mask, resizing the mask if the sizes differ
    pub fn new(
        label: PositionLabel,
        identity: impl Into<String>,
        image: RgbImage,
        mask: GrayImage,
    ) -> Self {
        let mask = if mask.dimensions() == image.dimensions() {
            mask
        } else {
            imageops::resize(&mask, image.width(), image.height(), FilterType::Nearest)
        };
        Self {
            label,
            identity: identity.into(),
            image,
            mask,
        }
    }

    /// Load an image and its mask from disk
    ///
    /// # Errors
    ///
    /// Returns `ImageLoad` if either file cannot be read
    pub fn load(label: PositionLabel, image_path: &Path, mask_path: &Path) -> Result<Self> {
        let identity = image_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .into_owned();
        Ok(Self::new(
            label,
            identity,
            load_rgb(image_path)?,
            load_gray(mask_path)?,
        ))
    }

    /// Scaled size (width, height) at `resolution`, at least one pixel per side
    pub fn scaled_dimensions(&self, resolution: f64) -> (u32, u32) {
        let scale = |side: u32| ((f64::from(side) * resolution).round() as u32).max(1);
        (scale(self.image.width()), scale(self.image.height()))
    }
}

/// Hash of a raw fragment's pixels and the layout settings of one stage
///
/// Used as the fragment cache key, so any change to the input or its
/// preprocessing yields a different key.
pub fn content_hash(raw: &RawFragment, resolution: f64, pad_fraction: f64) -> u64 {
    let mut hasher = DefaultHasher::new();
    raw.identity.hash(&mut hasher);
    raw.label.hash(&mut hasher);
    raw.image.dimensions().hash(&mut hasher);
    raw.image.as_raw().hash(&mut hasher);
    raw.mask.as_raw().hash(&mut hasher);
    resolution.to_bits().hash(&mut hasher);
    pad_fraction.to_bits().hash(&mut hasher);
    hasher.finish()
}

/// Shape of the shared canvas and the point all inner corners touch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanvasLayout {
    /// Canvas (rows, cols)
    pub shape: (usize, usize),
    /// Canvas center (row, col)
    pub center: (usize, usize),
}

impl CanvasLayout {
    /// Layout for fragments no larger than `max_rows` × `max_cols`
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the padded canvas exceeds the size limit
    pub fn new(max_rows: usize, max_cols: usize, pad_fraction: f64) -> Result<Self> {
        let pad = (pad_fraction * max_rows.max(max_cols) as f64).round() as usize;
        let shape = (2 * max_rows + 2 * pad, 2 * max_cols + 2 * pad);
        if shape.0.max(shape.1) > MAX_CANVAS_DIMENSION {
            return Err(invalid_parameter(
                "resolutions",
                &format!("{}x{}", shape.0, shape.1),
                &format!("canvas exceeds {MAX_CANVAS_DIMENSION} pixels per side"),
            ));
        }
        Ok(Self {
            shape,
            center: (max_rows + pad, max_cols + pad),
        })
    }

    /// Top-left canvas position of a `rows` × `cols` fragment placed at `label`
    pub const fn origin(&self, label: PositionLabel, rows: usize, cols: usize) -> (usize, usize) {
        let row = if label.is_upper() {
            self.center.0 - rows
        } else {
            self.center.0
        };
        let col = if label.is_left() {
            self.center.1 - cols
        } else {
            self.center.1
        };
        (row, col)
    }
}

/// Resize, mask and lay out four raw fragments for one stage
///
/// # Errors
///
/// Returns a configuration error if the fragments do not form a valid set or a
/// mask is empty at this resolution, and `InvalidParameter` for an oversize canvas
pub fn prepare_quadrants(
    raws: &[RawFragment],
    resolution: f64,
    resolution_index: usize,
    pad_fraction: f64,
) -> Result<QuadrantSet> {
    if !resolution.is_finite() || resolution <= 0.0 {
        return Err(invalid_parameter(
            "resolutions",
            &resolution,
            &"must be positive",
        ));
    }

    let scaled: Vec<(&RawFragment, RgbImage, GrayImage)> = raws
        .iter()
        .map(|raw| {
            let (width, height) = raw.scaled_dimensions(resolution);
            (
                raw,
                imageops::resize(&raw.image, width, height, FilterType::Triangle),
                imageops::resize(&raw.mask, width, height, FilterType::Nearest),
            )
        })
        .collect();

    let max_rows = scaled
        .iter()
        .map(|(_, img, _)| img.height() as usize)
        .max()
        .ok_or_else(|| configuration_error(&"no fragments to prepare"))?;
    let max_cols = scaled
        .iter()
        .map(|(_, img, _)| img.width() as usize)
        .max()
        .unwrap_or(max_rows);
    let layout = CanvasLayout::new(max_rows, max_cols, pad_fraction)?;

    let fragments = scaled
        .into_iter()
        .map(|(raw, image, mask)| {
            place_fragment(raw, &image, &mask, &layout, resolution_index)
        })
        .collect::<Result<Vec<_>>>()?;

    tracing::debug!(
        resolution,
        canvas = ?layout.shape,
        "prepared quadrant canvas"
    );
    QuadrantSet::from_fragments(fragments)
}

fn place_fragment(
    raw: &RawFragment,
    image: &RgbImage,
    mask: &GrayImage,
    layout: &CanvasLayout,
    resolution_index: usize,
) -> Result<Fragment> {
    let rows = image.height() as usize;
    let cols = image.width() as usize;
    let (origin_row, origin_col) = layout.origin(raw.label, rows, cols);

    let tissue = mask_to_array(mask);
    let luma = imageops::grayscale(image);

    let mut gray = Array2::<f64>::zeros(layout.shape);
    let mut color = Array3::<u8>::zeros((layout.shape.0, layout.shape.1, 3));
    let mut canvas_mask = Array2::<bool>::from_elem(layout.shape, false);

    for ((row, col), _) in tissue.indexed_iter().filter(|(_, set)| **set) {
        let target = (origin_row + row, origin_col + col);
        let pixel = image.get_pixel(col as u32, row as u32);
        if let Some(m) = canvas_mask.get_mut(target) {
            *m = true;
        }
        if let Some(g) = gray.get_mut(target) {
            *g = f64::from(luma.get_pixel(col as u32, row as u32).0[0]) / f64::from(u8::MAX);
        }
        for (channel, value) in pixel.0.iter().enumerate() {
            if let Some(c) = color.get_mut((target.0, target.1, channel)) {
                *c = *value;
            }
        }
    }

    Fragment::new(
        raw.label,
        raw.identity.clone(),
        resolution_index,
        gray,
        color,
        canvas_mask,
    )
}

/// Raw fragments that prepare a fresh quadrant set for every stage
#[derive(Debug, Clone)]
pub struct RawQuadrants {
    raws: Vec<RawFragment>,
    pad_fraction: f64,
}

impl RawQuadrants {
    /// Wrap four raw fragments
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless exactly one fragment per quadrant is given
    pub fn new(raws: Vec<RawFragment>, pad_fraction: f64) -> Result<Self> {
        for label in PositionLabel::ALL {
            let count = raws.iter().filter(|r| r.label == label).count();
            if count != 1 {
                return Err(configuration_error(&format!(
                    "expected one fragment at {label}, found {count}"
                )));
            }
        }
        if raws.len() != PositionLabel::ALL.len() {
            return Err(configuration_error(&format!(
                "expected 4 fragments, got {}",
                raws.len()
            )));
        }
        Ok(Self { raws, pad_fraction })
    }

    /// Raw fragments in input order
    pub fn raws(&self) -> &[RawFragment] {
        &self.raws
    }

    /// Canvas padding fraction
    pub const fn pad_fraction(&self) -> f64 {
        self.pad_fraction
    }
}

impl FragmentSource for RawQuadrants {
    fn quadrants(&mut self, resolution_index: usize, stage: &StageConfig) -> Result<QuadrantSet> {
        prepare_quadrants(
            &self.raws,
            stage.resolution,
            resolution_index,
            self.pad_fraction,
        )
    }
}
