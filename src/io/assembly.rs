//! Fusion of the positioned fragments into one image

use crate::fragment::{Extent, QuadrantSet, TransformVector};
use crate::io::error::{Result, computation_error};
use crate::io::image::{array_to_rgb, save_png};
use image::RgbImage;
use ndarray::{Array2, Array3, Axis, Slice};
use std::path::Path;

/// Render every fragment with its transform and average where they overlap
///
/// The result is cropped to the union of the tissue extents.
///
/// # Errors
///
/// Returns `Computation` if no tissue remains on the canvas
pub fn fuse(fragments: &QuadrantSet, transforms: &TransformVector) -> Result<Array3<u8>> {
    let (rows, cols) = fragments.shape();
    let mut sums = Array3::<u32>::zeros((rows, cols, 3));
    let mut counts = Array2::<u32>::zeros((rows, cols));
    let mut extent: Option<Extent> = None;

    for fragment in fragments.iter() {
        let transform = transforms.get(fragment.label);
        let mask = fragment.apply(transform).mask;
        let color = fragment.apply_color(transform);

        if let Some(e) = Extent::of_mask(&mask) {
            extent = Some(extent.map_or(e, |acc| acc.union(e)));
        }
        counts.zip_mut_with(&mask, |count, &inside| {
            if inside {
                *count += 1;
            }
        });
        for ((row, col, channel), value) in color.indexed_iter() {
            let inside = mask.get((row, col)).copied().unwrap_or(false);
            if let (true, Some(sum)) = (inside, sums.get_mut((row, col, channel))) {
                *sum += u32::from(*value);
            }
        }
    }

    let extent = extent.ok_or_else(|| {
        computation_error("fuse", &"no tissue remains on the canvas after transforming")
    })?;

    let mut fused = Array3::<u8>::zeros((rows, cols, 3));
    for ((row, col, channel), value) in fused.indexed_iter_mut() {
        let count = counts.get((row, col)).copied().unwrap_or(0);
        if count > 0 {
            let sum = sums.get((row, col, channel)).copied().unwrap_or(0);
            *value = ((f64::from(sum) / f64::from(count)).round()).min(255.0) as u8;
        }
    }

    tracing::debug!(
        rows = extent.height(),
        cols = extent.width(),
        "cropping fused canvas to tissue"
    );
    Ok(fused
        .slice_axis(Axis(0), Slice::from(extent.min_row..=extent.max_row))
        .slice_axis(Axis(1), Slice::from(extent.min_col..=extent.max_col))
        .to_owned())
}

/// Fuse the fragments and return the result as an image
///
/// # Errors
///
/// Propagates the error of [`fuse`]
pub fn fuse_image(fragments: &QuadrantSet, transforms: &TransformVector) -> Result<RgbImage> {
    fuse(fragments, transforms).map(|fused| array_to_rgb(&fused))
}

/// Fuse the fragments and write the result as PNG
///
/// # Errors
///
/// Returns `Computation` if nothing is left to fuse and `ImageExport` or
/// `FileSystem` if writing fails
pub fn export_fused(
    fragments: &QuadrantSet,
    transforms: &TransformVector,
    path: &Path,
) -> Result<()> {
    let img = fuse_image(fragments, transforms)?;
    save_png(&img, path)?;
    tracing::info!(path = %path.display(), width = img.width(), height = img.height(), "exported stitched image");
    Ok(())
}
