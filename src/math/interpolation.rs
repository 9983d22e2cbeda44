//! Pixel sampling and rigid inverse mapping
//!
//! Rendering a transformed fragment walks the output canvas and maps each pixel
//! back into the source canvas, so only the inverse mapping is needed here.

use ndarray::{Array2, ArrayView2};
use num_traits::Float;

/// Inverse of a rotation about `center` followed by a translation
///
/// Maps an output pixel back to the source position it was rendered from.
#[derive(Debug, Clone, Copy)]
pub struct InverseRigid {
    center: (f64, f64),
    shift: (f64, f64),
    cos: f64,
    sin: f64,
}

impl InverseRigid {
    /// Build from a rotation center (row, col), pixel shift (rows, cols) and angle in degrees
    ///
    /// Positive angles rotate counter-clockwise as seen on screen, where rows grow downwards.
    pub fn new(center: (f64, f64), shift: (f64, f64), angle_degrees: f64) -> Self {
        let radians = angle_degrees.to_radians();
        Self {
            center,
            shift,
            cos: radians.cos(),
            sin: radians.sin(),
        }
    }

    /// Source (row, col) for an output (row, col)
    pub fn source_of(&self, row: f64, col: f64) -> (f64, f64) {
        let dy = row - self.shift.0 - self.center.0;
        let dx = col - self.shift.1 - self.center.1;
        // Forward rotation is x' = cx + c*dx + s*dy, y' = cy - s*dx + c*dy
        let src_x = self.cos.mul_add(dx, -self.sin * dy);
        let src_y = self.sin.mul_add(dx, self.cos * dy);
        (src_y + self.center.0, src_x + self.center.1)
    }
}

/// Bilinear sample of a 2D array; positions outside the array read as zero
pub fn bilinear<T: Float>(data: &ArrayView2<'_, T>, row: f64, col: f64) -> T {
    let (rows, cols) = data.dim();
    if !(row > -1.0 && col > -1.0 && row < rows as f64 && col < cols as f64) {
        return T::zero();
    }

    let r0 = row.floor();
    let c0 = col.floor();
    let fr = row - r0;
    let fc = col - c0;

    let fetch = |r: f64, c: f64| -> f64 {
        if r < 0.0 || c < 0.0 {
            return 0.0;
        }
        data.get((r as usize, c as usize))
            .and_then(|v| v.to_f64())
            .unwrap_or(0.0)
    };

    let top = fetch(r0, c0).mul_add(1.0 - fc, fetch(r0, c0 + 1.0) * fc);
    let bottom = fetch(r0 + 1.0, c0).mul_add(1.0 - fc, fetch(r0 + 1.0, c0 + 1.0) * fc);
    T::from(top.mul_add(1.0 - fr, bottom * fr)).unwrap_or_else(T::zero)
}

/// Nearest-neighbour sample of a boolean array; outside positions are `false`
pub fn nearest_mask(mask: &ArrayView2<'_, bool>, row: f64, col: f64) -> bool {
    let r = row.round();
    let c = col.round();
    if r < 0.0 || c < 0.0 {
        return false;
    }
    mask.get((r as usize, c as usize)).copied().unwrap_or(false)
}

/// Render a float channel through an inverse mapping onto a canvas of the same shape
pub fn warp_channel<T: Float>(source: &ArrayView2<'_, T>, mapping: &InverseRigid) -> Array2<T> {
    Array2::from_shape_fn(source.dim(), |(r, c)| {
        let (sr, sc) = mapping.source_of(r as f64, c as f64);
        bilinear(source, sr, sc)
    })
}

/// Render a mask through an inverse mapping onto a canvas of the same shape
pub fn warp_mask(source: &ArrayView2<'_, bool>, mapping: &InverseRigid) -> Array2<bool> {
    Array2::from_shape_fn(source.dim(), |(r, c)| {
        let (sr, sc) = mapping.source_of(r as f64, c as f64);
        nearest_mask(source, sr, sc)
    })
}
