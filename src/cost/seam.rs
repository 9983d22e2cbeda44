//! Geometry of the boundary between two adjacent positioned fragments
//!
//! A seam is crossed by "lines": rows for a vertical seam, columns for a
//! horizontal one. On each line the first fragment's inward edge is its last
//! tissue pixel and the second fragment's inward edge is its first.

use crate::cost::histogram::Histogram;
use crate::fragment::{Positioned, Seam, SeamAxis};
use ndarray::{Array2, Zip};

/// Raw measurements of a seam whose fragments share at least one line
#[derive(Debug, Clone, PartialEq)]
pub struct SeamTerms {
    /// Number of lines on which both fragments have tissue
    pub shared_lines: usize,
    /// Mean absolute gap between the two inward edges, in pixels
    ///
    /// Adjacent edge pixels have a gap of zero; overlapping edges count as gaps too.
    pub mean_gap: f64,
    /// Distance between the seam-side intensity histograms, in [0, 1]
    pub histogram_distance: f64,
    /// Offset (rows, cols) of the outer edge end points from where abutting edges would put them
    pub outer_offset: (f64, f64),
}

/// Result of measuring one seam
#[derive(Debug, Clone, PartialEq)]
pub enum SeamMeasurement {
    /// No line carries tissue from both fragments
    Disjoint,
    /// The fragments face each other on at least one line
    Shared(SeamTerms),
}

const fn cell(axis: SeamAxis, line: usize, pos: usize) -> (usize, usize) {
    match axis {
        SeamAxis::Vertical => (line, pos),
        SeamAxis::Horizontal => (pos, line),
    }
}

const fn line_layout(axis: SeamAxis, shape: (usize, usize)) -> (usize, usize) {
    match axis {
        SeamAxis::Vertical => (shape.0, shape.1),
        SeamAxis::Horizontal => (shape.1, shape.0),
    }
}

/// Inward edge position on every line, `None` where the line holds no tissue
///
/// With `toward_high` the edge is the last tissue pixel (right or bottom side),
/// otherwise the first.
pub fn inward_edges(mask: &Array2<bool>, axis: SeamAxis, toward_high: bool) -> Vec<Option<usize>> {
    let (lines, span) = line_layout(axis, mask.dim());
    (0..lines)
        .map(|line| {
            let occupied = |pos: &usize| {
                mask.get(cell(axis, line, *pos))
                    .copied()
                    .unwrap_or(false)
            };
            if toward_high {
                (0..span).rev().find(occupied)
            } else {
                (0..span).find(occupied)
            }
        })
        .collect()
}

/// End point (row, col) of an edge at its outer end
fn outer_point(edges: &[Option<usize>], axis: SeamAxis, low_end: bool) -> Option<(f64, f64)> {
    let mut present = edges
        .iter()
        .enumerate()
        .filter_map(|(line, pos)| pos.map(|p| (line, p)));
    let (line, pos) = if low_end {
        present.next()
    } else {
        present.last()
    }?;
    let (row, col) = cell(axis, line, pos);
    Some((row as f64, col as f64))
}

/// Number of canvas pixels where both masks hold tissue
pub fn overlap_pixels(first: &Array2<bool>, second: &Array2<bool>) -> usize {
    if first.dim() != second.dim() {
        return 0;
    }
    Zip::from(first)
        .and(second)
        .fold(0, |count, &a, &b| if a && b { count + 1 } else { count })
}

/// Measure gap, histogram and outer-point terms of one seam
///
/// `window` is the histogram window depth in pixels on each side of the seam.
pub fn measure_seam(
    seam: Seam,
    first: &Positioned,
    second: &Positioned,
    nbins: usize,
    window: usize,
) -> SeamMeasurement {
    let axis = seam.axis;
    let first_edges = inward_edges(&first.mask, axis, true);
    let second_edges = inward_edges(&second.mask, axis, false);
    let (_, span) = line_layout(axis, first.mask.dim());
    let window = window.max(1);

    let mut first_hist = Histogram::new(nbins);
    let mut second_hist = Histogram::new(nbins);
    let mut gap_sum = 0.0;
    let mut shared_lines = 0_usize;

    for (line, (a, b)) in first_edges.iter().zip(second_edges.iter()).enumerate() {
        let (Some(a), Some(b)) = (*a, *b) else {
            continue;
        };
        shared_lines += 1;
        gap_sum += (b as f64 - a as f64 - 1.0).abs();

        for pos in a.saturating_sub(window - 1)..=a {
            let at = cell(axis, line, pos);
            if first.mask.get(at).copied().unwrap_or(false) {
                first_hist.add(first.gray.get(at).copied().unwrap_or(0.0));
            }
        }
        for pos in b..(b + window).min(span) {
            let at = cell(axis, line, pos);
            if second.mask.get(at).copied().unwrap_or(false) {
                second_hist.add(second.gray.get(at).copied().unwrap_or(0.0));
            }
        }
    }

    if shared_lines == 0 {
        return SeamMeasurement::Disjoint;
    }

    // Abutting edges sit one pixel apart along the seam normal
    let (row_adjacency, col_adjacency) = match axis {
        SeamAxis::Vertical => (0.0, 1.0),
        SeamAxis::Horizontal => (1.0, 0.0),
    };
    let low_end = seam.outer_end_is_low();
    let outer_offset = match (
        outer_point(&first_edges, axis, low_end),
        outer_point(&second_edges, axis, low_end),
    ) {
        (Some(p), Some(q)) => (p.0 - q.0 + row_adjacency, p.1 - q.1 + col_adjacency),
        _ => (0.0, 0.0),
    };

    SeamMeasurement::Shared(SeamTerms {
        shared_lines,
        mean_gap: gap_sum / shared_lines as f64,
        histogram_distance: first_hist.distance(&second_hist),
        outer_offset,
    })
}
