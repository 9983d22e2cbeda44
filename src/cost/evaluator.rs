//! Seam-alignment cost of a full quadrant placement

use crate::cost::seam::{SeamMeasurement, measure_seam, overlap_pixels};
use crate::fragment::{PositionLabel, Positioned, QuadrantSet, Seam, SeamAxis, TransformVector};
use crate::io::error::{Result, invalid_parameter};

/// Distances are expressed in percent of the relevant canvas extent
pub const DISTANCE_UNIT_FRACTION: f64 = 0.01;

/// Base cost of a seam whose fragments share no line
///
/// Scaled by `1 + outer_point_weight` and added to `overlap_weight`, which makes
/// a disjoint seam worse than any placement where the fragments still face each other.
pub const DISJOINT_SEAM_PENALTY: f64 = 200.0;

/// Anything that scores a placement; lower is better
///
/// Implementations must be pure so candidates can be scored in parallel.
pub trait CostFunction: Sync {
    /// Cost of placing the quadrants with `transforms`
    fn cost(&self, transforms: &TransformVector) -> f64;
}

impl<F> CostFunction for F
where
    F: Fn(&TransformVector) -> f64 + Sync,
{
    fn cost(&self, transforms: &TransformVector) -> f64 {
        self(transforms)
    }
}

/// Cost-function tuning for one resolution
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostConfig {
    /// Number of intensity histogram bins
    pub nbins: usize,
    /// Histogram window depth on each side of a seam, in pixels
    pub histogram_window: usize,
    /// Weight of the outer end-point distance term
    pub outer_point_weight: f64,
    /// Weight of the overlapping-area term
    pub overlap_weight: f64,
    /// Normalise horizontal distances by canvas width instead of the diagonal
    pub distance_scaling_horizontal: bool,
    /// Normalise vertical distances by canvas height instead of the diagonal
    pub distance_scaling_vertical: bool,
}

impl CostConfig {
    /// Check the tuning values
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` for zero bins or window, or negative/non-finite weights
    pub fn validate(&self) -> Result<()> {
        if self.nbins == 0 {
            return Err(invalid_parameter("nbins", &self.nbins, &"must be positive"));
        }
        if self.histogram_window == 0 {
            return Err(invalid_parameter(
                "hist_sizes",
                &self.histogram_window,
                &"must be positive",
            ));
        }
        for (name, weight) in [
            ("outer_point_weight", self.outer_point_weight),
            ("overlap_weight", self.overlap_weight),
        ] {
            if !weight.is_finite() || weight < 0.0 {
                return Err(invalid_parameter(
                    name,
                    &weight,
                    &"must be finite and non-negative",
                ));
            }
        }
        Ok(())
    }
}

/// Individual cost terms of one placement
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CostBreakdown {
    /// Sum of seam histogram distances
    pub histogram: f64,
    /// Sum of normalised seam gaps
    pub gap: f64,
    /// Sum of normalised outer end-point distances (unweighted)
    pub outer: f64,
    /// Sum of overlap fractions (unweighted)
    pub overlap: f64,
    /// Number of seams with no shared line
    pub disjoint_seams: usize,
    /// Weighted total
    pub total: f64,
}

/// Scores placements of one quadrant set
pub struct CostEvaluator<'a> {
    fragments: &'a QuadrantSet,
    config: CostConfig,
    horizontal_unit: f64,
    vertical_unit: f64,
}

impl<'a> CostEvaluator<'a> {
    /// Create an evaluator for the fragments of one resolution
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the configuration is invalid
    pub fn new(fragments: &'a QuadrantSet, config: CostConfig) -> Result<Self> {
        config.validate()?;
        let (rows, cols) = fragments.shape();
        let diagonal = (rows as f64).hypot(cols as f64);
        let horizontal = if config.distance_scaling_horizontal {
            cols as f64
        } else {
            diagonal
        };
        let vertical = if config.distance_scaling_vertical {
            rows as f64
        } else {
            diagonal
        };

        Ok(Self {
            fragments,
            config,
            horizontal_unit: (horizontal * DISTANCE_UNIT_FRACTION).max(f64::MIN_POSITIVE),
            vertical_unit: (vertical * DISTANCE_UNIT_FRACTION).max(f64::MIN_POSITIVE),
        })
    }

    /// Configuration in use
    pub const fn config(&self) -> &CostConfig {
        &self.config
    }

    /// Compute every cost term for a placement
    pub fn breakdown(&self, transforms: &TransformVector) -> CostBreakdown {
        let positioned: Vec<Positioned> = PositionLabel::ALL
            .iter()
            .map(|&label| self.fragments.get(label).apply(transforms.get(label)))
            .collect();
        let areas: Vec<usize> = positioned
            .iter()
            .map(|p| p.mask.iter().filter(|&&set| set).count())
            .collect();

        let mut terms = CostBreakdown::default();
        let mut disjoint_cost = 0.0;

        for seam in Seam::ALL {
            let (Some(first), Some(second)) = (
                positioned.get(seam.first.index()),
                positioned.get(seam.second.index()),
            ) else {
                continue;
            };

            let smaller_area = areas
                .get(seam.first.index())
                .copied()
                .unwrap_or(0)
                .min(areas.get(seam.second.index()).copied().unwrap_or(0));
            if smaller_area > 0 {
                terms.overlap +=
                    overlap_pixels(&first.mask, &second.mask) as f64 / smaller_area as f64;
            }

            match measure_seam(
                seam,
                first,
                second,
                self.config.nbins,
                self.config.histogram_window,
            ) {
                SeamMeasurement::Disjoint => {
                    terms.disjoint_seams += 1;
                    disjoint_cost += self.config.overlap_weight
                        + DISJOINT_SEAM_PENALTY * (1.0 + self.config.outer_point_weight);
                }
                SeamMeasurement::Shared(measured) => {
                    let gap_unit = match seam.axis {
                        SeamAxis::Vertical => self.horizontal_unit,
                        SeamAxis::Horizontal => self.vertical_unit,
                    };
                    terms.histogram += measured.histogram_distance;
                    terms.gap += measured.mean_gap / gap_unit;
                    terms.outer += (measured.outer_offset.0 / self.vertical_unit)
                        .hypot(measured.outer_offset.1 / self.horizontal_unit);
                }
            }
        }

        terms.total = self.config.overlap_weight.mul_add(
            terms.overlap,
            self.config
                .outer_point_weight
                .mul_add(terms.outer, terms.histogram + terms.gap),
        ) + disjoint_cost;
        terms
    }
}

impl CostFunction for CostEvaluator<'_> {
    fn cost(&self, transforms: &TransformVector) -> f64 {
        self.breakdown(transforms).total
    }
}
