//! Intensity histograms for comparing the tissue on both sides of a seam

/// Fixed-bin histogram over intensities in [0, 1]
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    counts: Vec<f64>,
    total: f64,
}

impl Histogram {
    /// Create an empty histogram with `nbins` bins (at least one)
    pub fn new(nbins: usize) -> Self {
        Self {
            counts: vec![0.0; nbins.max(1)],
            total: 0.0,
        }
    }

    /// Number of bins
    pub fn nbins(&self) -> usize {
        self.counts.len()
    }

    /// Count one intensity; values outside [0, 1] land in the edge bins
    pub fn add(&mut self, value: f64) {
        if !value.is_finite() {
            return;
        }
        let bins = self.counts.len();
        let bin = ((value.clamp(0.0, 1.0) * bins as f64) as usize).min(bins - 1);
        if let Some(count) = self.counts.get_mut(bin) {
            *count += 1.0;
            self.total += 1.0;
        }
    }

    /// Number of samples counted
    pub const fn total(&self) -> f64 {
        self.total
    }

    /// Whether no sample has been counted
    pub fn is_empty(&self) -> bool {
        self.total <= 0.0
    }

    /// Bin frequencies summing to one (all zero when empty)
    pub fn normalized(&self) -> Vec<f64> {
        if self.is_empty() {
            return vec![0.0; self.counts.len()];
        }
        self.counts.iter().map(|c| c / self.total).collect()
    }

    /// Half the L1 distance between the normalized histograms, in [0, 1]
    ///
    /// An empty side, or a bin count mismatch, is maximally distant.
    pub fn distance(&self, other: &Self) -> f64 {
        if self.is_empty() || other.is_empty() || self.nbins() != other.nbins() {
            return 1.0;
        }
        let l1: f64 = self
            .normalized()
            .iter()
            .zip(other.normalized())
            .map(|(a, b)| (a - b).abs())
            .sum();
        (0.5 * l1).clamp(0.0, 1.0)
    }
}
