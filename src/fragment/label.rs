//! Quadrant position labels and the seams between them

use std::fmt;
use std::str::FromStr;

/// Target quadrant of a tissue fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PositionLabel {
    /// Upper-left quadrant
    UpperLeft,
    /// Upper-right quadrant
    UpperRight,
    /// Lower-left quadrant
    LowerLeft,
    /// Lower-right quadrant
    LowerRight,
}

impl PositionLabel {
    /// All labels in canonical order, which is also the order of a `TransformVector`
    pub const ALL: [Self; 4] = [
        Self::UpperLeft,
        Self::UpperRight,
        Self::LowerLeft,
        Self::LowerRight,
    ];

    /// Position of this label in canonical order
    pub const fn index(self) -> usize {
        match self {
            Self::UpperLeft => 0,
            Self::UpperRight => 1,
            Self::LowerLeft => 2,
            Self::LowerRight => 3,
        }
    }

    /// Two-letter code used in candidate files
    pub const fn code(self) -> &'static str {
        match self {
            Self::UpperLeft => "UL",
            Self::UpperRight => "UR",
            Self::LowerLeft => "LL",
            Self::LowerRight => "LR",
        }
    }

    /// Whether the fragment sits in the top half of the section
    pub const fn is_upper(self) -> bool {
        matches!(self, Self::UpperLeft | Self::UpperRight)
    }

    /// Whether the fragment sits in the left half of the section
    pub const fn is_left(self) -> bool {
        matches!(self, Self::UpperLeft | Self::LowerLeft)
    }
}

impl fmt::Display for PositionLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for PositionLabel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "UL" => Ok(Self::UpperLeft),
            "UR" => Ok(Self::UpperRight),
            "LL" => Ok(Self::LowerLeft),
            "LR" => Ok(Self::LowerRight),
            other => Err(format!("unknown position label '{other}'")),
        }
    }
}

/// Orientation of the boundary shared by two adjacent fragments
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeamAxis {
    /// Fragments sit side by side; the seam runs top to bottom
    Vertical,
    /// Fragments are stacked; the seam runs left to right
    Horizontal,
}

/// A pair of adjacent quadrants
///
/// `first` is always the left (vertical seam) or top (horizontal seam) fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Seam {
    /// Left or top fragment
    pub first: PositionLabel,
    /// Right or bottom fragment
    pub second: PositionLabel,
    /// Seam orientation
    pub axis: SeamAxis,
}

impl Seam {
    /// The four seams of the fixed quadrant layout
    pub const ALL: [Self; 4] = [
        Self {
            first: PositionLabel::UpperLeft,
            second: PositionLabel::UpperRight,
            axis: SeamAxis::Vertical,
        },
        Self {
            first: PositionLabel::UpperLeft,
            second: PositionLabel::LowerLeft,
            axis: SeamAxis::Horizontal,
        },
        Self {
            first: PositionLabel::UpperRight,
            second: PositionLabel::LowerRight,
            axis: SeamAxis::Horizontal,
        },
        Self {
            first: PositionLabel::LowerLeft,
            second: PositionLabel::LowerRight,
            axis: SeamAxis::Vertical,
        },
    ];

    /// Whether the outer end of this seam lies at the low coordinate end
    ///
    /// The outer end is where the seam meets the section's outer boundary:
    /// top for UL–UR, bottom for LL–LR, left for UL–LL and right for UR–LR.
    pub const fn outer_end_is_low(self) -> bool {
        match self.axis {
            SeamAxis::Vertical => self.first.is_upper(),
            SeamAxis::Horizontal => self.first.is_left(),
        }
    }
}
