//! Error types for the stitching pipeline
//!
//! Integrity and configuration errors are fatal and surface immediately. Numeric
//! degeneracies inside the optimizer never become errors; they are absorbed by the
//! fitness ranking.

use std::fmt;
use std::path::PathBuf;

/// Main error type for all stitching operations
#[derive(Debug)]
pub enum StitchError {
    /// Failed to load a fragment image or mask from the filesystem
    ImageLoad {
        /// Path to the image file
        path: PathBuf,
        /// Underlying image loading error
        source: image::ImageError,
    },

    /// Failed to save an image to disk
    ImageExport {
        /// Path where export was attempted
        path: PathBuf,
        /// Underlying image export error
        source: image::ImageError,
    },

    /// General file system operation failure
    FileSystem {
        /// Path involved in the operation
        path: PathBuf,
        /// Description of the operation that failed
        operation: &'static str,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Parameter validation failed
    InvalidParameter {
        /// Name of the invalid parameter
        parameter: &'static str,
        /// Provided value that failed validation
        value: String,
        /// Explanation of why the value is invalid
        reason: String,
    },

    /// The candidate-configuration file is malformed or inconsistent
    ///
    /// Raised when a line's embedded score token disagrees with its parsed
    /// score, or when a line cannot be mapped back onto the fragment files.
    Integrity {
        /// 1-based line number in the candidate file
        line: usize,
        /// Description of the inconsistency
        reason: String,
    },

    /// Fragments handed to the core do not form a valid four-quadrant set
    ///
    /// Occurs when a position label is missing or assigned twice, or when
    /// the fragments of one resolution do not share a canvas.
    Configuration {
        /// Description of what is wrong with the fragment set
        reason: String,
    },

    /// Numerical computation produced an invalid result outside the optimizer loop
    Computation {
        /// Name of the computation that failed
        operation: &'static str,
        /// Description of the failure
        reason: String,
    },
}

impl fmt::Display for StitchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ImageLoad { path, source } => {
                write!(f, "Failed to load image '{}': {source}", path.display())
            }
            Self::ImageExport { path, source } => {
                write!(
                    f,
                    "Failed to export image to '{}': {source}",
                    path.display()
                )
            }
            Self::FileSystem {
                path,
                operation,
                source,
            } => {
                write!(
                    f,
                    "File system error during {operation} on '{}': {source}",
                    path.display()
                )
            }
            Self::InvalidParameter {
                parameter,
                value,
                reason,
            } => {
                write!(f, "Invalid parameter '{parameter}' = '{value}': {reason}")
            }
            Self::Integrity { line, reason } => {
                write!(f, "Integrity error in candidate file at line {line}: {reason}")
            }
            Self::Configuration { reason } => {
                write!(f, "Invalid fragment configuration: {reason}")
            }
            Self::Computation { operation, reason } => {
                write!(f, "Computation error in {operation}: {reason}")
            }
        }
    }
}

impl std::error::Error for StitchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ImageLoad { source, .. } | Self::ImageExport { source, .. } => Some(source),
            Self::FileSystem { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Convenience type alias for stitching results
pub type Result<T> = std::result::Result<T, StitchError>;

impl From<image::ImageError> for StitchError {
    fn from(err: image::ImageError) -> Self {
        Self::ImageLoad {
            path: PathBuf::from("<unknown>"),
            source: err,
        }
    }
}

impl From<std::io::Error> for StitchError {
    fn from(err: std::io::Error) -> Self {
        Self::FileSystem {
            path: PathBuf::from("<unknown>"),
            operation: "unknown",
            source: err,
        }
    }
}

/// Create an invalid parameter error
pub fn invalid_parameter(
    parameter: &'static str,
    value: &impl ToString,
    reason: &impl ToString,
) -> StitchError {
    StitchError::InvalidParameter {
        parameter,
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Create an integrity error for the given 1-based candidate file line
pub fn integrity_error(line: usize, reason: &impl ToString) -> StitchError {
    StitchError::Integrity {
        line,
        reason: reason.to_string(),
    }
}

/// Create a fragment configuration error
pub fn configuration_error(reason: &impl ToString) -> StitchError {
    StitchError::Configuration {
        reason: reason.to_string(),
    }
}

/// Create a computation error
pub fn computation_error(operation: &'static str, reason: &impl ToString) -> StitchError {
    StitchError::Computation {
        operation,
        reason: reason.to_string(),
    }
}
