//! Input/output surfaces around the stitching core

/// Fused-image rendering and export
pub mod assembly;
/// Prepared-fragment storage
pub mod cache;
/// Command-line interface
pub mod cli;
/// Constants and runtime parameters
pub mod configuration;
/// Error types
pub mod error;
/// Image loading, conversion and PNG export
pub mod image;
/// Logging setup
pub mod logging;
/// Resize, mask and canvas layout of raw fragments
pub mod preprocess;
/// Progress bars
pub mod progress;
