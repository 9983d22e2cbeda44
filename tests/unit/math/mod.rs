pub mod interpolation;
pub mod probability;
