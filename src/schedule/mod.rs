//! Multi-resolution scheduling of the transform optimizer

/// Stage state machine and final result
pub mod scheduler;

pub use scheduler::{
    FragmentSource, MultiResolutionScheduler, SchedulerState, StageConfig, StageReport,
    StitchResult,
};
