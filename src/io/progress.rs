//! Progress display for multi-resolution stitching runs

use crate::io::configuration::PROGRESS_BAR_WIDTH;
use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::sync::LazyLock;

static STAGE_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template(&format!(
            "{{prefix}} [{{bar:{PROGRESS_BAR_WIDTH}.cyan/blue}}] {{pos}}/{{len}} {{msg}}"
        ))
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏ ")
});

static OVERALL_STYLE: LazyLock<ProgressStyle> = LazyLock::new(|| {
    ProgressStyle::default_bar()
        .template("[{elapsed_precise}] Stages: [{bar:40.cyan/blue}] {pos}/{len}")
        .unwrap_or_else(|_| ProgressStyle::default_bar())
});

/// One bar per resolution stage plus an overall stage counter
///
/// Stage bars advance per generation and show the best cost so far.
pub struct ProgressManager {
    multi_progress: MultiProgress,
    overall: Option<ProgressBar>,
    stage_bars: Vec<ProgressBar>,
}

impl Default for ProgressManager {
    fn default() -> Self {
        Self::new(false)
    }
}

impl ProgressManager {
    /// Create a manager; a hidden one draws nothing
    pub fn new(hidden: bool) -> Self {
        let multi_progress = if hidden {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::new()
        };
        Self {
            multi_progress,
            overall: None,
            stage_bars: Vec::new(),
        }
    }

    /// Prepare the overall counter for `total_stages` stages
    ///
    /// A single stage gets no overall bar.
    pub fn initialize(&mut self, total_stages: usize) {
        if total_stages > 1 {
            let bar = ProgressBar::new(total_stages as u64);
            bar.set_style(OVERALL_STYLE.clone());
            self.overall = Some(self.multi_progress.add(bar));
        }
    }

    /// Add a bar for a stage of `generations` generations; returns its handle index
    pub fn start_stage(&mut self, name: &str, generations: usize) -> usize {
        let bar = self
            .multi_progress
            .add(ProgressBar::new(generations as u64));
        bar.set_style(STAGE_STYLE.clone());
        bar.set_prefix(name.to_string());
        self.stage_bars.push(bar);
        self.stage_bars.len() - 1
    }

    /// Report a finished generation of stage `stage`
    pub fn update_generation(&self, stage: usize, generation: usize, best_cost: f64) {
        if let Some(bar) = self.stage_bars.get(stage) {
            bar.set_position(generation as u64);
            bar.set_message(format!("cost {best_cost:.4}"));
        }
    }

    /// Mark stage `stage` as done
    pub fn complete_stage(&self, stage: usize, cost: f64) {
        if let Some(bar) = self.stage_bars.get(stage) {
            bar.finish_with_message(format!("✓ cost {cost:.4}"));
        }
        if let Some(ref overall) = self.overall {
            overall.inc(1);
        }
    }

    /// Position of stage `stage`'s bar, if it exists
    pub fn stage_position(&self, stage: usize) -> Option<u64> {
        self.stage_bars.get(stage).map(ProgressBar::position)
    }

    /// Stages completed so far according to the overall counter
    pub fn completed_stages(&self) -> u64 {
        self.overall.as_ref().map_or(0, ProgressBar::position)
    }

    /// Clean up all progress displays
    pub fn finish(&self) {
        if let Some(ref overall) = self.overall {
            overall.finish_with_message("All stages processed");
        }
        let _ = self.multi_progress.clear();
    }
}
