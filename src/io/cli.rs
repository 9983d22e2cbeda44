//! Command-line interface for stitching a four-fragment tissue section

use crate::configuration::{Configuration, ConfigurationResolver};
use crate::fragment::PositionLabel;
use crate::io::assembly::export_fused;
use crate::io::cache::{CachedSource, PngStore};
use crate::io::configuration::{DEFAULT_SEED, DEFAULT_TOP_K, OUTPUT_FILE_NAME, StitchParameters};
use crate::io::error::{Result, StitchError, configuration_error};
use crate::io::preprocess::{RawFragment, RawQuadrants};
use crate::io::progress::ProgressManager;
use crate::schedule::{FragmentSource, MultiResolutionScheduler, StitchResult};
use clap::{ArgAction, Parser};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Directory of fragment images in direct mode
pub const IMAGES_DIR: &str = "images";
/// Directory of unlabeled fragment images in candidate mode
pub const RAW_IMAGES_DIR: &str = "raw_images";
/// Directory of tissue masks
pub const MASKS_DIR: &str = "masks";

#[derive(Parser, Debug)]
#[command(name = "quadstitch")]
#[command(
    author,
    version,
    about = "Reassemble four histology fragments into one section"
)]
/// Command-line arguments for the stitching tool
pub struct Cli {
    /// Data directory holding `images/` (or `raw_images/`) and `masks/`
    #[arg(value_name = "DATA_DIR")]
    pub target: PathBuf,

    /// Candidate configuration file; fragments are read from `raw_images/`
    #[arg(short, long, value_name = "FILE")]
    pub candidates: Option<PathBuf>,

    /// Random seed for reproducible stitching
    #[arg(short, long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Generations per resolution stage
    #[arg(short, long)]
    pub generations: Option<usize>,

    /// Candidates per generation
    #[arg(short, long)]
    pub population: Option<usize>,

    /// Candidate configurations to optimize
    #[arg(short = 'k', long, default_value_t = DEFAULT_TOP_K)]
    pub top_k: usize,

    /// Output PNG path (defaults to `<DATA_DIR>/stitched.png`)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Directory for caching prepared fragments between runs
    #[arg(long, value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Suppress progress output
    #[arg(short, long)]
    pub quiet: bool,

    /// Increase log verbosity (repeatable)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Check if progress should be displayed
    pub const fn should_show_progress(&self) -> bool {
        !self.quiet
    }

    /// Stitching parameters with the command-line overrides applied
    pub fn parameters(&self) -> StitchParameters {
        let defaults = StitchParameters::default();
        StitchParameters {
            seed: self.seed,
            n_generations: self.generations.unwrap_or(defaults.n_generations),
            n_solutions: self.population.unwrap_or(defaults.n_solutions),
            top_k: self.top_k,
            ..defaults
        }
    }

    /// Where the fused image is written
    pub fn output_path(&self) -> PathBuf {
        self.output
            .clone()
            .unwrap_or_else(|| self.target.join(OUTPUT_FILE_NAME))
    }
}

/// Quadrant named by a file name, from a `ul`/`ur`/`ll`/`lr` token
///
/// Tokens separated by non-alphanumeric characters win over substrings; a
/// name matching more than one label is ambiguous and yields `None`.
pub fn label_from_name(name: &str) -> Option<PositionLabel> {
    let stem = Path::new(name)
        .file_stem()
        .map_or_else(|| name.to_lowercase(), |s| s.to_string_lossy().to_lowercase());

    let by_token: Vec<PositionLabel> = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter_map(|token| token.parse().ok())
        .collect();
    if let [label] = by_token.as_slice() {
        return Some(*label);
    }
    if by_token.len() > 1 {
        return None;
    }

    let by_substring: Vec<PositionLabel> = PositionLabel::ALL
        .into_iter()
        .filter(|label| stem.contains(&label.code().to_lowercase()))
        .collect();
    match by_substring.as_slice() {
        [label] => Some(*label),
        _ => None,
    }
}

fn list_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| StitchError::FileSystem {
        path: dir.to_path_buf(),
        operation: "list directory",
        source,
    })?;
    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| StitchError::FileSystem {
                path: dir.to_path_buf(),
                operation: "list directory",
                source,
            })?
            .path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Mask in `masks` with the same file stem as `image`
fn mask_for(image: &Path, masks: &[PathBuf]) -> Option<PathBuf> {
    let stem = image.file_stem()?;
    masks
        .iter()
        .find(|mask| mask.file_stem() == Some(stem))
        .cloned()
}

/// Orchestrates loading, stitching and export with progress tracking
pub struct Stitcher {
    cli: Cli,
    parameters: StitchParameters,
    progress_manager: ProgressManager,
}

impl Stitcher {
    /// Create a stitcher for the given CLI arguments
    pub fn new(cli: Cli) -> Self {
        let parameters = cli.parameters();
        let progress_manager = ProgressManager::new(!cli.should_show_progress());
        Self {
            cli,
            parameters,
            progress_manager,
        }
    }

    /// Parameters in effect
    pub const fn parameters(&self) -> &StitchParameters {
        &self.parameters
    }

    /// Stitch according to the CLI arguments and export the fused image
    ///
    /// # Errors
    ///
    /// Returns an error if the inputs are missing or malformed, the parameters
    /// are invalid, or the result cannot be written
    pub fn process(&mut self) -> Result<StitchResult> {
        self.parameters.validate()?;
        let start = Instant::now();

        let result = match self.cli.candidates.clone() {
            Some(path) => self.process_candidates(&path)?,
            None => {
                let raws = self.load_labeled()?;
                self.progress_manager
                    .initialize(self.parameters.resolutions.len());
                self.stitch(raws, "section")?
            }
        };
        self.progress_manager.finish();

        let output = self.cli.output_path();
        export_fused(&result.fragments, &result.transforms, &output)?;
        tracing::info!(
            cost = result.cost,
            elapsed_s = start.elapsed().as_secs_f64(),
            "stitching finished"
        );
        for (label, transform) in result.transforms.iter() {
            tracing::info!(
                %label,
                tx = transform.tx,
                ty = transform.ty,
                angle = transform.angle,
                "final transform"
            );
        }
        Ok(result)
    }

    fn process_candidates(&mut self, path: &Path) -> Result<StitchResult> {
        let raw_dir = self.cli.target.join(RAW_IMAGES_DIR);
        let resolver =
            ConfigurationResolver::from_directory(&raw_dir)?.with_top_k(self.parameters.top_k);
        let configurations = resolver.resolve_file(path)?;
        let masks = list_files(&self.cli.target.join(MASKS_DIR))?;

        self.progress_manager
            .initialize(configurations.len() * self.parameters.resolutions.len());

        let mut best: Option<StitchResult> = None;
        for (rank, configuration) in configurations.into_iter().enumerate() {
            tracing::info!(rank = rank + 1, %configuration, "stitching candidate");
            let raws = Self::load_configuration(&raw_dir, &masks, &configuration)?;
            let result = self
                .stitch(raws, &format!("candidate {}", rank + 1))?
                .with_configuration(configuration);
            if best.as_ref().is_none_or(|b| result.cost < b.cost) {
                best = Some(result);
            }
        }

        best.ok_or_else(|| configuration_error(&"candidate file holds no configurations"))
    }

    fn load_configuration(
        raw_dir: &Path,
        masks: &[PathBuf],
        configuration: &Configuration,
    ) -> Result<Vec<RawFragment>> {
        configuration
            .assignments
            .iter()
            .map(|assignment| {
                let image = raw_dir.join(&assignment.identity);
                let mask = mask_for(&image, masks).ok_or_else(|| {
                    configuration_error(&format!("no mask for '{}'", assignment.identity))
                })?;
                RawFragment::load(assignment.label, &image, &mask)
            })
            .collect()
    }

    fn load_labeled(&self) -> Result<Vec<RawFragment>> {
        let images = list_files(&self.cli.target.join(IMAGES_DIR))?;
        let masks = list_files(&self.cli.target.join(MASKS_DIR))?;

        let mut raws = Vec::with_capacity(PositionLabel::ALL.len());
        for image in &images {
            let name = image.file_name().unwrap_or_default().to_string_lossy();
            let Some(label) = label_from_name(&name) else {
                tracing::debug!(file = %name, "skipping file without a quadrant label");
                continue;
            };
            let mask = mask_for(image, &masks)
                .or_else(|| {
                    masks.iter().find(|m| {
                        label_from_name(&m.file_name().unwrap_or_default().to_string_lossy())
                            == Some(label)
                    })
                    .cloned()
                })
                .ok_or_else(|| configuration_error(&format!("no mask for '{name}'")))?;
            raws.push(RawFragment::load(label, image, &mask)?);
        }
        Ok(raws)
    }

    fn stitch(&mut self, raws: Vec<RawFragment>, name: &str) -> Result<StitchResult> {
        let quadrants = RawQuadrants::new(raws, self.parameters.pad_fraction)?;
        let mut source: Box<dyn FragmentSource> = match &self.cli.cache_dir {
            Some(dir) => Box::new(CachedSource::new(quadrants, PngStore::new(dir.clone()))),
            None => Box::new(quadrants),
        };

        let mut scheduler = MultiResolutionScheduler::new(self.parameters.stages()?)?;
        while !scheduler.is_finished() {
            let index = scheduler.state().resolution_index;
            let resolution = self.parameters.resolutions.get(index).copied().unwrap_or(1.0);
            let bar = self
                .progress_manager
                .start_stage(&format!("{name} @ {resolution}"), self.parameters.n_generations);
            let progress = &self.progress_manager;
            let report = scheduler.advance(source.as_mut(), |generation, best_cost| {
                progress.update_generation(bar, generation, best_cost);
            })?;
            progress.complete_stage(bar, report.cost);
            tracing::debug!(
                generations = progress.stage_position(bar),
                completed_stages = progress.completed_stages(),
                "stage progress"
            );
        }
        scheduler.finish()
    }
}
