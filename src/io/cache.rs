//! Storage of prepared fragments between runs

use crate::fragment::{Fragment, PositionLabel, QuadrantSet};
use crate::io::error::{Result, StitchError};
use crate::io::image::{
    array_to_mask, array_to_rgb, load_gray, load_rgb, load_unit_gray, mask_to_array,
    rgb_to_array, save_png, unit_gray_to_image,
};
use crate::io::preprocess::{RawQuadrants, content_hash, prepare_quadrants};
use crate::schedule::{FragmentSource, StageConfig};
use std::collections::HashMap;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

const GRAY_FILE: &str = "gray.png";
const COLOR_FILE: &str = "color.png";
const MASK_FILE: &str = "mask.png";
const IDENTITY_FILE: &str = "identity.txt";

/// Identifies one prepared fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Resolution stage
    pub resolution_index: usize,
    /// Quadrant
    pub label: PositionLabel,
    /// Hash of the raw inputs and preprocessing settings
    pub input_hash: u64,
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "r{}_{}_{:016x}",
            self.resolution_index,
            self.label.code().to_lowercase(),
            self.input_hash
        )
    }
}

/// Keyed storage of prepared fragments
pub trait FragmentStore {
    /// Fetch a fragment, `None` on a miss
    ///
    /// # Errors
    ///
    /// Returns an error if a stored entry exists but cannot be read
    fn load(&mut self, key: &CacheKey) -> Result<Option<Fragment>>;

    /// Store a fragment under `key`, replacing any previous entry
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written
    fn store(&mut self, key: &CacheKey, fragment: &Fragment) -> Result<()>;
}

/// In-process store with hit statistics
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<CacheKey, Fragment>,
    hits: usize,
    misses: usize,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored fragments
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is stored
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads that found an entry
    pub const fn hits(&self) -> usize {
        self.hits
    }

    /// Loads that found nothing
    pub const fn misses(&self) -> usize {
        self.misses
    }
}

impl FragmentStore for MemoryStore {
    fn load(&mut self, key: &CacheKey) -> Result<Option<Fragment>> {
        let found = self.entries.get(key).cloned();
        if found.is_some() {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        Ok(found)
    }

    fn store(&mut self, key: &CacheKey, fragment: &Fragment) -> Result<()> {
        self.entries.insert(*key, fragment.clone());
        Ok(())
    }
}

/// Directory of PNG files, one subdirectory per key
///
/// Grayscale is kept as 16-bit PNG so the round trip loses less than 1/65535.
#[derive(Debug, Clone)]
pub struct PngStore {
    root: PathBuf,
}

impl PngStore {
    /// Store rooted at `root`; the directory is created on first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Directory holding `key`'s files
    pub fn entry_dir(&self, key: &CacheKey) -> PathBuf {
        self.root.join(key.to_string())
    }
}

impl FragmentStore for PngStore {
    fn load(&mut self, key: &CacheKey) -> Result<Option<Fragment>> {
        let dir = self.entry_dir(key);
        let identity_path = dir.join(IDENTITY_FILE);
        if !identity_path.is_file() {
            return Ok(None);
        }

        let identity = read_text(&identity_path)?;
        let gray = load_unit_gray(&dir.join(GRAY_FILE))?;
        let color = rgb_to_array(&load_rgb(&dir.join(COLOR_FILE))?);
        let mask = mask_to_array(&load_gray(&dir.join(MASK_FILE))?);

        let fragment = Fragment::new(
            key.label,
            identity.trim_end(),
            key.resolution_index,
            gray,
            color,
            mask,
        )?;
        tracing::trace!(%key, "fragment cache hit");
        Ok(Some(fragment))
    }

    fn store(&mut self, key: &CacheKey, fragment: &Fragment) -> Result<()> {
        let dir = self.entry_dir(key);
        save_png(&unit_gray_to_image(fragment.gray()), &dir.join(GRAY_FILE))?;
        save_png(&array_to_rgb(fragment.color()), &dir.join(COLOR_FILE))?;
        save_png(&array_to_mask(fragment.mask()), &dir.join(MASK_FILE))?;
        // Written last so a partial entry never counts as a hit
        let identity_path = dir.join(IDENTITY_FILE);
        fs::write(&identity_path, &fragment.identity).map_err(|source| {
            StitchError::FileSystem {
                path: identity_path,
                operation: "write cache entry",
                source,
            }
        })
    }
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).map_err(|source| StitchError::FileSystem {
        path: path.to_path_buf(),
        operation: "read cache entry",
        source,
    })
}

/// Fragment source that consults a store before preprocessing
#[derive(Debug)]
pub struct CachedSource<S: FragmentStore> {
    raws: RawQuadrants,
    store: S,
}

impl<S: FragmentStore> CachedSource<S> {
    /// Wrap raw fragments with a store
    pub const fn new(raws: RawQuadrants, store: S) -> Self {
        Self { raws, store }
    }

    /// Underlying store
    pub const fn store(&self) -> &S {
        &self.store
    }

    fn keys(&self, resolution_index: usize, resolution: f64) -> Vec<CacheKey> {
        self.raws
            .raws()
            .iter()
            .map(|raw| CacheKey {
                resolution_index,
                label: raw.label,
                input_hash: content_hash(raw, resolution, self.raws.pad_fraction()),
            })
            .collect()
    }
}

impl<S: FragmentStore> FragmentSource for CachedSource<S> {
    fn quadrants(&mut self, resolution_index: usize, stage: &StageConfig) -> Result<QuadrantSet> {
        let keys = self.keys(resolution_index, stage.resolution);

        let mut cached = Vec::with_capacity(keys.len());
        for key in &keys {
            match self.store.load(key)? {
                Some(fragment) => cached.push(fragment),
                None => break,
            }
        }
        if cached.len() == keys.len() {
            tracing::debug!(resolution_index, "using cached fragments");
            return QuadrantSet::from_fragments(cached);
        }

        let set = prepare_quadrants(
            self.raws.raws(),
            stage.resolution,
            resolution_index,
            self.raws.pad_fraction(),
        )?;
        for key in &keys {
            self.store.store(key, set.get(key.label))?;
        }
        Ok(set)
    }
}
