//! Reading the candidate file and picking the most promising configurations

use crate::configuration::candidate::Configuration;
use crate::io::configuration::DEFAULT_TOP_K;
use crate::io::error::{Result, StitchError, invalid_parameter};
use crate::io::logging::log_at;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;

/// Resolves candidate-file lines against the fragment files they refer to
#[derive(Debug, Clone)]
pub struct ConfigurationResolver {
    filenames: Vec<String>,
    top_k: usize,
    level: Level,
}

impl ConfigurationResolver {
    /// Create a resolver over `filenames`, which are sorted here
    pub fn new(mut filenames: Vec<String>) -> Self {
        filenames.sort();
        Self {
            filenames,
            top_k: DEFAULT_TOP_K,
            level: Level::INFO,
        }
    }

    /// Create a resolver over the file names found in `directory`
    ///
    /// # Errors
    ///
    /// Returns `FileSystem` if the directory cannot be listed
    pub fn from_directory(directory: &Path) -> Result<Self> {
        let entries = fs::read_dir(directory).map_err(|source| StitchError::FileSystem {
            path: directory.to_path_buf(),
            operation: "list fragment files",
            source,
        })?;

        let mut filenames = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| StitchError::FileSystem {
                path: directory.to_path_buf(),
                operation: "list fragment files",
                source,
            })?;
            if entry.path().is_file() {
                filenames.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        Ok(Self::new(filenames))
    }

    /// Number of configurations `resolve` keeps
    #[must_use]
    pub const fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Level of the selection log line
    #[must_use]
    pub const fn with_log_level(mut self, level: Level) -> Self {
        self.level = level;
        self
    }

    /// Sorted fragment file names
    pub fn filenames(&self) -> &[String] {
        &self.filenames
    }

    /// Configured `top_k`
    pub const fn top_k(&self) -> usize {
        self.top_k
    }

    /// Parse every non-empty line of `text`
    ///
    /// # Errors
    ///
    /// Returns the first `Integrity` error encountered
    pub fn parse(&self, text: &str) -> Result<Vec<Configuration>> {
        text.lines()
            .enumerate()
            .filter(|(_, line)| !line.trim().is_empty())
            .map(|(index, line)| Configuration::parse_line(index + 1, line, &self.filenames))
            .collect()
    }

    /// Parse `text` and keep the `top_k` configurations with the lowest score
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` when `top_k` is zero and `Integrity` for a
    /// malformed line
    pub fn resolve(&self, text: &str) -> Result<Vec<Configuration>> {
        if self.top_k == 0 {
            return Err(invalid_parameter("top_k", &self.top_k, &"must be positive"));
        }
        let selected = select_top_k(self.parse(text)?, self.top_k);
        log_at(
            self.level,
            &format!("Examining {} best solutions", selected.len()),
        );
        for configuration in &selected {
            tracing::debug!(%configuration, "selected configuration");
        }
        Ok(selected)
    }

    /// Read `path` and resolve its contents
    ///
    /// # Errors
    ///
    /// Returns `FileSystem` if the file cannot be read, otherwise as `resolve`
    pub fn resolve_file(&self, path: &Path) -> Result<Vec<Configuration>> {
        let text = fs::read_to_string(path).map_err(|source| StitchError::FileSystem {
            path: PathBuf::from(path),
            operation: "read candidate file",
            source,
        })?;
        self.resolve(&text)
    }
}

/// Keep the `k` lowest-scoring configurations, ties in file order
pub fn select_top_k(mut configurations: Vec<Configuration>, k: usize) -> Vec<Configuration> {
    configurations.sort_by_key(|c| c.mse_score);
    configurations.truncate(k);
    configurations
}
