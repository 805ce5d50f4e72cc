//! Repository scanner
//!
//! Walks a repository directory and loads matching source files into a
//! SourceIndex. Hidden directories (including .git) are skipped.

use std::path::Path;

use walkdir::WalkDir;

use super::source_index::SourceIndex;
use crate::config::ScanConfig;
use crate::shared::models::{CodemendError, Result};

/// Walks a repository and produces a SourceIndex
pub struct RepoScanner {
    config: ScanConfig,
}

impl RepoScanner {
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Scan `root` recursively and read every matching file.
    ///
    /// Unreadable files are skipped with a warning; only a missing root is
    /// an error.
    pub fn scan(&self, root: impl AsRef<Path>) -> Result<SourceIndex> {
        let root = root.as_ref();
        if !root.is_dir() {
            return Err(CodemendError::config(format!(
                "not a directory: {}",
                root.display()
            )));
        }

        let mut index = SourceIndex::with_root(root);

        let walker = WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| !is_hidden(e));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::warn!("scan: skipping unreadable entry: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() || !self.matches_extension(entry.path()) {
                continue;
            }

            let rel_path = match entry.path().strip_prefix(root) {
                Ok(rel) => rel.to_string_lossy().replace('\\', "/"),
                Err(_) => continue,
            };

            match std::fs::read_to_string(entry.path()) {
                Ok(text) => index.insert_unit(rel_path, text),
                Err(e) => {
                    tracing::warn!("scan: cannot read {}: {}", rel_path, e);
                }
            }
        }

        tracing::info!(units = index.len(), root = %root.display(), "scan complete");
        Ok(index)
    }

    fn matches_extension(&self, path: &Path) -> bool {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return false;
        };
        self.config.extensions.iter().any(|allowed| allowed == ext)
    }
}

impl Default for RepoScanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0
        && entry
            .file_name()
            .to_str()
            .map(|name| name.starts_with('.'))
            .unwrap_or(false)
}
