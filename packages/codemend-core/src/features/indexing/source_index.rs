//! Source index: the set of discovered units
//!
//! Deterministic (sorted by path) so graph building and planning produce
//! identical output across runs. Unit texts are mutated only by the patch
//! applier; everything else reads.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::source_unit::SourceUnit;
use crate::shared::models::{CodemendError, Result};

/// Mapping from unit path to source unit, with an optional repository root
/// for flushing patched text back to disk and re-reading single units.
#[derive(Debug, Default)]
pub struct SourceIndex {
    root: Option<PathBuf>,
    units: BTreeMap<String, SourceUnit>,
}

impl SourceIndex {
    /// Create an empty, in-memory index (no disk backing)
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an index rooted at a repository directory
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: Some(root.into()),
            units: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> Option<&Path> {
        self.root.as_deref()
    }

    pub fn insert_unit(&mut self, path: impl Into<String>, text: impl Into<String>) {
        let path = path.into();
        self.units.insert(path.clone(), SourceUnit::new(path, text));
    }

    pub fn get(&self, path: &str) -> Option<&SourceUnit> {
        self.units.get(path)
    }

    pub fn get_mut(&mut self, path: &str) -> Option<&mut SourceUnit> {
        self.units.get_mut(path)
    }

    pub fn contains(&self, path: &str) -> bool {
        self.units.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Unit paths in sorted order
    pub fn paths(&self) -> Vec<String> {
        self.units.keys().cloned().collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &SourceUnit)> {
        self.units.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut SourceUnit)> {
        self.units.iter_mut()
    }

    /// Snapshot of every unit's current text
    pub fn texts(&self) -> BTreeMap<String, String> {
        self.units
            .iter()
            .map(|(path, unit)| (path.clone(), unit.text().to_string()))
            .collect()
    }

    /// Replace a unit's text (cached tree is invalidated by the unit)
    pub fn set_unit_text(&mut self, path: &str, text: impl Into<String>) -> Result<()> {
        match self.units.get_mut(path) {
            Some(unit) => {
                unit.set_text(text);
                Ok(())
            }
            None => Err(CodemendError::internal(format!("unknown unit: {}", path))),
        }
    }

    /// Write a unit's current text to disk. No-op for in-memory indexes.
    pub fn flush_unit(&self, path: &str) -> Result<()> {
        let Some(root) = &self.root else {
            return Ok(());
        };
        let unit = self
            .units
            .get(path)
            .ok_or_else(|| CodemendError::internal(format!("unknown unit: {}", path)))?;
        fs::write(root.join(path), unit.text()).map_err(|e| {
            CodemendError::patch_write(format!("failed to write {}: {}", path, e))
                .with_file(path)
                .with_source(e)
        })
    }

    /// Re-read one unit from disk without re-scanning the repository.
    pub fn reload_unit(&mut self, path: &str) -> Result<()> {
        let Some(root) = &self.root else {
            return Err(CodemendError::config("index has no repository root"));
        };
        let text = fs::read_to_string(root.join(path))
            .map_err(|e| CodemendError::from(e).with_file(path))?;
        self.set_unit_text(path, text)
    }
}
