//! Source unit: one discovered file and its cached parse

use chrono::{DateTime, Utc};

use crate::features::parsing::{ParsedTree, Parser};
use crate::shared::models::{CodemendError, Result};

/// A single source file held in the index.
///
/// The parsed tree is built lazily and cached; any text mutation drops the
/// cache so later stages never see a tree for stale text.
#[derive(Debug, Clone)]
pub struct SourceUnit {
    /// Repo-relative path, the unit's identity
    pub path: String,

    text: String,

    /// Last in-memory modification
    pub modified_at: DateTime<Utc>,

    tree: Option<ParsedTree>,
}

impl SourceUnit {
    pub fn new(path: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            text: text.into(),
            modified_at: Utc::now(),
            tree: None,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the unit's text, invalidating the cached tree.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
        self.modified_at = Utc::now();
        self.tree = None;
    }

    pub fn has_cached_tree(&self) -> bool {
        self.tree.is_some()
    }

    pub fn invalidate_tree(&mut self) {
        self.tree = None;
    }

    /// Parse (or return the cached) syntax tree for the current text.
    ///
    /// A failed parse is not cached, so a later retry re-parses.
    pub fn tree(&mut self, parser: &dyn Parser) -> Result<&ParsedTree> {
        if self.tree.is_none() {
            let parsed = parser.parse(&self.text, &self.path)?;
            self.tree = Some(parsed);
        }
        match &self.tree {
            Some(tree) => Ok(tree),
            None => Err(CodemendError::internal("tree cache empty after parse")),
        }
    }
}
