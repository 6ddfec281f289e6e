//! Static page index: the records the search widget ranks over.
//!
//! The index is loaded once (from the built-in `data/pages.toml` literal or
//! from a user-supplied TOML file) and never mutated afterwards. Every
//! consumer only ever sees `&[SearchRecord]`.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Built-in index shipped with the binary.
const BUILTIN_PAGES: &str = include_str!("../data/pages.toml");

/// One searchable page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchRecord {
    /// Display name. Required, non-empty.
    pub title: String,
    /// Navigation target, opaque to the widget.
    pub path: String,
    /// Grouping label, also scored.
    pub category: String,
    /// Finer grouping label, display-only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subcategory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl SearchRecord {
    /// Minimal record with only the required fields.
    pub fn new(
        title: impl Into<String>,
        path: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            path: path.into(),
            category: category.into(),
            subcategory: None,
            description: None,
            tags: Vec::new(),
        }
    }

    pub fn with_subcategory(mut self, subcategory: impl Into<String>) -> Self {
        self.subcategory = Some(subcategory.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(|t| t.to_string()).collect();
        self
    }
}

/// On-disk shape: a list of `[[page]]` tables.
#[derive(Deserialize)]
struct PageFile {
    #[serde(default)]
    page: Vec<SearchRecord>,
}

/// Immutable, ordered collection of search records.
#[derive(Debug, Clone, Default)]
pub struct PageIndex {
    records: Vec<SearchRecord>,
}

impl PageIndex {
    /// Build an index from records, rejecting entries with a blank
    /// `title`, `path` or `category`.
    pub fn from_records(records: Vec<SearchRecord>) -> Result<Self> {
        for (position, record) in records.iter().enumerate() {
            let missing = [
                ("title", &record.title),
                ("path", &record.path),
                ("category", &record.category),
            ]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());

            if let Some((field, _)) = missing {
                return Err(Error::InvalidRecord {
                    position,
                    reason: format!("'{field}' must not be empty"),
                });
            }
        }
        Ok(Self { records })
    }

    /// Parse an index from TOML text. `origin` only labels errors.
    pub fn from_toml_str(raw: &str, origin: &str) -> Result<Self> {
        let file: PageFile = toml::from_str(raw).map_err(|source| Error::IndexParse {
            origin: origin.to_string(),
            source,
        })?;
        Self::from_records(file.page)
    }

    /// The index compiled into the binary.
    pub fn builtin() -> Result<Self> {
        Self::from_toml_str(BUILTIN_PAGES, "(built-in)")
    }

    /// Load an index from a TOML file on disk.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path).map_err(|source| Error::IndexRead {
            path: path.to_path_buf(),
            source,
        })?;
        let index = Self::from_toml_str(&raw, &path.display().to_string())?;
        tracing::info!(path = %path.display(), count = index.len(), "Loaded page index");
        Ok(index)
    }

    /// Load from `path` when given, otherwise the built-in index.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Self::builtin(),
        }
    }

    pub fn records(&self) -> &[SearchRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// First record whose path equals `path` exactly.
    pub fn find_by_path(&self, path: &str) -> Option<&SearchRecord> {
        self.records.iter().find(|r| r.path == path)
    }

    /// Category name to record count, alphabetically.
    pub fn categories(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for record in &self.records {
            *counts.entry(record.category.clone()).or_insert(0) += 1;
        }
        counts
    }
}
