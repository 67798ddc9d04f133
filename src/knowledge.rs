//! Knowledge store: the ordered catalog of canned SmartServe questions and answers.
//!
//! The default catalog is compiled into the binary from `data/catalog.json` and
//! parsed once at startup. An alternate catalog with the same shape can be
//! loaded from disk with [`KnowledgeStore::from_path`].

use crate::error::{AssistantError, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Embedded default catalog
const BUILTIN_CATALOG: &str = include_str!("../data/catalog.json");

// ============================================================================
// Catalog Types
// ============================================================================

/// On-disk catalog format
#[derive(Debug, Deserialize)]
pub struct Catalog {
    /// Catalog format version
    #[serde(default)]
    pub version: String,

    /// Entries in match order
    pub entries: Vec<KnowledgeEntry>,

    /// Short list of questions offered to new users
    #[serde(default)]
    pub suggested: Vec<String>,
}

/// A single keyword-set/question/answer record
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct KnowledgeEntry {
    /// Topic group (features, pricing, ...)
    #[serde(default)]
    pub topic: String,

    /// Lowercase trigger keywords and phrases
    #[serde(default)]
    pub keywords: Vec<String>,

    /// Canonical question text
    pub question: String,

    /// Canned answer returned on a match
    pub answer: String,
}

// ============================================================================
// Store
// ============================================================================

/// Immutable, ordered catalog shared by reference with the matcher.
#[derive(Debug, Clone)]
pub struct KnowledgeStore {
    entries: Vec<KnowledgeEntry>,
    suggested: Vec<String>,
}

impl KnowledgeStore {
    /// Parse the catalog compiled into the binary.
    pub fn builtin() -> Result<Self> {
        let store = Self::from_json(BUILTIN_CATALOG)?;
        debug!("Loaded built-in catalog with {} entries", store.len());
        Ok(store)
    }

    /// Load an alternate catalog file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| AssistantError::CatalogRead {
            path: path.to_path_buf(),
            source: e,
        })?;
        let store = Self::from_json(&content)?;
        info!("Loaded {} entries from {}", store.len(), path.display());
        Ok(store)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(content)
            .map_err(|e| AssistantError::CatalogParse(e.to_string()))?;
        Self::from_catalog(catalog)
    }

    /// Validate a parsed catalog and normalize its keywords to lowercase.
    pub fn from_catalog(catalog: Catalog) -> Result<Self> {
        if catalog.entries.is_empty() {
            return Err(AssistantError::CatalogInvalid(
                "catalog has no entries".to_string(),
            ));
        }

        let mut entries = catalog.entries;
        for (idx, entry) in entries.iter_mut().enumerate() {
            if entry.question.trim().is_empty() {
                return Err(AssistantError::CatalogInvalid(format!(
                    "entry {} has an empty question",
                    idx
                )));
            }
            if entry.answer.trim().is_empty() {
                return Err(AssistantError::CatalogInvalid(format!(
                    "entry {} ('{}') has an empty answer",
                    idx, entry.question
                )));
            }
            for keyword in entry.keywords.iter_mut() {
                *keyword = keyword.to_lowercase();
            }
        }

        Ok(Self {
            entries,
            suggested: catalog.suggested,
        })
    }

    /// All entries, in catalog order.
    pub fn entries(&self) -> &[KnowledgeEntry] {
        &self.entries
    }

    pub fn suggested_questions(&self) -> &[String] {
        &self.suggested
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Distinct topic names in first-seen order.
    pub fn topics(&self) -> Vec<&str> {
        let mut topics: Vec<&str> = Vec::new();
        for entry in &self.entries {
            if !topics.contains(&entry.topic.as_str()) {
                topics.push(&entry.topic);
            }
        }
        topics
    }
}

// ============================================================================
// Tests
// ============================================================================
