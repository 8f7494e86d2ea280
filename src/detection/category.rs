// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Class label to disposal category ("bin") lookup
//!
//! The built-in table covers the COCO-80 vocabulary with Dutch household
//! waste streams. Operators can replace it with a TOML table:
//!
//! ```toml
//! default = "Restafval"
//!
//! [categories]
//! banana = "GFT"
//! "wine glass" = "Glas"
//! ```

use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Category for labels missing from the table
pub const DEFAULT_CATEGORY: &str = "Restafval";

const BUILTIN_TABLE: &[(&str, &str)] = &[
    ("banana", "GFT"),
    ("apple", "GFT"),
    ("orange", "GFT"),
    ("broccoli", "GFT"),
    ("carrot", "GFT"),
    ("sandwich", "GFT"),
    ("hot dog", "GFT"),
    ("pizza", "GFT"),
    ("donut", "GFT"),
    ("cake", "GFT"),
    ("potted plant", "GFT"),
    ("bottle", "PMD"),
    ("fork", "PMD"),
    ("knife", "PMD"),
    ("spoon", "PMD"),
    ("bowl", "PMD"),
    ("wine glass", "Glas"),
    ("vase", "Glas"),
    ("book", "Papier"),
    ("tie", "Textiel"),
    ("handbag", "Textiel"),
    ("backpack", "Textiel"),
    ("cell phone", "Elektronica"),
    ("laptop", "Elektronica"),
    ("mouse", "Elektronica"),
    ("remote", "Elektronica"),
    ("keyboard", "Elektronica"),
    ("tv", "Elektronica"),
    ("microwave", "Elektronica"),
    ("oven", "Elektronica"),
    ("toaster", "Elektronica"),
    ("refrigerator", "Elektronica"),
    ("hair drier", "Elektronica"),
    ("clock", "Elektronica"),
    ("chair", "Grofvuil"),
    ("couch", "Grofvuil"),
    ("bed", "Grofvuil"),
    ("dining table", "Grofvuil"),
    ("bench", "Grofvuil"),
    ("bicycle", "Grofvuil"),
    ("suitcase", "Grofvuil"),
];

#[derive(Debug, Error)]
pub enum CategoryTableError {
    #[error("Failed to read category table {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid category table: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Label '{0}' appears more than once (labels are case-insensitive)")]
    DuplicateLabel(String),

    #[error("Category for label '{0}' is empty")]
    EmptyCategory(String),
}

#[derive(Debug, Deserialize)]
struct CategoryTableFile {
    #[serde(default)]
    default: Option<String>,
    #[serde(default)]
    categories: HashMap<String, String>,
}

/// Read-only label to category table with a default fallback
#[derive(Debug, Clone)]
pub struct CategoryMapper {
    table: HashMap<String, String>,
    default_category: String,
}

impl Default for CategoryMapper {
    fn default() -> Self {
        let table = BUILTIN_TABLE
            .iter()
            .map(|(label, category)| (normalize(label), (*category).to_string()))
            .collect();

        Self {
            table,
            default_category: DEFAULT_CATEGORY.to_string(),
        }
    }
}

impl CategoryMapper {
    /// Build a mapper from explicit pairs; labels are matched case-insensitively
    pub fn from_pairs<I, L, C>(pairs: I, default_category: &str) -> Result<Self, CategoryTableError>
    where
        I: IntoIterator<Item = (L, C)>,
        L: AsRef<str>,
        C: Into<String>,
    {
        let mut table = HashMap::new();
        for (label, category) in pairs {
            let key = normalize(label.as_ref());
            let category = category.into();
            if category.trim().is_empty() {
                return Err(CategoryTableError::EmptyCategory(key));
            }
            if table.insert(key.clone(), category).is_some() {
                return Err(CategoryTableError::DuplicateLabel(key));
            }
        }

        Ok(Self {
            table,
            default_category: default_category.to_string(),
        })
    }

    /// Parse a TOML category table
    pub fn from_toml_str(source: &str) -> Result<Self, CategoryTableError> {
        let file: CategoryTableFile = toml::from_str(source)?;
        let default_category = file
            .default
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_CATEGORY.to_string());

        Self::from_pairs(file.categories, &default_category)
    }

    /// Load a TOML category table from disk
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self, CategoryTableError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| CategoryTableError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml_str(&source)
    }

    /// Resolve a class label to its category; unknown labels get the default
    pub fn map_to_category(&self, label: &str) -> &str {
        self.table
            .get(&normalize(label))
            .map(String::as_str)
            .unwrap_or(&self.default_category)
    }

    pub fn default_category(&self) -> &str {
        &self.default_category
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

fn normalize(label: &str) -> String {
    label.trim().to_lowercase()
}
