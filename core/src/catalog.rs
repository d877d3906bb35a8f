//! The server's syntax-highlighting language catalog (`/languages.json`).
//!
//! # Design
//! A catalog is parsed and checked as a whole before anyone sees it, so a
//! `LanguageCatalog` value is always complete. The client swaps in a new one
//! only after parsing succeeds.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::GhostbinError;

/// A single highlightable language.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Language {
    pub id: String,
    pub name: String,
    /// Alternate identifiers the server also accepts for this language.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alt_ids: Vec<String>,
}

/// A display group of languages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Category {
    pub name: String,
    pub languages: Vec<Language>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct LanguageCatalog(Vec<Category>);

impl LanguageCatalog {
    /// Parse and check a `/languages.json` document.
    pub fn from_json(body: &str) -> Result<Self, GhostbinError> {
        let categories: Vec<Category> = serde_json::from_str(body)
            .map_err(|e| GhostbinError::Protocol(format!("malformed language catalog: {e}")))?;
        Self::new(categories)
    }

    pub fn new(categories: Vec<Category>) -> Result<Self, GhostbinError> {
        for (index, category) in categories.iter().enumerate() {
            if category.name.is_empty() {
                return Err(GhostbinError::Protocol(format!(
                    "language category #{index} has no name"
                )));
            }
            if category.languages.is_empty() {
                return Err(GhostbinError::Protocol(format!(
                    "language category {:?} has no languages",
                    category.name
                )));
            }
            if category.languages.iter().any(|lang| lang.id.is_empty()) {
                return Err(GhostbinError::Protocol(format!(
                    "language category {:?} has a language without an id",
                    category.name
                )));
            }
        }
        Ok(Self(categories))
    }

    pub fn categories(&self) -> &[Category] {
        &self.0
    }

    /// Every accepted `lang` value, ids and alt ids, in catalog order.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.0
            .iter()
            .flat_map(|category| &category.languages)
            .flat_map(|lang| std::iter::once(&lang.id).chain(&lang.alt_ids))
            .map(String::as_str)
    }

    pub fn id_set(&self) -> BTreeSet<String> {
        self.ids().map(str::to_string).collect()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ids().any(|candidate| candidate == id)
    }
}
