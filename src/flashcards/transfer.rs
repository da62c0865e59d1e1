//! Export bundles and import validation
//!
//! An export is a single pretty-printed JSON document:
//! `{ "cards": [...], "tags": [...], "exportDate": "<RFC 3339>", "version": "1.0" }`.
//! Imports are validated completely before anything is handed to the store,
//! so a rejected file never leaves a partial import behind.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use super::models::{Card, Tag};
use super::storage::FlashcardStorageError;

/// Format version written into every export
pub const EXPORT_VERSION: &str = "1.0";

#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Invalid JSON file: {0}")]
    InvalidJson(#[source] serde_json::Error),

    #[error("Invalid data: cards array missing")]
    MissingCards,

    #[error("Invalid data: tags array missing")]
    MissingTags,

    #[error("Invalid {kind} record at index {index}: {source}")]
    InvalidRecord {
        kind: &'static str,
        index: usize,
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything written by an export
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportBundle {
    pub cards: Vec<Card>,
    pub tags: Vec<Tag>,
    pub export_date: DateTime<Utc>,
    pub version: String,
}

impl ExportBundle {
    pub fn new(cards: Vec<Card>, tags: Vec<Tag>, export_date: DateTime<Utc>) -> Self {
        Self {
            cards,
            tags,
            export_date,
            version: EXPORT_VERSION.to_string(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    /// Write the bundle to `path`
    pub fn write_to(&self, path: &Path) -> Result<(), FlashcardStorageError> {
        fs::write(path, self.to_json()?)?;
        log::info!(
            "Exported {} cards and {} tags to {:?}",
            self.cards.len(),
            self.tags.len(),
            path
        );
        Ok(())
    }

    /// Default file name for an export taken at `date`
    pub fn default_file_name(date: DateTime<Utc>) -> String {
        format!("flashmind-backup-{}.json", date.format("%Y-%m-%d"))
    }
}

/// Validated contents of an import file
#[derive(Debug, Clone)]
pub struct ImportData {
    pub cards: Vec<Card>,
    pub tags: Vec<Tag>,
}

/// Parse and validate an export document.
///
/// `cards` and `tags` must both be present and be arrays; every element must
/// have the persisted record shape. Other top-level fields are ignored.
pub fn parse_import(text: &str) -> Result<ImportData, ImportError> {
    let mut document: Value = serde_json::from_str(text).map_err(ImportError::InvalidJson)?;

    let cards = take_array(&mut document, "cards").ok_or(ImportError::MissingCards)?;
    let tags = take_array(&mut document, "tags").ok_or(ImportError::MissingTags)?;

    Ok(ImportData {
        cards: parse_records(cards, "card")?,
        tags: parse_records(tags, "tag")?,
    })
}

/// Read and validate an import file
pub fn read_import(path: &Path) -> Result<ImportData, ImportError> {
    let text = fs::read_to_string(path)?;
    parse_import(&text)
}

fn take_array(document: &mut Value, key: &str) -> Option<Vec<Value>> {
    match document.get_mut(key).map(Value::take) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn parse_records<T: serde::de::DeserializeOwned>(
    items: Vec<Value>,
    kind: &'static str,
) -> Result<Vec<T>, ImportError> {
    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| {
            serde_json::from_value(item).map_err(|source| ImportError::InvalidRecord {
                kind,
                index,
                source,
            })
        })
        .collect()
}
