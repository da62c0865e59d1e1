//! Storage operations for flashcards
//!
//! Directory structure:
//! ```text
//! {data-dir}/
//! ├── cards.json   # Array of all cards, most recent first
//! └── tags.json    # Array of all tags
//! ```
//!
//! Both collections are loaded when the store is opened and written back on
//! `flush` (and on drop). Writes go through a temp file and a rename so a
//! crash never leaves a half-written collection behind.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::algorithm::compute_next_review;
use super::clock::{Clock, SystemClock};
use super::models::*;
use super::tags::{random_color, search_tags, tags_for_card};
use super::transfer::{ExportBundle, ImportData, ImportError};

#[derive(Error, Debug)]
pub enum FlashcardStorageError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Card not found: {0}")]
    CardNotFound(String),

    #[error("Tag not found: {0}")]
    TagNotFound(String),

    #[error("Invalid card: {0}")]
    InvalidCard(String),

    #[error("Invalid tag: {0}")]
    InvalidTag(String),

    #[error("Corrupt data in {path}: {source}")]
    CorruptData {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Import failed: {0}")]
    Import(#[from] ImportError),
}

pub type Result<T> = std::result::Result<T, FlashcardStorageError>;

/// What to do when a persisted collection can't be parsed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptDataPolicy {
    /// Keep the corrupt file aside and start from an empty collection
    #[default]
    Recover,
    /// Refuse to open the store
    Fail,
}

/// The persistence contract the scheduler and sessions rely on
pub trait CardStore {
    /// All cards in collection order
    fn get_all(&self) -> &[Card];

    fn get(&self, id: &str) -> Option<&Card> {
        self.get_all().iter().find(|card| card.id == id)
    }

    /// Insert a card with scheduling defaults; returns the new id
    fn insert(&mut self, card: NewCard) -> Result<String>;

    /// Merge a partial update. Returns `false` if the id is absent.
    fn update(&mut self, id: &str, update: CardUpdate) -> Result<bool>;

    /// Returns `false` if the id is absent
    fn delete(&mut self, id: &str) -> bool;

    /// Swap the whole collection, e.g. for a bulk import
    fn replace_all(&mut self, cards: Vec<Card>);

    /// Schedule a card after a review and merge the result
    fn review(&mut self, id: &str, rating: Rating) -> Result<Card>;
}

/// JSON-file card and tag store
pub struct FlashcardStore {
    data_dir: PathBuf,
    clock: Box<dyn Clock>,
    cards: Vec<Card>,
    tags: Vec<Tag>,
    cards_dirty: bool,
    tags_dirty: bool,
}

impl FlashcardStore {
    /// Open the store rooted at `data_dir`, creating the directory if needed
    pub fn open(data_dir: PathBuf, clock: Box<dyn Clock>, policy: CorruptDataPolicy) -> Result<Self> {
        fs::create_dir_all(&data_dir)?;

        let cards = load_collection(&data_dir.join(CARDS_FILE), policy, clock.now())?;
        let tags = load_collection(&data_dir.join(TAGS_FILE), policy, clock.now())?;
        log::info!(
            "Opened flashcard store at {:?} ({} cards, {} tags)",
            data_dir,
            cards.len(),
            tags.len()
        );

        Ok(Self {
            data_dir,
            clock,
            cards,
            tags,
            cards_dirty: false,
            tags_dirty: false,
        })
    }

    /// Open with the system clock
    pub fn open_default(data_dir: PathBuf, policy: CorruptDataPolicy) -> Result<Self> {
        Self::open(data_dir, Box::new(SystemClock), policy)
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Write any modified collection to disk
    pub fn flush(&mut self) -> Result<()> {
        if self.cards_dirty {
            write_json(&self.data_dir.join(CARDS_FILE), &self.cards)?;
            self.cards_dirty = false;
        }
        if self.tags_dirty {
            write_json(&self.data_dir.join(TAGS_FILE), &self.tags)?;
            self.tags_dirty = false;
        }
        Ok(())
    }

    pub fn is_dirty(&self) -> bool {
        self.cards_dirty || self.tags_dirty
    }

    // ==================== Card Operations ====================

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    /// Create a new card and return a copy of it
    pub fn add_card(&mut self, card: NewCard) -> Result<Card> {
        let id = self.insert(card)?;
        self.get(&id)
            .cloned()
            .ok_or(FlashcardStorageError::CardNotFound(id))
    }

    /// Update a card, failing if it doesn't exist
    pub fn edit_card(&mut self, id: &str, update: CardUpdate) -> Result<Card> {
        if !self.update(id, update)? {
            return Err(FlashcardStorageError::CardNotFound(id.to_string()));
        }
        self.get(id)
            .cloned()
            .ok_or_else(|| FlashcardStorageError::CardNotFound(id.to_string()))
    }

    // ==================== Tag Operations ====================

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn get_tag(&self, id: &str) -> Option<&Tag> {
        self.tags.iter().find(|tag| tag.id == id)
    }

    /// Create a tag; without a color one is drawn from the palette
    pub fn add_tag(&mut self, name: &str, color: Option<String>) -> Result<Tag> {
        let name = validate_tag_name(name)?;
        let color = color.unwrap_or_else(random_color);
        let tag = Tag::new(name, color, self.clock.now());

        self.tags.push(tag.clone());
        self.tags_dirty = true;
        log::debug!("Created tag {} ({})", tag.name, tag.id);
        Ok(tag)
    }

    pub fn update_tag(&mut self, id: &str, update: TagUpdate) -> Result<Tag> {
        let name = update.name.as_deref().map(validate_tag_name).transpose()?;
        let tag = self
            .tags
            .iter_mut()
            .find(|tag| tag.id == id)
            .ok_or_else(|| FlashcardStorageError::TagNotFound(id.to_string()))?;

        if let Some(name) = name {
            tag.name = name;
        }
        if let Some(color) = update.color {
            tag.color = color;
        }
        self.tags_dirty = true;
        Ok(tag.clone())
    }

    /// Remove a tag. Cards keep the dangling id and show as untagged.
    pub fn delete_tag(&mut self, id: &str) -> bool {
        let before = self.tags.len();
        self.tags.retain(|tag| tag.id != id);
        let removed = self.tags.len() != before;
        self.tags_dirty |= removed;
        removed
    }

    pub fn search_tags(&self, query: &str) -> Vec<&Tag> {
        search_tags(&self.tags, query)
    }

    /// Existing tags attached to a card
    pub fn tags_for_card<'a>(&'a self, card: &'a Card) -> Vec<&'a Tag> {
        tags_for_card(card, &self.tags).collect()
    }

    pub fn replace_tags(&mut self, tags: Vec<Tag>) {
        self.tags = tags;
        self.tags_dirty = true;
    }

    // ==================== Export / Import ====================

    pub fn export(&self) -> ExportBundle {
        ExportBundle::new(self.cards.clone(), self.tags.clone(), self.clock.now())
    }

    /// Replace both collections with imported data and persist immediately
    pub fn import(&mut self, data: ImportData) -> Result<()> {
        log::info!(
            "Importing {} cards and {} tags (replacing {} cards and {} tags)",
            data.cards.len(),
            data.tags.len(),
            self.cards.len(),
            self.tags.len()
        );
        self.replace_all(data.cards);
        self.replace_tags(data.tags);
        self.flush()
    }
}

impl CardStore for FlashcardStore {
    fn get_all(&self) -> &[Card] {
        &self.cards
    }

    fn insert(&mut self, card: NewCard) -> Result<String> {
        let card = NewCard {
            front: validate_side("front", &card.front)?,
            back: validate_side("back", &card.back)?,
            ..card
        };
        let card = Card::new(card, self.clock.now());
        let id = card.id.clone();

        self.cards.insert(0, card);
        self.cards_dirty = true;
        log::debug!("Created card {}", id);
        Ok(id)
    }

    fn update(&mut self, id: &str, mut update: CardUpdate) -> Result<bool> {
        if let Some(front) = update.front.take() {
            update.front = Some(validate_side("front", &front)?);
        }
        if let Some(back) = update.back.take() {
            update.back = Some(validate_side("back", &back)?);
        }

        let now = self.clock.now();
        let Some(card) = self.cards.iter_mut().find(|card| card.id == id) else {
            return Ok(false);
        };
        card.apply(update, now);
        self.cards_dirty = true;
        Ok(true)
    }

    fn delete(&mut self, id: &str) -> bool {
        let before = self.cards.len();
        self.cards.retain(|card| card.id != id);
        let removed = self.cards.len() != before;
        self.cards_dirty |= removed;
        removed
    }

    fn replace_all(&mut self, cards: Vec<Card>) {
        self.cards = cards;
        self.cards_dirty = true;
    }

    fn review(&mut self, id: &str, rating: Rating) -> Result<Card> {
        // One clock sample covers the due date, last review and updated_at
        let now = self.clock.now();
        let card = self
            .cards
            .iter_mut()
            .find(|card| card.id == id)
            .ok_or_else(|| FlashcardStorageError::CardNotFound(id.to_string()))?;

        let update = compute_next_review(&card.scheduling_state(), rating, now);
        card.apply(update.into(), now);
        self.cards_dirty = true;

        log::debug!(
            "Reviewed card {} as {}: interval {}d, repetitions {}, ease {:.2}",
            id,
            rating,
            card.interval,
            card.repetitions,
            card.ease_factor
        );
        Ok(card.clone())
    }
}

impl Drop for FlashcardStore {
    fn drop(&mut self) {
        if let Err(e) = self.flush() {
            log::error!("Failed to flush flashcard store on drop: {}", e);
        }
    }
}

const CARDS_FILE: &str = "cards.json";
const TAGS_FILE: &str = "tags.json";

/// Trim one side of a card, rejecting blank text
fn validate_side(side: &str, text: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(FlashcardStorageError::InvalidCard(format!(
            "{} text must not be empty",
            side
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_tag_name(name: &str) -> Result<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(FlashcardStorageError::InvalidTag(
            "tag name must not be empty".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Read a JSON array from `path`. A missing file is an empty collection.
fn load_collection<T: DeserializeOwned>(
    path: &Path,
    policy: CorruptDataPolicy,
    now: DateTime<Utc>,
) -> Result<Vec<T>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let content = fs::read_to_string(path)?;
    match serde_json::from_str(&content) {
        Ok(items) => Ok(items),
        Err(source) => match policy {
            CorruptDataPolicy::Fail => Err(FlashcardStorageError::CorruptData {
                path: path.to_path_buf(),
                source,
            }),
            CorruptDataPolicy::Recover => {
                let backup = corrupt_backup_path(path, now);
                fs::rename(path, &backup)?;
                log::error!(
                    "Failed to parse {:?}: {}. Moved it to {:?} and starting empty",
                    path,
                    source,
                    backup
                );
                Ok(Vec::new())
            }
        },
    }
}

fn corrupt_backup_path(path: &Path, now: DateTime<Utc>) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(format!(".corrupt-{}", now.timestamp_millis()));
    path.with_file_name(name)
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, serde_json::to_string_pretty(value)?)?;
    fs::rename(&tmp, path)?;
    Ok(())
}
