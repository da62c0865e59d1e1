//! Study sessions
//!
//! A session is a fixed queue of card ids built up front: due cards first,
//! then new cards, capped at the session size. Each card is shown front
//! first, flipped, rated, and then the session moves on.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::models::{Card, Rating};
use super::selection::{due_cards, new_cards, percentage};
use super::storage::{CardStore, FlashcardStorageError};

/// Default maximum number of cards in one session
pub const DEFAULT_SESSION_SIZE: usize = 50;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Reveal the back of the card before rating it")]
    NotFlipped,

    #[error("The session has no cards left")]
    Finished,

    #[error("Card {0} is no longer in the store; skipped")]
    CardNotFound(String),

    #[error(transparent)]
    Storage(#[from] FlashcardStorageError),
}

/// Per-rating counters for one session
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub again: u32,
    pub hard: u32,
    pub good: u32,
    pub easy: u32,
}

impl SessionStats {
    pub fn record(&mut self, rating: Rating) {
        match rating {
            Rating::Again => self.again += 1,
            Rating::Hard => self.hard += 1,
            Rating::Good => self.good += 1,
            Rating::Easy => self.easy += 1,
        }
    }

    pub fn count(&self, rating: Rating) -> u32 {
        match rating {
            Rating::Again => self.again,
            Rating::Hard => self.hard,
            Rating::Good => self.good,
            Rating::Easy => self.easy,
        }
    }

    pub fn total_reviewed(&self) -> u32 {
        self.again + self.hard + self.good + self.easy
    }

    /// Share of good and easy ratings, rounded to the nearest percent.
    /// 0 when nothing was reviewed.
    pub fn accuracy(&self) -> u32 {
        percentage(
            (self.good + self.easy) as usize,
            self.total_reviewed() as usize,
        )
    }
}

/// End-of-session report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSummary {
    pub stats: SessionStats,
    pub total_reviewed: u32,
    pub accuracy: u32,
}

#[derive(Debug, Clone)]
pub struct StudySession {
    queue: Vec<String>,
    position: usize,
    flipped: bool,
    stats: SessionStats,
}

impl StudySession {
    /// Queue due cards, then new cards, up to `limit`.
    ///
    /// A freshly created card is both due and new; it is queued only once,
    /// in the due section.
    pub fn build(cards: &[Card], tag_id: Option<&str>, now: DateTime<Utc>, limit: usize) -> Self {
        let mut seen = HashSet::new();
        let queue: Vec<String> = due_cards(cards, now, tag_id)
            .chain(new_cards(cards, tag_id))
            .filter(|card| seen.insert(card.id.as_str()))
            .take(limit)
            .map(|card| card.id.clone())
            .collect();

        log::info!("Built study session with {} cards", queue.len());
        Self::from_queue(queue)
    }

    /// A session over an explicit list of card ids
    pub fn from_queue(queue: Vec<String>) -> Self {
        Self {
            queue,
            position: 0,
            flipped: false,
            stats: SessionStats::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Zero-based index of the current card
    pub fn position(&self) -> usize {
        self.position
    }

    /// Id of the card being studied, if any remain
    pub fn current(&self) -> Option<&str> {
        self.queue.get(self.position).map(String::as_str)
    }

    pub fn is_finished(&self) -> bool {
        self.position >= self.queue.len()
    }

    /// Toggle between front and back
    pub fn flip(&mut self) {
        if !self.is_finished() {
            self.flipped = !self.flipped;
        }
    }

    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Percent of the queue already completed
    pub fn progress(&self) -> u32 {
        percentage(self.position.min(self.queue.len()), self.queue.len())
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Rate the current card, schedule it through the store and advance.
    pub fn rate<S: CardStore + ?Sized>(&mut self, store: &mut S, rating: Rating) -> Result<Card, SessionError> {
        let id = self.current().ok_or(SessionError::Finished)?.to_string();
        if !self.flipped {
            return Err(SessionError::NotFlipped);
        }

        let result = match store.review(&id, rating) {
            Ok(card) => {
                self.stats.record(rating);
                Ok(card)
            }
            Err(FlashcardStorageError::CardNotFound(_)) => {
                log::warn!("Card {} vanished mid-session", id);
                Err(SessionError::CardNotFound(id))
            }
            // Storage failures leave the session on the same card
            Err(e) => return Err(e.into()),
        };

        self.advance();
        result
    }

    /// Move past the current card without rating it
    pub fn skip(&mut self) {
        if !self.is_finished() {
            self.advance();
        }
    }

    fn advance(&mut self) {
        self.position += 1;
        self.flipped = false;
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            stats: self.stats,
            total_reviewed: self.stats.total_reviewed(),
            accuracy: self.stats.accuracy(),
        }
    }
}
