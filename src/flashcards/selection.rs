//! Selection queries over a card collection
//!
//! All queries are order-preserving filters: they never sort or dedup, and
//! "due" is evaluated against the instant passed in rather than stored.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::models::{Card, CardClass};

/// A composable card filter. Every criterion left unset matches all cards.
///
/// ```
/// # use flashmind_lib::flashcards::{Card, CardQuery};
/// # let cards: Vec<Card> = Vec::new();
/// # let now = chrono::Utc::now();
/// let query = CardQuery::new()
///     .due(now)
///     .tag(Some("french"));
/// let due_french: Vec<_> = query.filter(&cards).collect();
/// # assert!(due_french.is_empty());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CardQuery {
    due_at: Option<DateTime<Utc>>,
    class: Option<CardClass>,
    tag: Option<String>,
    /// Lowercased search needle; blank searches are dropped
    text: Option<String>,
}

impl CardQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only cards whose next review is at or before `now`
    pub fn due(mut self, now: DateTime<Utc>) -> Self {
        self.due_at = Some(now);
        self
    }

    pub fn class(mut self, class: CardClass) -> Self {
        self.class = Some(class);
        self
    }

    /// Only cards carrying the tag id; `None` leaves the query unfiltered
    pub fn tag(mut self, tag_id: Option<&str>) -> Self {
        self.tag = tag_id.map(str::to_string);
        self
    }

    /// Case-insensitive substring match on front or back
    pub fn search(mut self, text: &str) -> Self {
        self.text = if text.trim().is_empty() {
            None
        } else {
            Some(text.to_lowercase())
        };
        self
    }

    pub fn matches(&self, card: &Card) -> bool {
        if let Some(now) = self.due_at {
            if !card.is_due(now) {
                return false;
            }
        }
        if let Some(class) = self.class {
            if card.class() != class {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !card.has_tag(tag) {
                return false;
            }
        }
        if let Some(text) = &self.text {
            if !card.matches_text(text) {
                return false;
            }
        }
        true
    }

    /// Lazily filter `cards`. The iterator is `Clone`, so it can be restarted.
    pub fn filter<'a>(&'a self, cards: &'a [Card]) -> impl Iterator<Item = &'a Card> + Clone + 'a {
        cards.iter().filter(move |card| self.matches(card))
    }

    /// Like [`CardQuery::filter`] but takes ownership of the query
    pub fn into_filter(self, cards: &[Card]) -> impl Iterator<Item = &Card> + Clone + '_ {
        cards.iter().filter(move |card| self.matches(card))
    }

    pub fn count(&self, cards: &[Card]) -> usize {
        self.filter(cards).count()
    }
}

/// Cards due at `now`, optionally restricted to a tag
pub fn due_cards<'a>(
    cards: &'a [Card],
    now: DateTime<Utc>,
    tag_id: Option<&str>,
) -> impl Iterator<Item = &'a Card> + Clone + 'a {
    CardQuery::new().due(now).tag(tag_id).into_filter(cards)
}

pub fn new_cards<'a>(cards: &'a [Card], tag_id: Option<&str>) -> impl Iterator<Item = &'a Card> + Clone + 'a {
    CardQuery::new().class(CardClass::New).tag(tag_id).into_filter(cards)
}

pub fn learning_cards<'a>(cards: &'a [Card], tag_id: Option<&str>) -> impl Iterator<Item = &'a Card> + Clone + 'a {
    CardQuery::new().class(CardClass::Learning).tag(tag_id).into_filter(cards)
}

/// Cards with three or more consecutive successes. A record still flagged
/// `is_new` counts as new here even if its repetition count says otherwise,
/// so the new, learning and mature queries never overlap.
pub fn mature_cards<'a>(cards: &'a [Card], tag_id: Option<&str>) -> impl Iterator<Item = &'a Card> + Clone + 'a {
    CardQuery::new().class(CardClass::Mature).tag(tag_id).into_filter(cards)
}

pub fn cards_by_tag<'a>(cards: &'a [Card], tag_id: &str) -> impl Iterator<Item = &'a Card> + Clone + 'a {
    CardQuery::new().tag(Some(tag_id)).into_filter(cards)
}

/// Text search; a blank query returns every card (within the tag filter)
pub fn search_cards<'a>(
    cards: &'a [Card],
    query: &str,
    tag_id: Option<&str>,
) -> impl Iterator<Item = &'a Card> + Clone + 'a {
    CardQuery::new().search(query).tag(tag_id).into_filter(cards)
}

/// Counts for the dashboard
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionStats {
    pub total_cards: usize,
    pub new_cards: usize,
    pub learning_cards: usize,
    pub mature_cards: usize,
    pub due_cards: usize,
    /// Share of mature cards, rounded to the nearest percent
    pub mastery_percentage: u32,
}

impl CollectionStats {
    pub fn compute(cards: &[Card], tag_id: Option<&str>, now: DateTime<Utc>) -> Self {
        let scope = CardQuery::new().tag(tag_id);
        let mut stats = Self::default();

        for card in scope.filter(cards) {
            stats.total_cards += 1;
            match card.class() {
                CardClass::New => stats.new_cards += 1,
                CardClass::Learning => stats.learning_cards += 1,
                CardClass::Mature => stats.mature_cards += 1,
            }
            if card.is_due(now) {
                stats.due_cards += 1;
            }
        }

        stats.mastery_percentage = percentage(stats.mature_cards, stats.total_cards);
        stats
    }
}

/// `part / whole` as a rounded percentage; 0 when `whole` is 0
pub(crate) fn percentage(part: usize, whole: usize) -> u32 {
    if whole == 0 {
        return 0;
    }
    ((part as f64 / whole as f64) * 100.0).round() as u32
}
