//! Data models for the flashcard system

use std::fmt;
use std::str::FromStr;

use chrono::serde::{ts_milliseconds, ts_milliseconds_option};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::algorithm::{ReviewUpdate, SchedulingState, DEFAULT_EASE_FACTOR};

/// Repetition count at which a card counts as mature
pub const MATURE_REPETITIONS: u32 = 3;

/// A flashcard with question (front) and answer (back) plus its scheduling state
///
/// Field names and timestamp encoding (milliseconds since the Unix epoch)
/// match the export format so records round-trip unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub front: String,
    pub back: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub front_image: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub back_image: Option<String>,
    /// Tag ids; may reference tags that no longer exist
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
    /// Days until the next review (0 while unreviewed)
    pub interval: u32,
    /// Consecutive successful reviews since the last lapse
    pub repetitions: u32,
    pub ease_factor: f64,
    #[serde(with = "ts_milliseconds")]
    pub next_review_date: DateTime<Utc>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "ts_milliseconds_option"
    )]
    pub last_review_date: Option<DateTime<Utc>>,
    pub is_new: bool,
}

impl Card {
    /// Build a fresh, unreviewed card. Due immediately.
    pub fn new(content: NewCard, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            front: content.front,
            back: content.back,
            front_image: content.front_image,
            back_image: content.back_image,
            tags: content.tags,
            created_at: now,
            updated_at: now,
            interval: 0,
            repetitions: 0,
            ease_factor: DEFAULT_EASE_FACTOR,
            next_review_date: now,
            last_review_date: None,
            is_new: true,
        }
    }

    /// The fields the scheduler reads
    pub fn scheduling_state(&self) -> SchedulingState {
        SchedulingState {
            interval: self.interval,
            repetitions: self.repetitions,
            ease_factor: self.ease_factor,
        }
    }

    /// Check if the card is due for review at `now`
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_date <= now
    }

    pub fn class(&self) -> CardClass {
        if self.is_new {
            CardClass::New
        } else if self.repetitions >= MATURE_REPETITIONS {
            CardClass::Mature
        } else {
            CardClass::Learning
        }
    }

    pub fn has_tag(&self, tag_id: &str) -> bool {
        self.tags.iter().any(|t| t == tag_id)
    }

    /// Case-insensitive substring match on front or back.
    /// `needle` must already be lowercase.
    pub fn matches_text(&self, needle: &str) -> bool {
        self.front.to_lowercase().contains(needle) || self.back.to_lowercase().contains(needle)
    }

    /// Merge a partial update and stamp `updated_at`
    pub fn apply(&mut self, update: CardUpdate, now: DateTime<Utc>) {
        if let Some(front) = update.front {
            self.front = front;
        }
        if let Some(back) = update.back {
            self.back = back;
        }
        if let Some(front_image) = update.front_image {
            self.front_image = front_image;
        }
        if let Some(back_image) = update.back_image {
            self.back_image = back_image;
        }
        if let Some(tags) = update.tags {
            self.tags = tags;
        }
        if let Some(interval) = update.interval {
            self.interval = interval;
        }
        if let Some(repetitions) = update.repetitions {
            self.repetitions = repetitions;
        }
        if let Some(ease_factor) = update.ease_factor {
            self.ease_factor = ease_factor;
        }
        if let Some(next_review_date) = update.next_review_date {
            self.next_review_date = next_review_date;
        }
        if let Some(last_review_date) = update.last_review_date {
            self.last_review_date = last_review_date;
        }
        if let Some(is_new) = update.is_new {
            self.is_new = is_new;
        }
        self.updated_at = now;
    }
}

/// Content for a card about to be inserted; the store fills in id,
/// timestamps and scheduling defaults.
#[derive(Debug, Clone, Default)]
pub struct NewCard {
    pub front: String,
    pub back: String,
    pub front_image: Option<String>,
    pub back_image: Option<String>,
    pub tags: Vec<String>,
}

impl NewCard {
    pub fn new(front: impl Into<String>, back: impl Into<String>) -> Self {
        Self {
            front: front.into(),
            back: back.into(),
            ..Default::default()
        }
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }
}

/// Partial card update; `None` leaves a field untouched.
/// Image and last-review fields use a nested `Option` so they can be cleared.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CardUpdate {
    pub front: Option<String>,
    pub back: Option<String>,
    pub front_image: Option<Option<String>>,
    pub back_image: Option<Option<String>>,
    pub tags: Option<Vec<String>>,
    pub interval: Option<u32>,
    pub repetitions: Option<u32>,
    pub ease_factor: Option<f64>,
    pub next_review_date: Option<DateTime<Utc>>,
    pub last_review_date: Option<Option<DateTime<Utc>>>,
    pub is_new: Option<bool>,
}

impl From<ReviewUpdate> for CardUpdate {
    fn from(review: ReviewUpdate) -> Self {
        Self {
            interval: Some(review.interval),
            repetitions: Some(review.repetitions),
            ease_factor: Some(review.ease_factor),
            next_review_date: Some(review.next_review_date),
            last_review_date: Some(Some(review.last_review_date)),
            is_new: Some(review.is_new),
            ..Default::default()
        }
    }
}

/// Classification tier of a card; every card is exactly one of these
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CardClass {
    /// Never reviewed
    New,
    /// Reviewed, fewer than three consecutive successes
    Learning,
    /// Three or more consecutive successes
    Mature,
}

impl CardClass {
    pub fn label(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Mature => "mature",
        }
    }
}

/// Self-assessed recall quality, ordered from worst to best
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    pub const ALL: [Rating; 4] = [Rating::Again, Rating::Hard, Rating::Good, Rating::Easy];

    /// SM-2 quality for this rating (0-5 scale)
    pub fn quality(&self) -> u8 {
        match self {
            Self::Again => 0,
            Self::Hard => 3,
            Self::Good => 4,
            Self::Easy => 5,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Again => "Again",
            Self::Hard => "Hard",
            Self::Good => "Good",
            Self::Easy => "Easy",
        }
    }

    /// Keyboard shortcut (1-4) used by the study prompt
    pub fn key(&self) -> char {
        match self {
            Self::Again => '1',
            Self::Hard => '2',
            Self::Good => '3',
            Self::Easy => '4',
        }
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Invalid rating '{0}' (expected again, hard, good, easy or 1-4)")]
pub struct ParseRatingError(pub String);

impl FromStr for Rating {
    type Err = ParseRatingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1" | "again" => Ok(Self::Again),
            "2" | "hard" => Ok(Self::Hard),
            "3" | "good" => Ok(Self::Good),
            "4" | "easy" => Ok(Self::Easy),
            other => Err(ParseRatingError(other.to_string())),
        }
    }
}

/// A label for organizing cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: String,
    pub name: String,
    pub color: String,
    #[serde(with = "ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Tag {
    pub fn new(name: String, color: String, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name,
            color,
            created_at: now,
        }
    }
}

/// Partial tag update
#[derive(Debug, Clone, Default)]
pub struct TagUpdate {
    pub name: Option<String>,
    pub color: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_time() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_123).unwrap()
    }

    #[test]
    fn test_new_card_defaults() {
        let now = sample_time();
        let card = Card::new(NewCard::new("Front", "Back"), now);

        assert_eq!(card.interval, 0);
        assert_eq!(card.repetitions, 0);
        assert_eq!(card.ease_factor, 2.5);
        assert_eq!(card.next_review_date, now);
        assert_eq!(card.created_at, now);
        assert_eq!(card.updated_at, now);
        assert!(card.is_new);
        assert!(card.last_review_date.is_none());
        assert_eq!(card.class(), CardClass::New);
        assert!(card.is_due(now));
    }

    #[test]
    fn test_card_serializes_with_persisted_field_names() {
        let card = Card::new(NewCard::new("Q", "A"), sample_time());
        let value = serde_json::to_value(&card).unwrap();

        assert_eq!(value["createdAt"], 1_700_000_000_123i64);
        assert_eq!(value["nextReviewDate"], 1_700_000_000_123i64);
        assert_eq!(value["easeFactor"], 2.5);
        assert_eq!(value["isNew"], true);
        assert!(value.get("lastReviewDate").is_none());
        assert!(value.get("frontImage").is_none());
    }

    #[test]
    fn test_card_parses_optional_fields() {
        let json = r#"{
            "id": "abc", "front": "F", "back": "B", "backImage": "data:image/png;base64,AAAA",
            "tags": ["t1"], "createdAt": 1000, "updatedAt": 2000, "interval": 6,
            "repetitions": 2, "easeFactor": 2.36, "nextReviewDate": 5000,
            "lastReviewDate": 4000, "isNew": false
        }"#;
        let card: Card = serde_json::from_str(json).unwrap();

        assert_eq!(card.back_image.as_deref(), Some("data:image/png;base64,AAAA"));
        assert!(card.front_image.is_none());
        assert_eq!(card.last_review_date.unwrap().timestamp_millis(), 4000);
        assert_eq!(card.class(), CardClass::Learning);
    }

    #[test]
    fn test_classification_partition() {
        let mut card = Card::new(NewCard::new("Q", "A"), sample_time());
        assert_eq!(card.class(), CardClass::New);

        card.is_new = false;
        for reps in 0..3 {
            card.repetitions = reps;
            assert_eq!(card.class(), CardClass::Learning);
        }
        card.repetitions = 3;
        assert_eq!(card.class(), CardClass::Mature);
        card.repetitions = 40;
        assert_eq!(card.class(), CardClass::Mature);
    }

    #[test]
    fn test_apply_stamps_updated_at() {
        let created = sample_time();
        let later = created + chrono::Duration::minutes(5);
        let mut card = Card::new(NewCard::new("Q", "A"), created);

        card.apply(
            CardUpdate {
                back: Some("Answer".to_string()),
                front_image: Some(Some("img".to_string())),
                ..Default::default()
            },
            later,
        );

        assert_eq!(card.front, "Q");
        assert_eq!(card.back, "Answer");
        assert_eq!(card.front_image.as_deref(), Some("img"));
        assert_eq!(card.updated_at, later);
        assert_eq!(card.created_at, created);
    }

    #[test]
    fn test_matches_text_case_insensitive() {
        let card = Card::new(NewCard::new("Photosynthesis", "Light to SUGAR"), sample_time());
        assert!(card.matches_text("synth"));
        assert!(card.matches_text("sugar"));
        assert!(!card.matches_text("mitochondria"));
    }

    #[test]
    fn test_parse_rating() {
        assert_eq!("again".parse::<Rating>().unwrap(), Rating::Again);
        assert_eq!(" Easy ".parse::<Rating>().unwrap(), Rating::Easy);
        assert_eq!("2".parse::<Rating>().unwrap(), Rating::Hard);
        assert_eq!("3".parse::<Rating>().unwrap(), Rating::Good);
        assert!("5".parse::<Rating>().is_err());
        assert!("meh".parse::<Rating>().is_err());
    }

    #[test]
    fn test_rating_order_and_quality() {
        assert!(Rating::Again < Rating::Hard);
        assert!(Rating::Hard < Rating::Good);
        assert!(Rating::Good < Rating::Easy);
        let qualities: Vec<u8> = Rating::ALL.iter().map(|r| r.quality()).collect();
        assert_eq!(qualities, vec![0, 3, 4, 5]);
    }
}
