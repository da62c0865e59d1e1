//! Flashcard and spaced repetition system
//!
//! This module provides:
//! - Card and tag records with the persisted JSON shape
//! - SM-2 spaced repetition algorithm
//! - Due/new/learning/mature selection queries
//! - Study sessions with per-session counters
//! - A file-backed card store with export/import

pub mod algorithm;
pub mod clock;
pub mod models;
pub mod selection;
pub mod session;
pub mod storage;
pub mod tags;
pub mod transfer;

pub use algorithm::{compute_next_review, ReviewUpdate, SchedulingState};
pub use clock::{Clock, FixedClock, SystemClock};
pub use models::*;
pub use selection::{CardQuery, CollectionStats};
pub use session::{SessionError, SessionStats, SessionSummary, StudySession};
pub use storage::{CardStore, CorruptDataPolicy, FlashcardStorageError, FlashcardStore};
pub use transfer::{ExportBundle, ImportData, ImportError};
