//! FlashMind: a personal flashcard study tool with SM-2 spaced repetition.
//!
//! The library exposes the card/tag store, the scheduler, selection queries
//! and session orchestration. The `flashmind-cli` binary is a thin front end
//! over it.

pub mod config;
pub mod flashcards;
