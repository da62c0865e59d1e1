pub mod add;
pub mod delete;
pub mod edit;
pub mod export;
pub mod import;
pub mod list;
pub mod show;
pub mod stats;
pub mod study;
pub mod tags;

use flashmind_lib::flashcards::{Card, Tag};

/// JSON view of a card with its tag names resolved
pub fn card_json(card: &Card, tags: &[&Tag]) -> serde_json::Value {
    serde_json::json!({
        "id": card.id,
        "front": card.front,
        "back": card.back,
        "frontImage": card.front_image,
        "backImage": card.back_image,
        "tags": tags.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
        "status": card.class().label(),
        "interval": card.interval,
        "repetitions": card.repetitions,
        "easeFactor": card.ease_factor,
        "nextReviewDate": card.next_review_date.to_rfc3339(),
        "lastReviewDate": card.last_review_date.map(|d| d.to_rfc3339()),
        "createdAt": card.created_at.to_rfc3339(),
        "updatedAt": card.updated_at.to_rfc3339(),
    })
}
