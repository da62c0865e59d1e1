//! Tag palette and lookups

use rand::seq::SliceRandom;

use super::models::{Card, Tag};

/// Colors offered for new tags
pub const TAG_COLORS: [&str; 12] = [
    "#ef4444", // red
    "#f97316", // orange
    "#f59e0b", // amber
    "#84cc16", // lime
    "#10b981", // emerald
    "#06b6d4", // cyan
    "#3b82f6", // blue
    "#6366f1", // indigo
    "#8b5cf6", // violet
    "#d946ef", // fuchsia
    "#f43f5e", // rose
    "#64748b", // slate
];

/// Pick a palette color at random
pub fn random_color() -> String {
    TAG_COLORS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(TAG_COLORS[0])
        .to_string()
}

/// Resolve a card's tag ids against the known tags.
/// Ids of deleted tags are skipped; a card with none left is untagged.
pub fn tags_for_card<'a>(card: &'a Card, tags: &'a [Tag]) -> impl Iterator<Item = &'a Tag> + 'a {
    card.tags
        .iter()
        .filter_map(move |id| tags.iter().find(|tag| &tag.id == id))
}

/// Case-insensitive name search; a blank query returns every tag
pub fn search_tags<'a>(tags: &'a [Tag], query: &str) -> Vec<&'a Tag> {
    if query.trim().is_empty() {
        return tags.iter().collect();
    }
    let needle = query.to_lowercase();
    tags.iter()
        .filter(|tag| tag.name.to_lowercase().contains(&needle))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flashcards::models::NewCard;
    use chrono::Utc;

    #[test]
    fn test_random_color_from_palette() {
        for _ in 0..50 {
            let color = random_color();
            assert!(TAG_COLORS.contains(&color.as_str()));
        }
    }

    #[test]
    fn test_deleted_tags_resolve_to_nothing() {
        let now = Utc::now();
        let kept = Tag::new("Kept".to_string(), TAG_COLORS[0].to_string(), now);
        let card = Card::new(
            NewCard::new("Q", "A").with_tags(vec!["gone".to_string(), kept.id.clone()]),
            now,
        );
        let tags = vec![kept.clone()];

        let resolved: Vec<&str> = tags_for_card(&card, &tags).map(|t| t.name.as_str()).collect();
        assert_eq!(resolved, vec!["Kept"]);

        let orphan = Card::new(NewCard::new("Q", "A").with_tags(vec!["gone".to_string()]), now);
        assert_eq!(tags_for_card(&orphan, &tags).count(), 0);
    }

    #[test]
    fn test_search_tags() {
        let now = Utc::now();
        let tags = vec![
            Tag::new("Spanish".to_string(), TAG_COLORS[1].to_string(), now),
            Tag::new("Biology".to_string(), TAG_COLORS[2].to_string(), now),
        ];

        assert_eq!(search_tags(&tags, "span").len(), 1);
        assert_eq!(search_tags(&tags, "BIO")[0].name, "Biology");
        assert_eq!(search_tags(&tags, " ").len(), 2);
        assert!(search_tags(&tags, "chem").is_empty());
    }
}
