use chrono::{DateTime, Utc};

use flashmind_lib::flashcards::algorithm::format_interval;
use flashmind_lib::flashcards::{Card, CardClass, Rating, Tag};

/// ANSI color codes
#[allow(dead_code)]
pub struct Color;

#[allow(dead_code)]
impl Color {
    pub const RESET: &str = "\x1b[0m";
    pub const BOLD: &str = "\x1b[1m";
    pub const DIM: &str = "\x1b[2m";
    pub const RED: &str = "\x1b[31m";
    pub const GREEN: &str = "\x1b[32m";
    pub const YELLOW: &str = "\x1b[33m";
    pub const BLUE: &str = "\x1b[34m";
    pub const MAGENTA: &str = "\x1b[35m";
    pub const CYAN: &str = "\x1b[36m";
    pub const GRAY: &str = "\x1b[90m";
}

/// Wrap `text` in an ANSI color when colors are enabled
pub fn paint(text: &str, color: &str, use_color: bool) -> String {
    if use_color {
        format!("{}{}{}", color, text, Color::RESET)
    } else {
        text.to_string()
    }
}

pub fn rating_color(rating: Rating) -> &'static str {
    match rating {
        Rating::Again => Color::RED,
        Rating::Hard => Color::YELLOW,
        Rating::Good => Color::GREEN,
        Rating::Easy => Color::MAGENTA,
    }
}

pub fn class_color(class: CardClass) -> &'static str {
    match class {
        CardClass::New => Color::GREEN,
        CardClass::Learning => Color::YELLOW,
        CardClass::Mature => Color::MAGENTA,
    }
}

/// `#name` badges for the tags that still exist
pub fn tag_badges(tags: &[&Tag], use_color: bool) -> String {
    tags.iter()
        .map(|tag| paint(&format!("#{}", tag.name), Color::CYAN, use_color))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Relative due time: "due now", "due in 3d", "overdue 2d"
pub fn due_label(card: &Card, now: DateTime<Utc>) -> String {
    let days = (card.next_review_date - now).num_days();
    if card.is_due(now) {
        if days <= -1 {
            format!("overdue {}", format_interval(u32::try_from(days.unsigned_abs()).unwrap_or(u32::MAX)))
        } else {
            "due now".to_string()
        }
    } else {
        format!("due in {}", format_interval(u32::try_from(days.max(1)).unwrap_or(u32::MAX)))
    }
}

/// First line of text, cut to `max` characters
pub fn truncate(text: &str, max: usize) -> String {
    let line = text.lines().next().unwrap_or("");
    if line.chars().count() <= max {
        line.to_string()
    } else {
        let cut: String = line.chars().take(max.saturating_sub(1)).collect();
        format!("{}…", cut)
    }
}

/// First eight characters of an id, enough to pass back as a prefix
pub fn short_id(id: &str) -> String {
    id.chars().take(8).collect()
}

/// One-line listing of a card
pub fn render_card_line(card: &Card, tags: &[&Tag], now: DateTime<Utc>, use_color: bool) -> String {
    let class = card.class();
    let mut line = format!(
        "{}  {:<40} {:<9} {}",
        paint(&short_id(&card.id), Color::GRAY, use_color),
        truncate(&card.front, 40),
        paint(class.label(), class_color(class), use_color),
        paint(&due_label(card, now), Color::DIM, use_color),
    );
    if !tags.is_empty() {
        line.push_str("  ");
        line.push_str(&tag_badges(tags, use_color));
    }
    line
}

/// Full detail view of a card
pub fn render_card_detail(card: &Card, tags: &[&Tag], now: DateTime<Utc>, use_color: bool) -> String {
    let mut lines = vec![
        paint(&card.front, Color::BOLD, use_color),
        paint(&"\u{2500}".repeat(40), Color::GRAY, use_color),
        card.back.clone(),
        String::new(),
    ];

    if card.front_image.is_some() || card.back_image.is_some() {
        let sides: Vec<&str> = [("front", &card.front_image), ("back", &card.back_image)]
            .iter()
            .filter(|(_, image)| image.is_some())
            .map(|(side, _)| *side)
            .collect();
        lines.push(format!("Images:   {}", sides.join(", ")));
    }
    if !tags.is_empty() {
        lines.push(format!("Tags:     {}", tag_badges(tags, use_color)));
    }
    lines.push(format!("Status:   {} ({})", card.class().label(), due_label(card, now)));
    lines.push(format!(
        "Schedule: interval {}, {} repetitions, ease {:.2}",
        format_interval(card.interval),
        card.repetitions,
        card.ease_factor
    ));
    if let Some(last) = card.last_review_date {
        lines.push(format!("Reviewed: {}", last.format("%Y-%m-%d %H:%M UTC")));
    }
    lines.push(format!("Created:  {}", card.created_at.format("%Y-%m-%d %H:%M UTC")));
    lines.push(paint(&format!("ID:       {}", card.id), Color::GRAY, use_color));

    lines.join("\n")
}

/// Horizontal bar for dashboard percentages
pub fn render_bar(percent: u32, width: usize, color: &str, use_color: bool) -> String {
    let filled = (percent.min(100) as usize * width + 50) / 100;
    format!(
        "{}{}",
        paint(&"\u{2588}".repeat(filled), color, use_color),
        paint(&"\u{2591}".repeat(width - filled), Color::GRAY, use_color)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use flashmind_lib::flashcards::NewCard;

    fn now() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("first line\nsecond", 20), "first line");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
    }

    #[test]
    fn test_due_label() {
        let mut card = Card::new(NewCard::new("Q", "A"), now());
        assert_eq!(due_label(&card, now()), "due now");

        card.next_review_date = now() + Duration::days(6);
        assert_eq!(due_label(&card, now()), "due in 6d");

        card.next_review_date = now() - Duration::days(14);
        assert_eq!(due_label(&card, now()), "overdue 2w");

        card.next_review_date = now() - Duration::days(90_000_000);
        assert_eq!(due_label(&card, now()), "overdue 246575y");

        card.next_review_date = DateTime::<Utc>::MAX_UTC;
        assert!(due_label(&card, now()).starts_with("due in "));
    }

    #[test]
    fn test_paint_without_color() {
        assert_eq!(paint("x", Color::RED, false), "x");
        assert_eq!(paint("x", Color::RED, true), "\x1b[31mx\x1b[0m");
    }

    #[test]
    fn test_render_bar() {
        assert_eq!(render_bar(50, 10, Color::GREEN, false), "█████░░░░░");
        assert_eq!(render_bar(0, 4, Color::GREEN, false), "░░░░");
        assert_eq!(render_bar(100, 4, Color::GREEN, false), "████");
    }
}
