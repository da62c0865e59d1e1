use anyhow::{Context, Result};

use flashmind_lib::flashcards::NewCard;

use crate::app::App;
use crate::commands::card_json;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

#[allow(clippy::too_many_arguments)]
pub fn run(
    app: &mut App,
    front: &str,
    back: &str,
    tags: Option<&str>,
    front_image: Option<String>,
    back_image: Option<String>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let tag_ids = match tags {
        Some(list) => app.resolve_tag_list(list)?,
        None => Vec::new(),
    };

    let new_card = NewCard {
        front_image,
        back_image,
        ..NewCard::new(front, back).with_tags(tag_ids)
    };
    let card = app.store.add_card(new_card).context("Failed to create card")?;
    app.save()?;

    let card_tags = app.store.tags_for_card(&card);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card_json(&card, &card_tags))?);
        }
        OutputFormat::Plain => {
            println!("Created card: {}", terminal::truncate(&card.front, 60));
            if !card_tags.is_empty() {
                println!("  Tags: {}", terminal::tag_badges(&card_tags, use_color));
            }
            println!("  {}", terminal::paint(&format!("ID: {}", card.id), Color::GRAY, use_color));
        }
    }

    Ok(())
}
