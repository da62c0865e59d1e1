use anyhow::{bail, Context, Result};

use flashmind_lib::flashcards::CardUpdate;

use crate::app::App;
use crate::commands::card_json;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(
    app: &mut App,
    card_query: &str,
    front: Option<String>,
    back: Option<String>,
    tags: Option<&str>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    if front.is_none() && back.is_none() && tags.is_none() {
        bail!("Nothing to change; pass --front, --back or --tags");
    }

    let card = app.find_card(card_query)?;
    let tags = tags.map(|list| app.resolve_tag_list(list)).transpose()?;

    let update = CardUpdate {
        front,
        back,
        tags,
        ..Default::default()
    };
    let card = app.store.edit_card(&card.id, update).context("Failed to update card")?;
    app.save()?;

    let card_tags = app.store.tags_for_card(&card);
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card_json(&card, &card_tags))?);
        }
        OutputFormat::Plain => {
            println!("Updated card: {}", terminal::truncate(&card.front, 60));
            if !card_tags.is_empty() {
                println!("  Tags: {}", terminal::tag_badges(&card_tags, use_color));
            }
        }
    }

    Ok(())
}
