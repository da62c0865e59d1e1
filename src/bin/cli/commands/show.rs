use anyhow::Result;

use flashmind_lib::flashcards::algorithm::{format_interval, preview_intervals};
use flashmind_lib::flashcards::Rating;

use crate::app::App;
use crate::commands::card_json;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &App, card_query: &str, format: &OutputFormat, use_color: bool) -> Result<()> {
    let card = app.find_card(card_query)?;
    let card_tags = app.store.tags_for_card(&card);
    let now = app.store.now();

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&card_json(&card, &card_tags))?);
        }
        OutputFormat::Plain => {
            println!("{}", terminal::render_card_detail(&card, &card_tags, now, use_color));

            let preview = preview_intervals(&card.scheduling_state());
            let next = Rating::ALL.iter()
                .zip(preview)
                .map(|(rating, days)| format!("{} {}", rating, format_interval(days)))
                .collect::<Vec<_>>()
                .join(", ");
            println!("Next:     {}", next);
        }
    }

    Ok(())
}
