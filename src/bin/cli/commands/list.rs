use anyhow::Result;

use flashmind_lib::flashcards::{CardClass, CardQuery, CardStore};

use crate::app::App;
use crate::commands::card_json;
use crate::render::terminal;
use crate::{ListArgs, OutputFormat};

pub fn run(app: &App, args: &ListArgs, format: &OutputFormat, use_color: bool) -> Result<()> {
    let tag_id = app.tag_filter(args.tag.as_deref())?;
    let now = app.store.now();

    let mut query = CardQuery::new()
        .tag(tag_id.as_deref())
        .search(args.search.as_deref().unwrap_or(""));
    if args.due {
        query = query.due(now);
    } else if args.new {
        query = query.class(CardClass::New);
    } else if args.learning {
        query = query.class(CardClass::Learning);
    } else if args.mature {
        query = query.class(CardClass::Mature);
    }

    let cards: Vec<_> = query.filter(app.store.get_all()).collect();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = cards.iter()
                .map(|card| card_json(card, &app.store.tags_for_card(card)))
                .collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if cards.is_empty() {
                println!("No cards found.");
                return Ok(());
            }

            for card in &cards {
                let card_tags = app.store.tags_for_card(card);
                println!("{}", terminal::render_card_line(card, &card_tags, now, use_color));
            }

            println!("\n{} cards", cards.len());
        }
    }

    Ok(())
}
