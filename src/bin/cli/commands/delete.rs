use anyhow::Result;

use flashmind_lib::flashcards::CardStore;

use crate::app::App;
use crate::render::terminal;
use crate::OutputFormat;

pub fn run(app: &mut App, card_query: &str, format: &OutputFormat) -> Result<()> {
    let card = app.find_card(card_query)?;
    let deleted = app.store.delete(&card.id);
    app.save()?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": card.id,
                "deleted": deleted,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Deleted card: {}", terminal::truncate(&card.front, 60));
        }
    }

    Ok(())
}
