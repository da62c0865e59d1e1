use anyhow::Result;

use flashmind_lib::flashcards::{CardStore, CollectionStats};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(app: &App, tag: Option<&str>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let tag_id = app.tag_filter(tag)?;
    let stats = CollectionStats::compute(app.store.get_all(), tag_id.as_deref(), app.store.now());

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Plain => {
            if let Some(tag_id) = &tag_id {
                if let Some(tag) = app.store.get_tag(tag_id) {
                    println!("{}", terminal::paint(&format!("#{}", tag.name), Color::CYAN, use_color));
                }
            }

            println!("Total cards:  {}", stats.total_cards);
            println!("Due now:      {}", terminal::paint(&stats.due_cards.to_string(), Color::BLUE, use_color));
            println!("New:          {}", terminal::paint(&stats.new_cards.to_string(), Color::GREEN, use_color));
            println!("Learning:     {}", terminal::paint(&stats.learning_cards.to_string(), Color::YELLOW, use_color));
            println!("Mature:       {}", terminal::paint(&stats.mature_cards.to_string(), Color::MAGENTA, use_color));
            println!(
                "Mastery:      {} {}%",
                terminal::render_bar(stats.mastery_percentage, 20, Color::MAGENTA, use_color),
                stats.mastery_percentage
            );
        }
    }

    Ok(())
}
