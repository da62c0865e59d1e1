use std::io::{self, BufRead, IsTerminal, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

use flashmind_lib::flashcards::transfer::read_import;
use flashmind_lib::flashcards::CardStore;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &mut App, path: &Path, yes: bool, format: &OutputFormat) -> Result<()> {
    let data = read_import(path)
        .with_context(|| format!("Failed to import {}", path.display()))?;

    if !yes {
        if !io::stdin().is_terminal() {
            bail!("Import replaces all cards and tags; pass --yes to confirm");
        }
        print!(
            "Replace {} cards and {} tags with {} cards and {} tags from {}? [y/N] ",
            app.store.get_all().len(),
            app.store.tags().len(),
            data.cards.len(),
            data.tags.len(),
            path.display()
        );
        io::stdout().flush()?;

        let mut answer = String::new();
        io::stdin().lock().read_line(&mut answer)?;
        if !matches!(answer.trim().to_lowercase().as_str(), "y" | "yes") {
            println!("Import cancelled.");
            return Ok(());
        }
    }

    let (cards, tags) = (data.cards.len(), data.tags.len());
    app.store.import(data).context("Failed to save imported data")?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "cards": cards,
                "tags": tags,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!("Imported {} cards and {} tags", cards, tags);
        }
    }

    Ok(())
}
