use std::path::PathBuf;

use anyhow::{Context, Result};

use flashmind_lib::flashcards::ExportBundle;

use crate::app::App;
use crate::OutputFormat;

pub fn run(app: &App, output: Option<PathBuf>, format: &OutputFormat) -> Result<()> {
    let bundle = app.store.export();

    if output.as_deref() == Some(std::path::Path::new("-")) {
        println!("{}", bundle.to_json()?);
        return Ok(());
    }

    let path = output.unwrap_or_else(|| PathBuf::from(ExportBundle::default_file_name(bundle.export_date)));
    bundle.write_to(&path)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "path": path.to_string_lossy(),
                "cards": bundle.cards.len(),
                "tags": bundle.tags.len(),
                "exportDate": bundle.export_date.to_rfc3339(),
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            println!(
                "Exported {} cards and {} tags to {}",
                bundle.cards.len(),
                bundle.tags.len(),
                path.display()
            );
        }
    }

    Ok(())
}
