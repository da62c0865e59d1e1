use anyhow::{bail, Context, Result};

use flashmind_lib::flashcards::selection::cards_by_tag;
use flashmind_lib::flashcards::{CardStore, Tag, TagUpdate};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run_list(app: &App, format: &OutputFormat, use_color: bool) -> Result<()> {
    let tags: Vec<(&Tag, usize)> = app.store.tags().iter()
        .map(|tag| (tag, cards_by_tag(app.store.get_all(), &tag.id).count()))
        .collect();

    match format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = tags.iter().map(|(tag, count)| {
                serde_json::json!({
                    "id": tag.id,
                    "name": tag.name,
                    "color": tag.color,
                    "count": count,
                })
            }).collect();
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => {
            if tags.is_empty() {
                println!("No tags found.");
                return Ok(());
            }

            let max_tag_len = tags.iter().map(|(t, _)| t.name.chars().count()).max().unwrap_or(5).max(5);

            println!("{:<width$} {:<8} Cards", "Tag", "Color", width = max_tag_len + 1);
            println!(
                "{} {} {}",
                "\u{2500}".repeat(max_tag_len + 1),
                "\u{2500}".repeat(8),
                "\u{2500}".repeat(6)
            );

            for (tag, count) in &tags {
                let name = format!("#{:<width$}", tag.name, width = max_tag_len);
                println!("{} {:<8} {}", terminal::paint(&name, Color::CYAN, use_color), tag.color, count);
            }

            println!("\n{} tags total", tags.len());
        }
    }

    Ok(())
}

pub fn run_add(app: &mut App, name: &str, color: Option<String>, format: &OutputFormat, use_color: bool) -> Result<()> {
    let color = color.map(|c| validate_color(&c)).transpose()?;
    let name = name.trim();
    if app.store.tags().iter().any(|t| t.name.to_lowercase() == name.to_lowercase()) {
        bail!("Tag '{}' already exists", name);
    }

    let tag = app.store.add_tag(name, color).context("Failed to create tag")?;
    app.save()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&tag)?),
        OutputFormat::Plain => {
            println!("Created tag: {} ({})", terminal::paint(&format!("#{}", tag.name), Color::CYAN, use_color), tag.color);
        }
    }
    Ok(())
}

pub fn run_rename(app: &mut App, tag_query: &str, name: &str, format: &OutputFormat) -> Result<()> {
    let tag = app.find_tag(tag_query)?;
    let name = name.trim();
    if app.store.tags().iter().any(|t| t.id != tag.id && t.name.to_lowercase() == name.to_lowercase()) {
        bail!("Tag '{}' already exists", name);
    }

    let update = TagUpdate {
        name: Some(name.to_string()),
        ..Default::default()
    };
    let renamed = app.store.update_tag(&tag.id, update).context("Failed to rename tag")?;
    app.save()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&renamed)?),
        OutputFormat::Plain => println!("Renamed tag #{} to #{}", tag.name, renamed.name),
    }
    Ok(())
}

pub fn run_color(app: &mut App, tag_query: &str, color: &str, format: &OutputFormat) -> Result<()> {
    let tag = app.find_tag(tag_query)?;
    let update = TagUpdate {
        color: Some(validate_color(color)?),
        ..Default::default()
    };
    let updated = app.store.update_tag(&tag.id, update).context("Failed to update tag")?;
    app.save()?;

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&updated)?),
        OutputFormat::Plain => println!("Tag #{} is now {}", updated.name, updated.color),
    }
    Ok(())
}

pub fn run_delete(app: &mut App, tag_query: &str, format: &OutputFormat) -> Result<()> {
    let tag = app.find_tag(tag_query)?;
    let deleted = app.store.delete_tag(&tag.id);
    app.save()?;

    match format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "id": tag.id,
                "name": tag.name,
                "deleted": deleted,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Plain => println!("Deleted tag #{}", tag.name),
    }
    Ok(())
}

/// Accept `#rgb` or `#rrggbb` hex colors, normalized to lowercase
fn validate_color(color: &str) -> Result<String> {
    let color = color.trim();
    let hex = color.strip_prefix('#').unwrap_or(color);
    if !matches!(hex.len(), 3 | 6) || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        bail!("Invalid color '{}'; expected a hex color such as #3b82f6", color);
    }
    Ok(format!("#{}", hex.to_lowercase()))
}
