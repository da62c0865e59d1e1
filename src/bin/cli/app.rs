use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};

use flashmind_lib::config::Config;
use flashmind_lib::flashcards::{Card, CardStore, FlashcardStore, Tag};

/// Shared application state for CLI commands
pub struct App {
    pub config: Config,
    pub store: FlashcardStore,
}

impl App {
    /// Load the config and open the store it points at
    pub fn new(config_path: Option<&Path>, data_dir: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => Config::default_path().context("Failed to locate config file")?,
        };
        let config = Config::load(&config_path).context("Failed to load config")?;

        let data_dir = match data_dir {
            Some(dir) => dir,
            None => config.resolve_data_dir().context("Failed to get data directory")?,
        };
        let store = FlashcardStore::open_default(data_dir, config.on_corrupt_data)
            .context("Failed to open flashcard store")?;

        Ok(Self { config, store })
    }

    /// Persist pending changes
    pub fn save(&mut self) -> Result<()> {
        self.store.flush().context("Failed to save flashcards")
    }

    /// Find a card by id or unique id prefix
    pub fn find_card(&self, query: &str) -> Result<Card> {
        let cards = self.store.get_all();
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            bail!("Card id must not be empty");
        }

        // Exact match first
        if let Some(card) = cards.iter().find(|c| c.id.to_lowercase() == query) {
            return Ok(card.clone());
        }

        let matches: Vec<&Card> = cards.iter()
            .filter(|c| c.id.to_lowercase().starts_with(&query))
            .collect();

        match matches.len() {
            0 => bail!("No card with id '{}'", query),
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous card id '{}'. Matches:\n{}", query,
                matches.iter().map(|c| format!("  - {}  {}", c.id, c.front)).collect::<Vec<_>>().join("\n")),
        }
    }

    /// Find a tag by id or name (case-insensitive prefix match)
    pub fn find_tag(&self, name: &str) -> Result<Tag> {
        let tags = self.store.tags();
        let name_lower = name.trim().to_lowercase();

        if let Some(tag) = tags.iter().find(|t| t.id == name.trim() || t.name.to_lowercase() == name_lower) {
            return Ok(tag.clone());
        }

        let matches: Vec<&Tag> = tags.iter()
            .filter(|t| t.name.to_lowercase().starts_with(&name_lower))
            .collect();

        match matches.len() {
            0 => bail!("No tag matching '{}'. Available tags:\n{}", name,
                tags.iter().map(|t| format!("  - {}", t.name)).collect::<Vec<_>>().join("\n")),
            1 => Ok(matches[0].clone()),
            _ => bail!("Ambiguous tag name '{}'. Matches:\n{}", name,
                matches.iter().map(|t| format!("  - {}", t.name)).collect::<Vec<_>>().join("\n")),
        }
    }

    /// Resolve an optional `--tag` filter to a tag id
    pub fn tag_filter(&self, name: Option<&str>) -> Result<Option<String>> {
        name.map(|n| self.find_tag(n).map(|t| t.id)).transpose()
    }

    /// Turn a comma-separated tag list into tag ids.
    ///
    /// Names match existing tags case-insensitively; unknown names become new tags.
    pub fn resolve_tag_list(&mut self, list: &str) -> Result<Vec<String>> {
        let mut ids: Vec<String> = Vec::new();
        for name in parse_tag_list(list) {
            let existing = self.store.tags().iter()
                .find(|t| t.name.to_lowercase() == name.to_lowercase())
                .map(|t| t.id.clone());
            let id = match existing {
                Some(id) => id,
                None => {
                    let tag = self.store.add_tag(&name, None)
                        .with_context(|| format!("Failed to create tag '{}'", name))?;
                    log::info!("Created tag {} for card", tag.name);
                    tag.id
                }
            };
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        Ok(ids)
    }
}

/// Split a comma-separated list, dropping blanks
pub fn parse_tag_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .collect()
}
