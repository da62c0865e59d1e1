mod app;
mod commands;
mod render;

use std::io::IsTerminal;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "flashmind-cli", about = "FlashMind spaced-repetition flashcards", version)]
struct Cli {
    /// Path to config.toml (default: <data dir>/flashmind/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding cards.json and tags.json
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Output format
    #[arg(long, global = true, default_value = "plain")]
    format: OutputFormat,

    /// Disable ANSI colors
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Clone, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Plain,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new card
    Add {
        /// Question side
        front: String,
        /// Answer side
        back: String,
        /// Comma-separated tag names (missing tags are created)
        #[arg(long)]
        tags: Option<String>,
        /// Image for the front, stored as given (e.g. a data URL)
        #[arg(long)]
        front_image: Option<String>,
        /// Image for the back, stored as given (e.g. a data URL)
        #[arg(long)]
        back_image: Option<String>,
    },

    /// Change a card's text or tags
    Edit {
        /// Card id or unique id prefix
        card: String,
        #[arg(long)]
        front: Option<String>,
        #[arg(long)]
        back: Option<String>,
        /// Replace the card's tags (comma-separated; empty string clears)
        #[arg(long)]
        tags: Option<String>,
    },

    /// Delete a card
    Delete {
        /// Card id or unique id prefix
        card: String,
    },

    /// Show a card with its schedule
    Show {
        /// Card id or unique id prefix
        card: String,
    },

    /// List cards
    List(ListArgs),

    /// Study due and new cards interactively
    Study {
        /// Only study cards with this tag
        #[arg(long)]
        tag: Option<String>,
        /// Maximum cards in the session (default: session_size from config)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Collection statistics
    Stats {
        /// Only count cards with this tag
        #[arg(long)]
        tag: Option<String>,
    },

    /// Manage tags
    #[command(subcommand)]
    Tags(TagsCommand),

    /// Write all cards and tags to a JSON backup
    Export {
        /// Output file ("-" for stdout; default: flashmind-backup-YYYY-MM-DD.json)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },

    /// Replace all cards and tags with a JSON backup
    Import {
        /// Backup file written by `export`
        path: PathBuf,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Args)]
pub struct ListArgs {
    /// Only cards with this tag
    #[arg(long)]
    pub tag: Option<String>,
    /// Case-insensitive text search on front and back
    #[arg(long)]
    pub search: Option<String>,
    /// Only cards due now
    #[arg(long, group = "status")]
    pub due: bool,
    /// Only never-reviewed cards
    #[arg(long, group = "status")]
    pub new: bool,
    /// Only cards still being learned
    #[arg(long, group = "status")]
    pub learning: bool,
    /// Only mature cards
    #[arg(long, group = "status")]
    pub mature: bool,
}

#[derive(Subcommand)]
enum TagsCommand {
    /// List tags with card counts
    List,
    /// Create a tag
    Add {
        name: String,
        /// Hex color such as #3b82f6 (default: random palette color)
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename a tag
    Rename {
        /// Tag name (case-insensitive prefix match) or id
        tag: String,
        name: String,
    },
    /// Change a tag's color
    Color {
        /// Tag name (case-insensitive prefix match) or id
        tag: String,
        color: String,
    },
    /// Delete a tag (cards keep their other tags)
    Delete {
        /// Tag name (case-insensitive prefix match) or id
        tag: String,
    },
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let use_color = !cli.no_color && std::io::stdout().is_terminal();
    let mut app = app::App::new(cli.config.as_deref(), cli.data_dir)?;

    match cli.command {
        Command::Add { front, back, tags, front_image, back_image } => {
            commands::add::run(
                &mut app,
                &front,
                &back,
                tags.as_deref(),
                front_image,
                back_image,
                &cli.format,
                use_color,
            )?;
        }
        Command::Edit { card, front, back, tags } => {
            commands::edit::run(&mut app, &card, front, back, tags.as_deref(), &cli.format, use_color)?;
        }
        Command::Delete { card } => {
            commands::delete::run(&mut app, &card, &cli.format)?;
        }
        Command::Show { card } => {
            commands::show::run(&app, &card, &cli.format, use_color)?;
        }
        Command::List(args) => {
            commands::list::run(&app, &args, &cli.format, use_color)?;
        }
        Command::Study { tag, limit } => {
            commands::study::run(&mut app, tag.as_deref(), limit, &cli.format, use_color)?;
        }
        Command::Stats { tag } => {
            commands::stats::run(&app, tag.as_deref(), &cli.format, use_color)?;
        }
        Command::Tags(subcmd) => match subcmd {
            TagsCommand::List => commands::tags::run_list(&app, &cli.format, use_color)?,
            TagsCommand::Add { name, color } => {
                commands::tags::run_add(&mut app, &name, color, &cli.format, use_color)?
            }
            TagsCommand::Rename { tag, name } => {
                commands::tags::run_rename(&mut app, &tag, &name, &cli.format)?
            }
            TagsCommand::Color { tag, color } => {
                commands::tags::run_color(&mut app, &tag, &color, &cli.format)?
            }
            TagsCommand::Delete { tag } => commands::tags::run_delete(&mut app, &tag, &cli.format)?,
        },
        Command::Export { output } => {
            commands::export::run(&app, output, &cli.format)?;
        }
        Command::Import { path, yes } => {
            commands::import::run(&mut app, &path, yes, &cli.format)?;
        }
    }

    app.save()
}
