use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};

use flashmind_lib::flashcards::algorithm::{format_interval, preview_intervals};
use flashmind_lib::flashcards::{CardStore, Rating, SessionError, SessionSummary, StudySession};

use crate::app::App;
use crate::render::terminal::{self, Color};
use crate::OutputFormat;

pub fn run(
    app: &mut App,
    tag: Option<&str>,
    limit: Option<usize>,
    format: &OutputFormat,
    use_color: bool,
) -> Result<()> {
    let tag_id = app.tag_filter(tag)?;
    let limit = limit.unwrap_or(app.config.session_size);
    let mut session = StudySession::build(app.store.get_all(), tag_id.as_deref(), app.store.now(), limit);

    if session.is_empty() {
        match format {
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&session.summary())?),
            OutputFormat::Plain => println!("Nothing to study. All caught up!"),
        }
        return Ok(());
    }

    let stdin = io::stdin();
    study_loop(app, &mut session, &mut stdin.lock(), use_color)?;

    let summary = session.summary();
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        OutputFormat::Plain => print_summary(&summary, use_color),
    }

    Ok(())
}

/// Drive the session from line-based input until it finishes or the user quits
fn study_loop<R: BufRead>(app: &mut App, session: &mut StudySession, input: &mut R, use_color: bool) -> Result<()> {
    while let Some(id) = session.current().map(str::to_string) {
        let Some(card) = app.store.get(&id).cloned() else {
            log::warn!("Card {} was deleted; skipping", id);
            session.skip();
            continue;
        };

        println!();
        println!(
            "{}",
            terminal::paint(
                &format!("Card {}/{} ({}%)", session.position() + 1, session.len(), session.progress()),
                Color::GRAY,
                use_color,
            )
        );
        println!("{}", terminal::paint(&card.front, Color::BOLD, use_color));

        match prompt(input, "[Enter] show answer, [q] quit: ")? {
            None => return Ok(()),
            Some(line) if is_quit(&line) => return Ok(()),
            Some(_) => session.flip(),
        }

        println!("{}", terminal::paint(&"\u{2500}".repeat(40), Color::GRAY, use_color));
        println!("{}", card.back);
        println!();

        let preview = preview_intervals(&card.scheduling_state());
        let choices = Rating::ALL.iter()
            .zip(preview)
            .map(|(rating, days)| {
                terminal::paint(
                    &format!("[{}] {} ({})", rating.key(), rating, format_interval(days)),
                    terminal::rating_color(*rating),
                    use_color,
                )
            })
            .collect::<Vec<_>>()
            .join("  ");
        println!("{}", choices);

        let rating = loop {
            match prompt(input, "Rate 1-4, [q] quit: ")? {
                None => return Ok(()),
                Some(line) if is_quit(&line) => return Ok(()),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => match line.parse::<Rating>() {
                    Ok(rating) => break rating,
                    Err(e) => println!("{}", terminal::paint(&e.to_string(), Color::RED, use_color)),
                },
            }
        };

        match session.rate(&mut app.store, rating) {
            Ok(reviewed) => {
                app.save()?;
                println!(
                    "{}",
                    terminal::paint(
                        &format!("Next review in {}", format_interval(reviewed.interval)),
                        Color::DIM,
                        use_color,
                    )
                );
            }
            Err(SessionError::CardNotFound(id)) => {
                log::warn!("Card {} was deleted during the session", id);
            }
            Err(e) => return Err(e).context("Failed to record review"),
        }
    }

    Ok(())
}

fn prompt<R: BufRead>(input: &mut R, message: &str) -> Result<Option<String>> {
    print!("{}", message);
    io::stdout().flush()?;

    let mut line = String::new();
    let read = input.read_line(&mut line).context("Failed to read input")?;
    if read == 0 {
        println!();
        return Ok(None);
    }
    Ok(Some(line))
}

fn is_quit(line: &str) -> bool {
    matches!(line.trim().to_lowercase().as_str(), "q" | "quit")
}

fn print_summary(summary: &SessionSummary, use_color: bool) {
    println!();
    println!("{}", terminal::paint("Session complete", Color::BOLD, use_color));
    println!("  Reviewed: {}", summary.total_reviewed);
    for rating in Rating::ALL {
        println!(
            "  {:<8}{}",
            format!("{}:", rating),
            terminal::paint(&summary.stats.count(rating).to_string(), terminal::rating_color(rating), use_color)
        );
    }
    println!("  Accuracy: {}%", summary.accuracy);
}

#[cfg(test)]
mod tests {
    use super::*;
    use flashmind_lib::flashcards::NewCard;
    use std::io::Cursor;
    use tempfile::TempDir;

    fn create_test_app() -> (App, TempDir) {
        let temp = TempDir::new().unwrap();
        let config_path = temp.path().join("config.toml");
        let app = App::new(Some(config_path.as_path()), Some(temp.path().to_path_buf())).unwrap();
        (app, temp)
    }

    #[test]
    fn test_study_loop_rates_and_persists() {
        let (mut app, temp) = create_test_app();
        app.store.add_card(NewCard::new("one", "1")).unwrap();
        app.store.add_card(NewCard::new("two", "2")).unwrap();

        let mut session = StudySession::build(app.store.get_all(), None, app.store.now(), 50);
        let mut input = Cursor::new("\n3\n\nbogus\n\n1\n");
        study_loop(&mut app, &mut session, &mut input, false).unwrap();

        assert!(session.is_finished());
        let summary = session.summary();
        assert_eq!(summary.total_reviewed, 2);
        assert_eq!(summary.stats.good, 1);
        assert_eq!(summary.stats.again, 1);
        assert_eq!(summary.accuracy, 50);

        // Each rating is flushed straight away
        assert!(!app.store.is_dirty());
        assert!(temp.path().join("cards.json").exists());
    }

    #[test]
    fn test_quit_keeps_earlier_ratings() {
        let (mut app, _temp) = create_test_app();
        app.store.add_card(NewCard::new("one", "1")).unwrap();
        app.store.add_card(NewCard::new("two", "2")).unwrap();

        let mut session = StudySession::build(app.store.get_all(), None, app.store.now(), 50);
        let mut input = Cursor::new("\n4\nq\n");
        study_loop(&mut app, &mut session, &mut input, false).unwrap();

        assert!(!session.is_finished());
        assert_eq!(session.summary().stats.easy, 1);
        let reviewed = app.store.get_all().iter().filter(|c| !c.is_new).count();
        assert_eq!(reviewed, 1);
    }

    #[test]
    fn test_end_of_input_stops_session() {
        let (mut app, _temp) = create_test_app();
        app.store.add_card(NewCard::new("one", "1")).unwrap();

        let mut session = StudySession::build(app.store.get_all(), None, app.store.now(), 50);
        let mut input = Cursor::new("");
        study_loop(&mut app, &mut session, &mut input, false).unwrap();

        assert_eq!(session.position(), 0);
        assert_eq!(session.summary().total_reviewed, 0);
    }

    #[test]
    fn test_is_quit() {
        assert!(is_quit("q\n"));
        assert!(is_quit(" QUIT "));
        assert!(!is_quit("\n"));
        assert!(!is_quit("3"));
    }
}
