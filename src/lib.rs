// src/lib.rs
pub mod application;
pub mod cli;
pub mod constants;
pub mod domain;
pub mod infrastructure;
pub mod util;

use std::io::{self, BufRead};
use std::time::Instant;

use anyhow::{Context, Result};
use application::{KeyValueStore, Notebook};
use infrastructure::{config, AppConfig, JsonFileStore};
use tracing::{debug, info};

use crate::cli::args::{Args, Command, GenreCommand};

pub fn run(args: Args) -> Result<()> {
    debug!(?args, "Starting hiyo with arguments");

    let config_path = match &args.config {
        Some(path) => path.clone(),
        None => config::default_config_path()?,
    };
    let mut config = AppConfig::load_or_default(&config_path)?;
    if let Some(state) = &args.state {
        config.storage.state_file = state.to_string_lossy().to_string();
    }

    let state_path = config.state_file_path()?;
    debug!(?state_path, "Opening state file");
    let store = JsonFileStore::open(&state_path)?;
    let mut notebook = Notebook::open(&config, store);

    execute(&mut notebook, args.command)?;
    notebook.flush()?;
    Ok(())
}

/// Run one command against an open notebook.
pub fn execute<S: KeyValueStore>(notebook: &mut Notebook<S>, command: Command) -> Result<()> {
    match command {
        Command::Status => {
            println!("Save location:  {}", notebook.save_location().display());
            println!("Configured:     {}", notebook.is_configured());
            println!("Writable:       {}", notebook.is_writable());
            println!("Current genre:  {}", notebook.current_genre().name);
            if let Some(path) = notebook.current_note_path() {
                println!("Current note:   {}", path.display());
            }
        }
        Command::Location { path: None } => {
            println!("{}", notebook.save_location().display());
        }
        Command::Location { path: Some(path) } => {
            notebook.set_save_location(&path)?;
            info!(?path, "Save location changed");
            println!("{}", notebook.save_location().display());
        }
        Command::Genre { command } => execute_genre(notebook, command)?,
        Command::New => {
            let note = notebook.new_note()?;
            println!("{}", notebook.current_note_path().unwrap_or_default().display());
            debug!(filename = %note.filename, "New note ready");
        }
        Command::Show => {
            let path = notebook
                .current_note_path()
                .context("No current note")?;
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            print!("{}", content);
        }
        Command::List { genre } => {
            for note in notebook
                .notes()
                .iter()
                .filter(|n| genre.as_ref().map_or(true, |g| &n.genre == g))
            {
                println!(
                    "{}\t{}/{}",
                    note.modified_at.format("%Y-%m-%d %H:%M:%S"),
                    note.genre,
                    note.filename
                );
            }
        }
        Command::Write { text: Some(text) } => {
            notebook
                .save(&text)
                .context("Note could not be saved; `hiyo export <PATH>` writes it elsewhere")?;
        }
        Command::Write { text: None } => {
            let mut buffer = String::new();
            for line in io::stdin().lock().lines() {
                buffer.push_str(&line.context("Failed to read stdin")?);
                buffer.push('\n');
                notebook.text_changed(buffer.clone());
                notebook.tick(Instant::now())?;
            }
            notebook.text_changed(buffer);
            notebook
                .flush()
                .context("Note could not be saved; `hiyo export <PATH>` writes it elsewhere")?;
        }
        Command::Export { path } => {
            notebook.export_current(&path)?;
            println!("{}", path.display());
        }
        Command::Import { path } => {
            let note = notebook.import_file(&path)?;
            println!("{}/{}", note.genre, note.filename);
        }
    }
    Ok(())
}

fn execute_genre<S: KeyValueStore>(notebook: &mut Notebook<S>, command: GenreCommand) -> Result<()> {
    match command {
        GenreCommand::List => {
            let current = notebook.current_genre();
            for genre in notebook.genres() {
                let marker = if genre.id == current.id { "*" } else { " " };
                let color = genre.color.map(|c| c.to_string()).unwrap_or_default();
                let default = if genre.is_default { " (default)" } else { "" };
                println!("{} {}\t{}{}", marker, genre.name, color, default);
            }
        }
        GenreCommand::Add { name, color } => {
            let genre = notebook.add_genre(&name, color)?;
            println!("{}", genre.name);
        }
        GenreCommand::Delete { name } => {
            notebook.delete_genre(&name)?;
            println!("Current genre: {}", notebook.current_genre().name);
        }
        GenreCommand::Switch { name } => {
            let note = notebook.switch_genre(&name)?;
            println!("{}/{}", note.genre, note.filename);
        }
    }
    Ok(())
}
