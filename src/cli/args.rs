// src/cli/args.rs
use crate::domain::GenreColor;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)] // Read from `Cargo.toml`
#[command(arg_required_else_help = true, disable_help_subcommand = true)]
pub struct Args {
    /// Path to config file (optional)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    pub config: Option<PathBuf>,

    /// Path to state file, overrides the config (optional)
    #[arg(short, long, value_name = "STATE", global = true)]
    pub state: Option<PathBuf>,

    /// Verbosity level (-v = debug, -vv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show save location, writability and the current selection
    Status,

    /// Show or change the save location
    Location {
        /// New root directory for all genres
        #[arg(value_name = "PATH")]
        path: Option<PathBuf>,
    },

    /// Manage genres
    Genre {
        #[command(subcommand)]
        command: GenreCommand,
    },

    /// Start the next numbered note in the current genre
    New,

    /// Print the current note
    Show,

    /// List indexed notes, newest first
    List {
        /// Only notes of this genre
        #[arg(short, long, value_name = "GENRE")]
        genre: Option<String>,
    },

    /// Replace the current note's content (reads stdin when TEXT is omitted)
    Write {
        #[arg(value_name = "TEXT")]
        text: Option<String>,
    },

    /// Write the current note to any file
    Export {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },

    /// Read a file into a new note of the current genre
    Import {
        #[arg(value_name = "PATH")]
        path: PathBuf,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum GenreCommand {
    /// List genres
    List,

    /// Add a genre
    Add {
        #[arg(value_name = "NAME")]
        name: String,

        /// blue, green, orange, red, purple, pink or yellow
        #[arg(long, value_name = "COLOR")]
        color: Option<GenreColor>,
    },

    /// Delete a genre (its files stay on disk)
    Delete {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Make a genre current
    Switch {
        #[arg(value_name = "NAME")]
        name: String,
    },
}
