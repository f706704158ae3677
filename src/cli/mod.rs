pub mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "newsdesk")]
#[command(about = "A terminal news reader", long_about = None)]
pub struct Cli {
    /// Path to the favorites database
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print top headlines
    Headlines {
        /// Two-letter country code (defaults to the configured country)
        #[arg(short, long)]
        country: Option<String>,
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// Search all articles
    Search {
        query: String,
        /// Number of pages to load
        #[arg(short, long, default_value_t = 1)]
        pages: u32,
    },
    /// List saved favorites
    Favorites {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Remove a favorite by url
    Unfavorite { url: String },
    /// Launch the TUI (default)
    Tui,
}
