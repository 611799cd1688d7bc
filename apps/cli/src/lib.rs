//! Command-line front end for vaultcards.
//!
//! Reads notes from a vault, extracts their cards as JSON and writes new
//! identifier markers back into the notes.

pub mod commands;
pub mod config;
pub mod error;
pub mod media;
pub mod vault;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;

#[derive(Debug, Parser)]
#[command(name = "vaultcards", version)]
#[command(about = "Extract flashcards from markdown notes", long_about = None)]
pub struct Cli {
    /// Settings file, defaults to <config dir>/vaultcards/settings.json
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    /// Vault directory, used for embedded notes and note links
    #[arg(long, global = true)]
    pub vault: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract the cards of a note and print them as JSON
    Extract {
        file: PathBuf,

        /// Deck for the note, instead of its declaration or folder
        #[arg(long)]
        deck: Option<String>,

        /// Write id markers for new cards back into the note
        #[arg(long)]
        assign_ids: bool,
    },
    /// List the identifier markers of a note
    Ids { file: PathBuf },
    /// List ids whose cards were deleted from a note
    Orphans { file: PathBuf },
}

pub async fn run() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load(cli.settings.as_deref(), cli.vault)?;
    let output = commands::execute(&config, cli.command).await?;
    println!("{output}");

    Ok(())
}
