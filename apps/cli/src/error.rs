//! Error types for the command-line front end.

use std::path::PathBuf;

use thiserror::Error;
use vaultcards_core::ExtractError;

#[derive(Debug, Error)]
pub enum CliError {
    #[error("Failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid settings in {}: {source}", .path.display())]
    Settings {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Extractor error: {0}")]
    Extract(#[from] ExtractError),

    #[error("Output error: {0}")]
    Output(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CliError>;
