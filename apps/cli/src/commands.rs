//! Subcommand implementations. Each returns the JSON printed on stdout.

use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use vaultcards_core::{inject_ids, Card, Extraction, Extractor, IdMarker};

use crate::config::Config;
use crate::error::{CliError, Result};
use crate::media::HttpMediaService;
use crate::vault::load_note;
use crate::Command;

#[derive(Debug, Serialize)]
struct ExtractOutput {
    note: String,
    deck: String,
    #[serde(flatten)]
    extraction: Extraction,
    /// Ids written into the note by `--assign-ids`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    assigned_ids: Vec<i64>,
}

/// Extractor for the configured settings, talking to the media service
/// when one is configured.
pub fn extractor(config: &Config) -> Result<Extractor> {
    let extractor = Extractor::new(config.settings.clone())?;
    Ok(match &config.media {
        Some(media) => {
            tracing::info!(url = %media.url, "using media service");
            extractor.with_media(Arc::new(HttpMediaService::new(
                media,
                config.vault_dir.clone(),
            )))
        }
        None => extractor,
    })
}

/// Write markers for every card without an id, numbering them from
/// `first_id`. Returns the updated text and the ids in card order.
pub fn assign_ids(text: &str, cards: &[Card], first_id: i64) -> (String, Vec<i64>) {
    let assignments: Vec<(&Card, i64)> = cards
        .iter()
        .filter(|card| !card.data().inserted)
        .zip(first_id..)
        .collect();
    let ids = assignments.iter().map(|(_, id)| *id).collect();
    (inject_ids(text, &assignments), ids)
}

async fn extract(
    config: &Config,
    file: &Path,
    deck: Option<&str>,
    assign: bool,
) -> Result<String> {
    let note = load_note(file, deck, config).await?;
    let extraction = extractor(config)?.extract(&note).await;
    for warning in &extraction.warnings {
        tracing::warn!(note = %note.title, "{warning}");
    }

    let mut assigned_ids = Vec::new();
    if assign {
        // Millisecond timestamps keep ids unique across runs.
        let first_id = chrono::Utc::now().timestamp_millis();
        let (updated, ids) = assign_ids(&note.text, &extraction.cards, first_id);
        if !ids.is_empty() {
            tokio::fs::write(file, updated)
                .await
                .map_err(|source| CliError::Write {
                    path: file.to_path_buf(),
                    source,
                })?;
            tracing::info!(path = %file.display(), count = ids.len(), "assigned ids");
        }
        assigned_ids = ids;
    }

    let output = ExtractOutput {
        note: note.title,
        deck: note.deck,
        extraction,
        assigned_ids,
    };
    Ok(serde_json::to_string_pretty(&output)?)
}

async fn read_text(file: &Path) -> Result<String> {
    tokio::fs::read_to_string(file)
        .await
        .map_err(|source| CliError::Read {
            path: file.to_path_buf(),
            source,
        })
}

pub async fn execute(config: &Config, command: Command) -> Result<String> {
    match command {
        Command::Extract {
            file,
            deck,
            assign_ids,
        } => extract(config, &file, deck.as_deref(), assign_ids).await,
        Command::Ids { file } => {
            let text = read_text(&file).await?;
            let markers: Vec<IdMarker> = extractor(config)?.find_existing_ids(&text);
            Ok(serde_json::to_string_pretty(&markers)?)
        }
        Command::Orphans { file } => {
            let text = read_text(&file).await?;
            let orphans = extractor(config)?.find_deletion_candidates(&text);
            Ok(serde_json::to_string_pretty(&orphans)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vaultcards_core::{Note, Settings};

    fn offline() -> Config {
        Config::from_env(Settings::default(), None, |_| None)
    }

    #[tokio::test]
    async fn assigns_ids_only_to_new_cards() {
        let text = "uno :: one ^1111111111111\ndos :: two\n\nQ #card\nA\n";
        let extraction = extractor(&offline())
            .unwrap()
            .extract(&Note::new(text, "Default"))
            .await;
        let (updated, ids) = assign_ids(text, &extraction.cards, 1_700_000_000_000);

        assert_eq!(ids, vec![1_700_000_000_000, 1_700_000_000_001]);
        assert_eq!(
            updated,
            "uno :: one ^1111111111111\ndos :: two ^1700000000000\n\nQ #card\nA\n^1700000000001\n"
        );
    }

    #[tokio::test]
    async fn nothing_to_assign_leaves_text_alone() {
        let text = "uno :: one ^1111111111111\n";
        let extraction = extractor(&offline())
            .unwrap()
            .extract(&Note::new(text, "Default"))
            .await;
        let (updated, ids) = assign_ids(text, &extraction.cards, 1);
        assert!(ids.is_empty());
        assert_eq!(updated, text);
    }

    #[tokio::test]
    async fn orphans_command_reports_missing_file() {
        let command = Command::Orphans {
            file: "/nonexistent/note.md".into(),
        };
        let error = execute(&offline(), command).await.unwrap_err();
        assert!(matches!(error, CliError::Read { .. }));
    }
}
