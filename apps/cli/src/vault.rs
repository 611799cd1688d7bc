//! Reading notes from the vault: title, deck, shared tags and embedded
//! notes.

use std::path::{Path, PathBuf};

use vaultcards_core::{embedded_notes, global_tags, resolve_deck, EmbedMap, Note};

use crate::config::Config;
use crate::error::{CliError, Result};

/// Title of a note: its file name without extension.
pub fn note_title(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Name of the folder holding a note.
pub fn folder_name(path: &Path) -> Option<String> {
    path.parent()
        .and_then(|p| p.file_name())
        .map(|name| name.to_string_lossy().to_string())
}

/// Vault name used in `obsidian://` links: the vault directory's name, else
/// the note's folder.
pub fn vault_name(vault_dir: Option<&Path>, note_path: &Path) -> String {
    vault_dir
        .and_then(|dir| dir.file_name())
        .map(|name| name.to_string_lossy().to_string())
        .or_else(|| folder_name(note_path))
        .unwrap_or_default()
}

/// File behind an embed target such as `Verbs`, `Verbs#Irregular` or
/// `Grammar/Verbs|verbs`.
pub fn embed_path(base: &Path, target: &str) -> PathBuf {
    let name = target
        .split(['#', '|'])
        .next()
        .unwrap_or(target)
        .trim();
    let mut path = base.join(name);
    if path.extension().is_none() {
        path.set_extension("md");
    }
    path
}

async fn read(path: &Path) -> Result<String> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|source| CliError::Read {
            path: path.to_path_buf(),
            source,
        })
}

/// Content of every note embedded in `text`. Embeds that cannot be read
/// are logged and left out.
pub async fn load_embeds(text: &str, base: &Path) -> EmbedMap {
    let mut embeds = EmbedMap::new();
    for target in embedded_notes(text) {
        let path = embed_path(base, &target);
        match read(&path).await {
            Ok(content) => {
                embeds.insert(target, content);
            }
            Err(e) => tracing::warn!(target = %target, error = %e, "embedded note skipped"),
        }
    }
    embeds
}

/// Load a note ready for extraction. `deck` overrides the deck the note
/// would otherwise resolve to.
pub async fn load_note(path: &Path, deck: Option<&str>, config: &Config) -> Result<Note> {
    let text = read(path).await?;
    let vault_dir = config.vault_dir.as_deref();
    let deck = match deck {
        Some(deck) => deck.to_string(),
        None => resolve_deck(&text, folder_name(path).as_deref(), &config.settings),
    };
    let base = vault_dir
        .or_else(|| path.parent())
        .unwrap_or_else(|| Path::new("."));
    let embeds = load_embeds(&text, base).await;
    let tags = global_tags(&text);

    tracing::debug!(
        path = %path.display(),
        deck = %deck,
        embeds = embeds.len(),
        "loaded note"
    );
    Ok(Note::new(text, deck)
        .with_vault(vault_name(vault_dir, path))
        .with_title(note_title(path))
        .with_global_tags(tags)
        .with_embeds(embeds))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;
    use vaultcards_core::Settings;

    fn write(dir: &Path, name: &str, content: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn names_come_from_the_path() {
        let path = Path::new("/vault/Spanish/Verbs.md");
        assert_eq!(note_title(path), "Verbs");
        assert_eq!(folder_name(path).as_deref(), Some("Spanish"));
        assert_eq!(vault_name(Some(Path::new("/home/me/Notes")), path), "Notes");
        assert_eq!(vault_name(None, path), "Spanish");
    }

    #[test]
    fn embed_targets_map_to_markdown_files() {
        let base = Path::new("/vault");
        assert_eq!(embed_path(base, "Verbs"), PathBuf::from("/vault/Verbs.md"));
        assert_eq!(
            embed_path(base, "Grammar/Verbs#Irregular"),
            PathBuf::from("/vault/Grammar/Verbs.md")
        );
        assert_eq!(embed_path(base, "Verbs|verbs"), PathBuf::from("/vault/Verbs.md"));
        assert_eq!(embed_path(base, "list.txt"), PathBuf::from("/vault/list.txt"));
    }

    #[tokio::test]
    async fn loads_note_with_folder_deck_and_embeds() {
        let temp_dir = TempDir::new().unwrap();
        let spanish = temp_dir.path().join("Spanish");
        std::fs::create_dir(&spanish).unwrap();
        write(&spanish, "Irregular.md", "ser, ir");
        let path = write(
            &spanish,
            "Verbs.md",
            "tags: grammar\nQ #card\n![[Irregular]] ![[Missing]]\n",
        );
        let config = Config::from_env(Settings::default(), None, |_| None);

        let note = load_note(&path, None, &config).await.unwrap();
        assert_eq!(note.deck, "Spanish");
        assert_eq!(note.title, "Verbs");
        assert_eq!(note.global_tags, vec!["grammar"]);
        assert_eq!(note.embeds.get("Irregular").map(String::as_str), Some("ser, ir"));
        assert!(!note.embeds.contains_key("Missing"));

        let note = load_note(&path, Some("Override"), &config).await.unwrap();
        assert_eq!(note.deck, "Override");
    }

    #[tokio::test]
    async fn missing_note_is_a_read_error() {
        let config = Config::from_env(Settings::default(), None, |_| None);
        let error = load_note(Path::new("/nonexistent/note.md"), None, &config)
            .await
            .unwrap_err();
        assert!(matches!(error, CliError::Read { .. }));
    }
}
