//! Shared helpers for extraction integration tests.

#![allow(dead_code)]

use std::sync::Mutex;

use async_trait::async_trait;

use vaultcards_core::{
    Extraction, Extractor, MediaError, MediaService, Note, Settings, SpeechRequest,
};

/// Extractor with default settings and collaborators.
pub fn extractor() -> Extractor {
    Extractor::new(Settings::default()).expect("default settings compile")
}

/// Extract a note filed under the default deck.
pub async fn extract(text: &str) -> Extraction {
    extractor().extract(&Note::new(text, "Default")).await
}

/// Media service that records speech requests and names each produced
/// file `<lang>-<n>.mp3`, counting from one.
#[derive(Default)]
pub struct RecordingMedia {
    uploads: Mutex<Vec<String>>,
    requests: Mutex<Vec<SpeechRequest>>,
}

impl RecordingMedia {
    pub fn requests(&self) -> Vec<SpeechRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn uploads(&self) -> Vec<String> {
        self.uploads.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaService for RecordingMedia {
    async fn upload(&self, file_name: &str) -> Result<(), MediaError> {
        self.uploads.lock().unwrap().push(file_name.to_string());
        Ok(())
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<Option<String>, MediaError> {
        let mut requests = self.requests.lock().unwrap();
        requests.push(request.clone());
        Ok(Some(format!("{}-{}.mp3", request.lang, requests.len())))
    }
}
