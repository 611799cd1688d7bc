//! HTTP client for the media service that stores attachments and produces
//! speech recordings for the card store.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use vaultcards_core::{MediaError, MediaService, SpeechRequest};

use crate::config::MediaConfig;

#[derive(Debug, Serialize)]
struct UploadRequest<'a> {
    file_name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    anki_dir: Option<&'a Path>,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    #[serde(flatten)]
    speech: &'a SpeechRequest,
    #[serde(skip_serializing_if = "Option::is_none")]
    anki_dir: Option<&'a Path>,
    #[serde(skip_serializing_if = "Option::is_none")]
    obsidian_dir: Option<&'a Path>,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    file_name: Option<String>,
}

/// Media service reached over HTTP.
///
/// Attachments are uploaded with `POST /anki/upload`, speech is requested
/// with `POST /audio/generate`.
#[derive(Debug, Clone)]
pub struct HttpMediaService {
    client: Client,
    base_url: String,
    media_dir: Option<PathBuf>,
    vault_dir: Option<PathBuf>,
}

impl HttpMediaService {
    pub fn new(config: &MediaConfig, vault_dir: Option<PathBuf>) -> Self {
        Self {
            client: Client::new(),
            base_url: config.url.trim_end_matches('/').to_string(),
            media_dir: config.media_dir.clone(),
            vault_dir,
        }
    }

    fn upload_request<'a>(&'a self, file_name: &'a str) -> UploadRequest<'a> {
        UploadRequest {
            file_name,
            path: self.vault_dir.as_ref().map(|dir| dir.join(file_name)),
            anki_dir: self.media_dir.as_deref(),
        }
    }

    fn generate_request<'a>(&'a self, speech: &'a SpeechRequest) -> GenerateRequest<'a> {
        GenerateRequest {
            speech,
            anki_dir: self.media_dir.as_deref(),
            obsidian_dir: self.vault_dir.as_deref(),
        }
    }

    async fn post<B: Serialize>(
        &self,
        route: &str,
        body: &B,
    ) -> Result<reqwest::Response, MediaError> {
        let url = format!("{}{}", self.base_url, route);
        let resp = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| MediaError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(MediaError::Backend { status, message });
        }
        Ok(resp)
    }
}

#[async_trait]
impl MediaService for HttpMediaService {
    async fn upload(&self, file_name: &str) -> Result<(), MediaError> {
        self.post("/anki/upload", &self.upload_request(file_name)).await?;
        tracing::debug!(file_name, "uploaded attachment");
        Ok(())
    }

    async fn synthesize(&self, request: &SpeechRequest) -> Result<Option<String>, MediaError> {
        let resp = self
            .post("/audio/generate", &self.generate_request(request))
            .await?;
        let response: GenerateResponse = resp
            .json()
            .await
            .map_err(|e| MediaError::Parse(e.to_string()))?;
        tracing::debug!(lang = %request.lang, file = ?response.file_name, "synthesized speech");
        Ok(response.file_name.filter(|name| !name.is_empty()))
    }
}
