// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Google Translate text-to-speech backend.
//!
//! This is the keyless TTS path the original demo shipped with: the same
//! endpoint the gTTS library drives, `GET {base}/translate_tts`, which
//! returns MPEG audio for up to ~100 characters of text per request.
//! Longer replies are split into chunks on whitespace and the returned MP3
//! frames are concatenated, which players accept as one stream.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, error};

use crate::config::Language;
use crate::error::{Error, Result};
use crate::services::{AIService, AudioFormat, SynthesizedAudio, TTSService};

/// Service tag used in error variants and logs.
const SERVICE: &str = "tts";

/// Text-to-speech client for the Google Translate TTS endpoint.
///
/// # Example
///
/// ```rust,no_run
/// use talktalk::config::Language;
/// use talktalk::services::google_tts::GoogleTranslateTTSService;
///
/// let tts = GoogleTranslateTTSService::new(Language::En);
/// ```
pub struct GoogleTranslateTTSService {
    /// Language the text is spoken in.
    language: Language,
    /// Base URL (overridable for tests).
    base_url: String,
    /// HTTP client for API requests.
    client: reqwest::Client,
}

impl GoogleTranslateTTSService {
    /// Default endpoint host.
    pub const DEFAULT_BASE_URL: &'static str = "https://translate.google.com";

    /// Maximum characters per request, matching the endpoint's limit.
    pub const MAX_CHARS: usize = 100;

    /// Create a new service speaking the given language.
    pub fn new(language: Language) -> Self {
        Self {
            language,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Builder method: set the spoken language.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    /// Builder method: set a custom base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Builder method: set a custom `reqwest::Client`.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build the endpoint URL.
    fn api_url(&self) -> String {
        let host = self.base_url.trim_end_matches('/');
        format!("{}/translate_tts", host)
    }

    /// Fetch audio for one text chunk.
    async fn fetch_chunk(&self, chunk: &str, idx: usize, total: usize) -> Result<Vec<u8>> {
        let url = self.api_url();
        let response = self
            .client
            .get(&url)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", self.language.code()),
                ("q", chunk),
                ("total", &total.to_string()),
                ("idx", &idx.to_string()),
                ("textlen", &chunk.chars().count().to_string()),
            ])
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "TTS HTTP request failed");
                Error::Http {
                    service: SERVICE,
                    source: e,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %body, "TTS API error");
            return Err(Error::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| Error::Http {
            service: SERVICE,
            source: e,
        })?;
        Ok(bytes.to_vec())
    }
}

impl AIService for GoogleTranslateTTSService {
    fn name(&self) -> &'static str {
        "GoogleTranslateTTSService"
    }

    fn model(&self) -> Option<&str> {
        Some(self.language.code())
    }
}

#[async_trait]
impl TTSService for GoogleTranslateTTSService {
    async fn run_tts(&self, text: &str) -> Result<SynthesizedAudio> {
        if text.trim().is_empty() {
            return Err(Error::Synthesis("empty text".to_string()));
        }

        let chunks = chunk_text(text, Self::MAX_CHARS);
        debug!(
            language = %self.language,
            chars = text.chars().count(),
            chunks = chunks.len(),
            "starting TTS synthesis"
        );

        let total = chunks.len();
        let mut data = Vec::new();
        for (idx, chunk) in chunks.iter().enumerate() {
            data.extend(self.fetch_chunk(chunk, idx, total).await?);
        }

        Ok(SynthesizedAudio {
            data,
            format: AudioFormat::Mp3,
        })
    }
}

/// Split `text` into whitespace-separated chunks of at most `max_chars`
/// characters. A single token longer than `max_chars` becomes its own chunk
/// rather than being split mid-word.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0usize;

    for token in text.split_whitespace() {
        let token_len = token.chars().count();
        if current_len > 0 && current_len + 1 + token_len > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(token);
        current_len += token_len;
    }
    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}
