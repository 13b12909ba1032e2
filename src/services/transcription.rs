// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Speech-to-text over an OpenAI-compatible transcription endpoint.
//!
//! [`TranscriptionClient`] sends one WAV file per request to
//! `POST {base}/v1/audio/transcriptions` as multipart/form-data and parses
//! the JSON body's `text` field. The raw text may carry `[start-end]`
//! timestamp tokens and hard line breaks inserted by the engine's internal
//! segmentation; both are cleaned up here before the text is handed to the
//! chat stage.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::{debug, error};

use crate::config::Language;
use crate::error::{Error, Result};
use crate::services::multipart::MultipartForm;
use crate::services::{AIService, STTService};

/// Service tag used in error variants and logs.
const SERVICE: &str = "transcription";

/// JSON response from the transcription endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct TranscriptionResponse {
    /// The transcribed text, possibly with timestamp tokens.
    pub text: String,
}

/// Batch speech-to-text client for `/v1/audio/transcriptions`.
///
/// # Example
///
/// ```rust,no_run
/// use talktalk::config::Language;
/// use talktalk::services::transcription::TranscriptionClient;
///
/// let stt = TranscriptionClient::new("http://localhost:10086")
///     .with_language(Language::En)
///     .with_max_len(100);
/// ```
pub struct TranscriptionClient {
    /// Base URL of the API server (without trailing slash).
    base_url: String,
    /// Language hint sent with each request.
    language: Option<Language>,
    /// Maximum segment length in characters.
    max_len: u32,
    /// Whether segments may only split on word boundaries.
    split_on_word: bool,
    /// Decoding context window in tokens.
    max_context: u32,
    /// Optional bearer key; local servers usually need none.
    api_key: Option<String>,
    /// HTTP client for API requests.
    client: reqwest::Client,
}

impl TranscriptionClient {
    /// Default maximum segment length.
    pub const DEFAULT_MAX_LEN: u32 = 100;
    /// Default decoding context window.
    pub const DEFAULT_MAX_CONTEXT: u32 = 200;

    /// Create a new `TranscriptionClient` against the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            language: None,
            max_len: Self::DEFAULT_MAX_LEN,
            split_on_word: true,
            max_context: Self::DEFAULT_MAX_CONTEXT,
            api_key: None,
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Builder method: set the language hint.
    pub fn with_language(mut self, language: Language) -> Self {
        self.language = Some(language);
        self
    }

    /// Builder method: set the maximum segment length.
    pub fn with_max_len(mut self, max_len: u32) -> Self {
        self.max_len = max_len;
        self
    }

    /// Builder method: set whether segments split on word boundaries only.
    pub fn with_split_on_word(mut self, split_on_word: bool) -> Self {
        self.split_on_word = split_on_word;
        self
    }

    /// Builder method: set the decoding context window.
    pub fn with_max_context(mut self, max_context: u32) -> Self {
        self.max_context = max_context;
        self
    }

    /// Builder method: set a bearer API key.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Builder method: set a custom `reqwest::Client`.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Build the full API URL for the transcriptions endpoint.
    fn api_url(&self) -> String {
        let host = self.base_url.trim_end_matches('/');
        format!("{}/v1/audio/transcriptions", host)
    }

    /// Build the multipart form body for a transcription request.
    ///
    /// Returns `(content_type_header_value, body_bytes)`.
    fn build_request_body(&self, filename: &str, wav_data: &[u8]) -> (String, Vec<u8>) {
        let mut form = MultipartForm::new("Transcription");

        form.add_file("file", filename, "audio/wav", wav_data);
        if let Some(lang) = self.language {
            form.add_text("language", lang.code());
        }
        form.add_text("max_len", &self.max_len.to_string());
        form.add_text("split_on_word", if self.split_on_word { "true" } else { "false" });
        form.add_text("max_context", &self.max_context.to_string());

        form.finish()
    }

    /// Send one WAV file to the endpoint and return the cleaned transcript.
    async fn transcribe_file(&self, audio: &Path) -> Result<String> {
        let wav_data = tokio::fs::read(audio).await?;
        let filename = audio
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.wav");

        let url = self.api_url();
        let (content_type, body) = self.build_request_body(filename, &wav_data);

        debug!(
            url = %url,
            kilobytes = body.len() / 1024,
            language = ?self.language,
            "sending transcription request"
        );

        let mut request = self
            .client
            .post(&url)
            .header("Content-Type", content_type)
            .body(body);
        if let Some(ref key) = self.api_key {
            request = request.header("Authorization", format!("Bearer {}", key));
        }

        let response = request.send().await.map_err(|e| {
            error!(error = %e, "transcription HTTP request failed");
            Error::Http {
                service: SERVICE,
                source: e,
            }
        })?;

        let status = response.status();
        let response_text = response.text().await.map_err(|e| Error::Http {
            service: SERVICE,
            source: e,
        })?;

        if !status.is_success() {
            error!(status = %status, body = %response_text, "transcription API error");
            return Err(Error::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: response_text,
            });
        }

        let parsed: TranscriptionResponse =
            serde_json::from_str(&response_text).map_err(|e| Error::MalformedResponse {
                service: SERVICE,
                detail: format!("{e}: {response_text}"),
            })?;

        let transcript = clean_transcript(&parsed.text);
        debug!(transcript = %transcript, "transcription complete");
        Ok(transcript)
    }
}

impl AIService for TranscriptionClient {
    fn name(&self) -> &'static str {
        "TranscriptionClient"
    }
}

#[async_trait]
impl STTService for TranscriptionClient {
    async fn run_stt(&self, audio: &Path) -> Result<String> {
        self.transcribe_file(audio).await
    }
}

// ---------------------------------------------------------------------------
// Transcript cleanup
// ---------------------------------------------------------------------------

/// Strip every `[`...`]` token (bracket pair on a single line) together with
/// the whitespace run that follows it.
///
/// The transcription engine emits one `[start-end]` timestamp per segment;
/// a `[` with no closing bracket on the same line is kept as-is.
pub fn strip_timestamps(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    let mut i = 0;
    while i < chars.len() {
        if chars[i] == '[' {
            let mut close = None;
            let mut j = i + 1;
            while j < chars.len() {
                match chars[j] {
                    ']' => {
                        close = Some(j);
                        break;
                    }
                    '\n' => break,
                    _ => j += 1,
                }
            }
            if let Some(end) = close {
                i = end + 1;
                while i < chars.len() && chars[i].is_whitespace() {
                    i += 1;
                }
                continue;
            }
        }
        out.push(chars[i]);
        i += 1;
    }
    out
}

/// Collapse a line break whose neighbors are both non-whitespace and not
/// sentence punctuation (`.`, `,`, `!`, `?`).
///
/// This rejoins words the engine split mid-sentence across segments. It is
/// a deliberately narrow heuristic, not sentence repair: a break next to
/// punctuation is presumed intentional and preserved.
pub fn join_wrapped_lines(text: &str) -> String {
    fn boundary(c: char) -> bool {
        c.is_whitespace() || matches!(c, '.' | ',' | '!' | '?')
    }

    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len());
    for (i, &c) in chars.iter().enumerate() {
        if c == '\n' && i > 0 && i + 1 < chars.len() {
            // Neighbors are taken from the original text on both sides.
            if !boundary(chars[i - 1]) && !boundary(chars[i + 1]) {
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Full cleanup applied to raw transcription output.
pub fn clean_transcript(text: &str) -> String {
    let stripped = strip_timestamps(text);
    let joined = join_wrapped_lines(&stripped);
    joined.trim().to_string()
}
