// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! OpenAI text-to-speech backend.
//!
//! Alternate synthesis backend behind the same [`TTSService`] trait as the
//! Google Translate path: `POST {base}/v1/audio/speech` with a bearer key,
//! returning a complete WAV file. Construct it only when this backend is
//! actually selected; nothing here is created at startup.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{Error, Result};
use crate::services::{AIService, AudioFormat, SynthesizedAudio, TTSService};

/// Service tag used in error variants and logs.
const SERVICE: &str = "tts";

/// Body sent to `/v1/audio/speech`.
#[derive(Debug, Serialize)]
pub struct SpeechRequest {
    pub model: String,
    pub input: String,
    pub voice: String,
    pub response_format: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

/// OpenAI speech synthesis client.
///
/// # Example
///
/// ```rust,no_run
/// use talktalk::services::openai_tts::OpenAITTSService;
///
/// let tts = OpenAITTSService::new("sk-your-api-key")
///     .with_model("tts-1")
///     .with_voice("alloy");
/// ```
pub struct OpenAITTSService {
    /// OpenAI API key.
    api_key: String,
    /// TTS model identifier.
    model: String,
    /// Voice name.
    voice: String,
    /// Playback speed multiplier.
    speed: Option<f64>,
    /// Base URL for the API (without trailing slash).
    base_url: String,
    /// HTTP client for API requests.
    client: reqwest::Client,
}

impl OpenAITTSService {
    /// Default TTS model.
    pub const DEFAULT_MODEL: &'static str = "tts-1";
    /// Default voice.
    pub const DEFAULT_VOICE: &'static str = "alloy";
    /// Default OpenAI API base URL.
    pub const DEFAULT_BASE_URL: &'static str = "https://api.openai.com";

    /// Create a new `OpenAITTSService` with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: Self::DEFAULT_MODEL.to_string(),
            voice: Self::DEFAULT_VOICE.to_string(),
            speed: None,
            base_url: Self::DEFAULT_BASE_URL.to_string(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(30))
                .connect_timeout(Duration::from_secs(10))
                .build()
                .expect("failed to build HTTP client"),
        }
    }

    /// Builder method: set the TTS model.
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Builder method: set the voice name.
    pub fn with_voice(mut self, voice: impl Into<String>) -> Self {
        self.voice = voice.into();
        self
    }

    /// Builder method: set the playback speed (0.25 to 4.0).
    pub fn with_speed(mut self, speed: f64) -> Self {
        self.speed = Some(speed);
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

    /// Build the full API URL for the speech endpoint.
    fn api_url(&self) -> String {
        let host = self.base_url.trim_end_matches('/');
        format!("{}/v1/audio/speech", host)
    }

    /// Build the request body for one synthesis call.
    fn build_request(&self, text: &str) -> SpeechRequest {
        SpeechRequest {
            model: self.model.clone(),
            input: text.to_string(),
            voice: self.voice.clone(),
            response_format: "wav".to_string(),
            speed: self.speed,
        }
    }
}

impl AIService for OpenAITTSService {
    fn name(&self) -> &'static str {
        "OpenAITTSService"
    }

    fn model(&self) -> Option<&str> {
        Some(&self.model)
    }
}

#[async_trait]
impl TTSService for OpenAITTSService {
    async fn run_tts(&self, text: &str) -> Result<SynthesizedAudio> {
        if text.trim().is_empty() {
            return Err(Error::Synthesis("empty text".to_string()));
        }

        let url = self.api_url();
        let body = self.build_request(text);

        debug!(
            url = %url,
            model = %self.model,
            voice = %self.voice,
            text_len = text.len(),
            "starting TTS synthesis"
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&body)
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
            let error_body = response.text().await.unwrap_or_default();
            error!(status = %status, body = %error_body, "TTS API error");
            return Err(Error::Api {
                service: SERVICE,
                status: status.as_u16(),
                message: error_body,
            });
        }

        let bytes = response.bytes().await.map_err(|e| Error::Http {
            service: SERVICE,
            source: e,
        })?;

        Ok(SynthesizedAudio {
            data: bytes.to_vec(),
            format: AudioFormat::Wav,
        })
    }
}
