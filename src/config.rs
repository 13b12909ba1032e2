// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Pipeline configuration.
//!
//! The original demo existed as a handful of near-identical revisions that
//! differed only in the API base URL, the input language, the system prompt,
//! the model identifier, and the TTS language. [`PipelineConfig`] is that
//! configuration surface as one struct with the demo's defaults.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::Error;

/// Languages accepted by the transcription and synthesis services.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// English.
    #[default]
    En,
    /// Chinese.
    Zh,
    /// Japanese.
    Ja,
}

impl Language {
    /// ISO-639-1 code sent to the remote services.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Zh => "zh",
            Self::Ja => "ja",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Self::En),
            "zh" => Ok(Self::Zh),
            "ja" => Ok(Self::Ja),
            other => Err(Error::UnsupportedLanguage(other.to_string())),
        }
    }
}

/// Configuration for one [`VoicePipeline`](crate::pipeline::VoicePipeline).
///
/// All fields have defaults matching the original demo, so a config read
/// from JSON may specify only the fields it wants to override.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Base URL of the OpenAI-compatible API server hosting both the
    /// transcription and chat-completion endpoints.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Language of the submitted audio.
    #[serde(default)]
    pub input_language: Language,
    /// System prompt prepended to every chat request.
    #[serde(default = "default_system_prompt")]
    pub system_prompt: String,
    /// Chat-completion model identifier.
    #[serde(default = "default_model")]
    pub model: String,
    /// Language the reply is spoken in.
    #[serde(default)]
    pub tts_language: Language,
    /// Directory the synthesized reply audio is written to.
    #[serde(default = "default_work_dir")]
    pub output_dir: PathBuf,
    /// Directory for normalizer scratch files.
    #[serde(default = "default_work_dir")]
    pub scratch_dir: PathBuf,
}

/// Default API server address of the demo.
pub const DEFAULT_BASE_URL: &str = "http://localhost:10086";

/// Default chat model identifier.
pub const DEFAULT_MODEL: &str = "llama";

/// Default assistant persona. Replies are meant to be spoken, not read.
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a helpful AI assistant. \
    You should answer questions as precisely and concisely as possible. \
    The answer should be suitable for speech playback, not for reading.";

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_model() -> String {
    DEFAULT_MODEL.to_string()
}

fn default_system_prompt() -> String {
    DEFAULT_SYSTEM_PROMPT.to_string()
}

fn default_work_dir() -> PathBuf {
    std::env::temp_dir()
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            input_language: Language::default(),
            system_prompt: default_system_prompt(),
            model: default_model(),
            tts_language: Language::default(),
            output_dir: default_work_dir(),
            scratch_dir: default_work_dir(),
        }
    }
}
