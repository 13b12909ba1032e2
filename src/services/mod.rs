// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! AI service integrations (STT, LLM, TTS).
//!
//! Each pipeline stage is a trait so backends can be swapped or stubbed:
//! [`STTService`] for speech-to-text, [`LLMService`] for chat completion,
//! and [`TTSService`] for speech synthesis. The pipeline owns the services
//! as trait objects; nothing is constructed at module load time.

pub mod chat;
pub mod google_tts;
pub mod multipart;
pub mod openai_tts;
pub mod transcription;

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::services::chat::ChatMessage;

/// Base trait for all AI services.
pub trait AIService: Send + Sync {
    /// Human-readable service name for logs.
    fn name(&self) -> &'static str;

    /// Model (or voice) identifier used by this service, if it has one.
    fn model(&self) -> Option<&str> {
        None
    }
}

/// Trait for Speech-to-Text services.
#[async_trait]
pub trait STTService: AIService {
    /// Transcribe the audio file at `audio` and return the cleaned text.
    async fn run_stt(&self, audio: &Path) -> Result<String>;
}

/// Trait for Language Model services.
#[async_trait]
pub trait LLMService: AIService {
    /// Run one inference over `messages` and return the assistant reply.
    async fn run_inference(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Container format of synthesized audio.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioFormat {
    /// RIFF WAV container.
    Wav,
    /// MPEG audio.
    Mp3,
}

impl AudioFormat {
    /// File extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp3 => "mp3",
        }
    }
}

/// One synthesized reply clip, not yet written to disk.
#[derive(Debug, Clone)]
pub struct SynthesizedAudio {
    /// Encoded audio bytes.
    pub data: Vec<u8>,
    /// Container format of `data`.
    pub format: AudioFormat,
}

/// Trait for Text-to-Speech services.
#[async_trait]
pub trait TTSService: AIService {
    /// Convert `text` to audio.
    async fn run_tts(&self, text: &str) -> Result<SynthesizedAudio>;
}
