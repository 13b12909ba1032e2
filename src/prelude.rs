// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Common re-exports for convenient use of the crate.
//!
//! ```
//! use talktalk::prelude::*;
//! ```

pub use std::sync::Arc;

pub use crate::audio::{AudioNormalizer, AudioResampler, NormalizedAudio, TARGET_SAMPLE_RATE};
pub use crate::config::{Language, PipelineConfig};
pub use crate::error::{Error, Result};
pub use crate::pipeline::{PipelineOutput, VoicePipeline};
pub use crate::services::chat::{ChatClient, ChatMessage, MessageRole};
pub use crate::services::google_tts::GoogleTranslateTTSService;
pub use crate::services::openai_tts::OpenAITTSService;
pub use crate::services::transcription::TranscriptionClient;
pub use crate::services::{
    AIService, AudioFormat, LLMService, STTService, SynthesizedAudio, TTSService,
};
