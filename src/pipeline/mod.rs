// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Pipeline orchestration.
//!
//! [`VoicePipeline`] runs the four stages for exactly one submission:
//! normalize the input audio, transcribe it, ask the chat model for a reply,
//! and synthesize that reply to an audio file. Any stage failure aborts the
//! submission; there are no partial results. Each submission owns uniquely
//! named scratch and output files, so `process` may be called concurrently
//! from multiple tasks.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{info, warn};

use crate::audio::normalizer::AudioNormalizer;
use crate::config::PipelineConfig;
use crate::error::Result;
use crate::services::chat::{ChatClient, ChatMessage};
use crate::services::google_tts::GoogleTranslateTTSService;
use crate::services::transcription::TranscriptionClient;
use crate::services::{LLMService, STTService, TTSService};
use crate::utils::helpers::{generate_unique_id, now_iso8601};

/// Everything one submission produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Identifier tying together this submission's files and logs.
    pub submission_id: String,
    /// Path to the synthesized reply audio.
    pub audio_path: PathBuf,
    /// Cleaned transcript of the submitted audio.
    pub transcript: String,
    /// The assistant's reply text.
    pub reply: String,
}

/// The voice conversation pipeline.
///
/// Stage services are injected as trait objects; [`VoicePipeline::from_config`]
/// wires up the default backends.
///
/// # Example
///
/// ```rust,no_run
/// use talktalk::config::PipelineConfig;
/// use talktalk::pipeline::VoicePipeline;
///
/// # async fn example() -> talktalk::Result<()> {
/// let pipeline = VoicePipeline::from_config(&PipelineConfig::default());
/// let output = pipeline.process(std::path::Path::new("question.wav")).await?;
/// println!("{} -> {}", output.transcript, output.reply);
/// # Ok(())
/// # }
/// ```
pub struct VoicePipeline {
    normalizer: AudioNormalizer,
    stt: Arc<dyn STTService>,
    llm: Arc<dyn LLMService>,
    tts: Arc<dyn TTSService>,
    system_prompt: String,
    output_dir: PathBuf,
}

impl VoicePipeline {
    /// Create a pipeline from explicit stage services.
    pub fn new(
        stt: Arc<dyn STTService>,
        llm: Arc<dyn LLMService>,
        tts: Arc<dyn TTSService>,
    ) -> Self {
        let config = PipelineConfig::default();
        info!(
            stt = stt.name(),
            llm = llm.name(),
            tts = tts.name(),
            "pipeline assembled"
        );
        Self {
            normalizer: AudioNormalizer::new(),
            stt,
            llm,
            tts,
            system_prompt: config.system_prompt,
            output_dir: config.output_dir,
        }
    }

    /// Create a pipeline with the default backends for `config`.
    pub fn from_config(config: &PipelineConfig) -> Self {
        let stt = TranscriptionClient::new(&config.base_url).with_language(config.input_language);
        let llm = ChatClient::new(&config.base_url).with_model(&config.model);
        let tts = GoogleTranslateTTSService::new(config.tts_language);

        Self::new(Arc::new(stt), Arc::new(llm), Arc::new(tts))
            .with_system_prompt(&config.system_prompt)
            .with_output_dir(&config.output_dir)
            .with_normalizer(AudioNormalizer::new().with_scratch_dir(&config.scratch_dir))
    }

    /// Builder method: set the system prompt.
    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    /// Builder method: set the output directory for reply audio.
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Builder method: replace the audio normalizer.
    pub fn with_normalizer(mut self, normalizer: AudioNormalizer) -> Self {
        self.normalizer = normalizer;
        self
    }

    /// Run one submission through the pipeline.
    ///
    /// Returns the reply audio path, the cleaned transcript, and the reply
    /// text. The normalizer's scratch file (if one was created) is removed
    /// before this returns, whether transcription succeeded or not.
    pub async fn process(&self, audio: &Path) -> Result<PipelineOutput> {
        let submission_id = generate_unique_id("submission");
        info!(
            submission = %submission_id,
            input = %audio.display(),
            started = %now_iso8601(),
            "processing submission"
        );

        let normalized = self.normalizer.normalize(audio)?;
        let transcript = {
            let result = self.stt.run_stt(&normalized.path).await;
            if normalized.is_scratch {
                if let Err(e) = std::fs::remove_file(&normalized.path) {
                    warn!(
                        path = %normalized.path.display(),
                        error = %e,
                        "failed to remove scratch file"
                    );
                }
            }
            result?
        };

        let messages = [
            ChatMessage::system(&self.system_prompt),
            ChatMessage::user(&transcript),
        ];
        let reply = self.llm.run_inference(&messages).await?;

        let synthesized = self.tts.run_tts(&reply).await?;
        let audio_path = self.output_dir.join(format!(
            "response-{}.{}",
            submission_id,
            synthesized.format.extension()
        ));
        tokio::fs::write(&audio_path, &synthesized.data).await?;

        info!(
            submission = %submission_id,
            output = %audio_path.display(),
            transcript_len = transcript.len(),
            reply_len = reply.len(),
            "submission complete"
        );

        Ok(PipelineOutput {
            submission_id,
            audio_path,
            transcript,
            reply,
        })
    }
}
