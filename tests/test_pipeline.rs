// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! End-to-end pipeline tests with stub stage services.
//!
//! These drive the real normalizer and orchestrator; the three remote
//! services are stubbed so no network is involved.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use talktalk::audio::AudioNormalizer;
use talktalk::pipeline::VoicePipeline;
use talktalk::services::chat::ChatMessage;
use talktalk::services::transcription::clean_transcript;
use talktalk::services::{
    AIService, AudioFormat, LLMService, STTService, SynthesizedAudio, TTSService,
};
use talktalk::Result;

/// Stub STT that records the audio path it was handed and returns the
/// cleaned version of a canned raw transcription.
struct RecordingSTT {
    raw_text: &'static str,
    seen: Mutex<Vec<PathBuf>>,
}

impl RecordingSTT {
    fn new(raw_text: &'static str) -> Self {
        Self {
            raw_text,
            seen: Mutex::new(Vec::new()),
        }
    }
}

impl AIService for RecordingSTT {
    fn name(&self) -> &'static str {
        "RecordingSTT"
    }
}

#[async_trait]
impl STTService for RecordingSTT {
    async fn run_stt(&self, audio: &Path) -> Result<String> {
        self.seen.lock().unwrap().push(audio.to_path_buf());
        Ok(clean_transcript(self.raw_text))
    }
}

struct EchoLLM;

impl AIService for EchoLLM {
    fn name(&self) -> &'static str {
        "EchoLLM"
    }
}

#[async_trait]
impl LLMService for EchoLLM {
    async fn run_inference(&self, messages: &[ChatMessage]) -> Result<String> {
        Ok(format!("You said: {}", messages.last().unwrap().content))
    }
}

/// Stub TTS that emits a tiny but valid WAV file.
struct WavStubTTS;

impl AIService for WavStubTTS {
    fn name(&self) -> &'static str {
        "WavStubTTS"
    }
}

#[async_trait]
impl TTSService for WavStubTTS {
    async fn run_tts(&self, _text: &str) -> Result<SynthesizedAudio> {
        let mut data = Vec::new();
        {
            let spec = hound::WavSpec {
                channels: 1,
                sample_rate: 16_000,
                bits_per_sample: 16,
                sample_format: hound::SampleFormat::Int,
            };
            let cursor = std::io::Cursor::new(&mut data);
            let mut writer = hound::WavWriter::new(cursor, spec).unwrap();
            for i in 0..1600i32 {
                writer.write_sample((i % 256 - 128) as i16).unwrap();
            }
            writer.finalize().unwrap();
        }
        Ok(SynthesizedAudio {
            data,
            format: AudioFormat::Wav,
        })
    }
}

fn write_wav(path: &Path, sample_rate: u32, secs: f32) {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).unwrap();
    let count = (sample_rate as f32 * secs) as u32;
    for i in 0..count {
        let t = i as f32 / sample_rate as f32;
        let s = (2.0 * std::f32::consts::PI * 220.0 * t).sin() * 0.5;
        writer.write_sample((s * i16::MAX as f32) as i16).unwrap();
    }
    writer.finalize().unwrap();
}

#[tokio::test]
async fn test_end_to_end_44k1_submission() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("question.wav");
    write_wav(&input, 44_100, 1.0);

    let stt = Arc::new(RecordingSTT::new("[0.0-2.0] What is the capi\ntal of France?"));
    let pipeline = VoicePipeline::new(stt.clone(), Arc::new(EchoLLM), Arc::new(WavStubTTS))
        .with_normalizer(AudioNormalizer::new().with_scratch_dir(dir.path()))
        .with_output_dir(dir.path());

    let output = pipeline.process(&input).await.unwrap();

    // The transcript has no bracketed tokens and the split word is rejoined.
    assert_eq!(output.transcript, "What is the capital of France?");
    assert!(!output.reply.is_empty());
    assert_eq!(output.reply, "You said: What is the capital of France?");

    // The STT stage saw a 16 kHz scratch file, not the 44.1 kHz input...
    let seen = stt.seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert_ne!(seen[0], input);
    // ...and that scratch file was removed after transcription.
    assert!(!seen[0].exists());

    // The reply audio decodes as a WAV file.
    let reader = hound::WavReader::open(&output.audio_path).unwrap();
    assert_eq!(reader.spec().sample_rate, 16_000);
}

#[tokio::test]
async fn test_end_to_end_16k_input_passes_through() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("question.wav");
    write_wav(&input, 16_000, 0.5);

    let stt = Arc::new(RecordingSTT::new("[0.0-1.0] Hello world"));
    let pipeline = VoicePipeline::new(stt.clone(), Arc::new(EchoLLM), Arc::new(WavStubTTS))
        .with_normalizer(AudioNormalizer::new().with_scratch_dir(dir.path()))
        .with_output_dir(dir.path());

    let output = pipeline.process(&input).await.unwrap();

    assert_eq!(output.transcript, "Hello world");
    // The STT stage was handed the original file, which still exists.
    let seen = stt.seen.lock().unwrap();
    assert_eq!(seen[0], input);
    assert!(input.exists());
}

#[tokio::test]
async fn test_concurrent_submissions_do_not_collide() {
    let dir = tempfile::tempdir().unwrap();
    let input_a = dir.path().join("a.wav");
    let input_b = dir.path().join("b.wav");
    write_wav(&input_a, 44_100, 0.5);
    write_wav(&input_b, 44_100, 0.5);

    let pipeline = Arc::new(
        VoicePipeline::new(
            Arc::new(RecordingSTT::new("hello")),
            Arc::new(EchoLLM),
            Arc::new(WavStubTTS),
        )
        .with_normalizer(AudioNormalizer::new().with_scratch_dir(dir.path()))
        .with_output_dir(dir.path()),
    );

    let (a, b) = tokio::join!(pipeline.process(&input_a), pipeline.process(&input_b));
    let a = a.unwrap();
    let b = b.unwrap();

    assert_ne!(a.submission_id, b.submission_id);
    assert_ne!(a.audio_path, b.audio_path);
    assert!(a.audio_path.exists());
    assert!(b.audio_path.exists());
}
