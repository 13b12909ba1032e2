// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Input audio normalization.
//!
//! The transcription endpoint wants 16 kHz mono audio. [`AudioNormalizer`]
//! inspects the submitted WAV file and either passes it through untouched
//! (already at the target rate) or decodes it, mixes it down to mono,
//! resamples it, and writes a 16-bit scratch WAV at the target rate. Scratch
//! files get a per-submission unique name; the pipeline removes them after
//! transcription.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::audio::resampler::{AudioResampler, TARGET_SAMPLE_RATE};
use crate::error::{Error, Result};
use crate::utils::helpers::generate_unique_id;

/// Result of normalizing one input clip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedAudio {
    /// Path to audio at the target sample rate. Either the original input
    /// file or a scratch file owned by this submission.
    pub path: PathBuf,
    /// Whether `path` is a scratch file the caller must delete after use.
    pub is_scratch: bool,
    /// Sample rate of the audio at `path`.
    pub sample_rate: u32,
}

/// Normalizes submitted audio to the transcription sample rate.
pub struct AudioNormalizer {
    target_rate: u32,
    scratch_dir: PathBuf,
}

impl AudioNormalizer {
    /// Create a normalizer targeting [`TARGET_SAMPLE_RATE`], writing scratch
    /// files to the system temp directory.
    pub fn new() -> Self {
        Self {
            target_rate: TARGET_SAMPLE_RATE,
            scratch_dir: std::env::temp_dir(),
        }
    }

    /// Builder method: set the target sample rate.
    pub fn with_target_rate(mut self, rate: u32) -> Self {
        self.target_rate = rate;
        self
    }

    /// Builder method: set the scratch file directory.
    pub fn with_scratch_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.scratch_dir = dir.into();
        self
    }

    /// Target sample rate this normalizer converts to.
    pub fn target_rate(&self) -> u32 {
        self.target_rate
    }

    /// Normalize the WAV file at `input` to the target sample rate.
    ///
    /// If the file is already at the target rate it is passed through
    /// unchanged: no decode of the sample data, no scratch file. Otherwise
    /// the clip is decoded, mixed down to mono, resampled, scaled back down
    /// if the sinc filter overshot the original peak, and written to a
    /// unique scratch file.
    pub fn normalize(&self, input: &Path) -> Result<NormalizedAudio> {
        let reader = hound::WavReader::open(input)?;
        let spec = reader.spec();

        if !AudioResampler::needs_resampling(spec.sample_rate, self.target_rate) {
            debug!(
                path = %input.display(),
                rate = spec.sample_rate,
                "input already at target rate, passing through"
            );
            return Ok(NormalizedAudio {
                path: input.to_path_buf(),
                is_scratch: false,
                sample_rate: spec.sample_rate,
            });
        }

        let mono = decode_to_mono_f32(reader)?;
        let original_peak = peak(&mono);

        let mut resampler = AudioResampler::new(spec.sample_rate, self.target_rate)?;
        let mut resampled = resampler.resample(&mono)?;
        resampled.extend(resampler.flush()?);

        // Windowed-sinc interpolation can overshoot near sharp transients;
        // scale back so the scratch file never clips and never exceeds the
        // original peak.
        let resampled_peak = peak(&resampled);
        if resampled_peak > original_peak && resampled_peak > 0.0 {
            let scale = original_peak / resampled_peak;
            for sample in &mut resampled {
                *sample *= scale;
            }
        }

        let scratch_path = self
            .scratch_dir
            .join(format!("{}.wav", generate_unique_id("talktalk-scratch")));
        write_wav_mono_16bit(&scratch_path, &resampled, self.target_rate)?;

        debug!(
            input = %input.display(),
            scratch = %scratch_path.display(),
            from_rate = spec.sample_rate,
            to_rate = self.target_rate,
            samples = resampled.len(),
            "resampled input audio"
        );

        Ok(NormalizedAudio {
            path: scratch_path,
            is_scratch: true,
            sample_rate: self.target_rate,
        })
    }
}

impl Default for AudioNormalizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Peak absolute amplitude of a sample buffer.
fn peak(samples: &[f32]) -> f32 {
    samples.iter().fold(0.0f32, |acc, s| acc.max(s.abs()))
}

/// Decode all samples to f32 in [-1.0, 1.0], averaging channels to mono.
fn decode_to_mono_f32<R: std::io::Read>(reader: hound::WavReader<R>) -> Result<Vec<f32>> {
    let spec = reader.spec();
    let channels = spec.channels.max(1) as usize;

    let interleaved: Vec<f32> = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        hound::SampleFormat::Int => {
            let full_scale = match spec.bits_per_sample {
                16 => 32_768.0f32,
                24 => 8_388_608.0,
                32 => 2_147_483_648.0,
                bits => {
                    return Err(Error::UnsupportedAudio(format!(
                        "{bits}-bit integer PCM is not supported"
                    )))
                }
            };
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / full_scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    if channels == 1 {
        return Ok(interleaved);
    }

    let mut mono = Vec::with_capacity(interleaved.len() / channels);
    for frame in interleaved.chunks_exact(channels) {
        mono.push(frame.iter().sum::<f32>() / channels as f32);
    }
    Ok(mono)
}

/// Write f32 samples as a 16-bit mono WAV file.
fn write_wav_mono_16bit(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value)?;
    }
    writer.finalize()?;
    Ok(())
}
