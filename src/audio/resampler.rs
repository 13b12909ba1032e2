// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Audio resampling built on rubato's windowed-sinc `SincFixedIn<f32>`.
//!
//! The resampler consumes fixed-size input chunks and buffers the residue
//! between calls; [`AudioResampler::flush`] zero-pads and drains the residue
//! so whole-clip conversion does not drop the tail.

use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::sync::Mutex;

use crate::error::{Error, Result};

/// Sample rate the transcription endpoint expects.
pub const TARGET_SAMPLE_RATE: u32 = 16_000;

/// Thread-safe mono audio resampler wrapping rubato's SincFixedIn.
///
/// The inner `SincFixedIn<f32>` is `Send` but not `Sync` (it contains
/// `Box<dyn SincInterpolator<f32>>` without a `Sync` bound). We wrap it
/// in a `Mutex` so the struct is `Sync` without `unsafe`. Callers only
/// resample from `&mut self` (exclusive access), so the mutex never
/// contends in practice.
pub struct AudioResampler {
    inner: Mutex<SincFixedIn<f32>>,
    input_buffer: Vec<f32>,
    input_sample_rate: u32,
    output_sample_rate: u32,
}

impl AudioResampler {
    /// Create a new resampler from `input_rate` Hz to `output_rate` Hz.
    ///
    /// # Panics
    /// Panics if either rate is zero or the rates are equal (use
    /// [`needs_resampling`](Self::needs_resampling) to check first).
    pub fn new(input_rate: u32, output_rate: u32) -> Result<Self> {
        assert_ne!(input_rate, 0, "input sample rate must be > 0");
        assert_ne!(output_rate, 0, "output sample rate must be > 0");
        assert_ne!(
            input_rate, output_rate,
            "no resampling needed for {input_rate} Hz input"
        );

        let ratio = output_rate as f64 / input_rate as f64;
        let params = SincInterpolationParameters {
            sinc_len: 256,
            f_cutoff: 0.95,
            interpolation: SincInterpolationType::Linear,
            oversampling_factor: 256,
            window: WindowFunction::BlackmanHarris2,
        };
        // ~10ms chunks at input rate
        let chunk_size = (input_rate as usize / 100).max(1);
        let resampler = SincFixedIn::new(ratio, 2.0, params, chunk_size, 1)
            .map_err(|e| Error::Resample(e.to_string()))?;

        Ok(Self {
            inner: Mutex::new(resampler),
            input_buffer: Vec::new(),
            input_sample_rate: input_rate,
            output_sample_rate: output_rate,
        })
    }

    /// Check if resampling is needed between the given rates.
    pub fn needs_resampling(input_rate: u32, output_rate: u32) -> bool {
        input_rate != output_rate && input_rate > 0
    }

    /// Resample f32 samples from the input rate to the output rate.
    ///
    /// Buffers residual samples internally for the next call; call
    /// [`flush`](Self::flush) once the whole clip has been fed.
    pub fn resample(&mut self, samples: &[f32]) -> Result<Vec<f32>> {
        let mut resampler = self.inner.lock().expect("resampler lock poisoned");
        self.input_buffer.extend_from_slice(samples);

        let input_frames = resampler.input_frames_next();
        let mut output = Vec::new();

        while self.input_buffer.len() >= input_frames {
            let chunk: Vec<f32> = self.input_buffer.drain(..input_frames).collect();
            let result = resampler
                .process(&[&chunk], None)
                .map_err(|e| Error::Resample(e.to_string()))?;
            if let Some(channel) = result.first() {
                output.extend_from_slice(channel);
            }
        }

        Ok(output)
    }

    /// Drain the residual input buffer, zero-padding the final chunk.
    pub fn flush(&mut self) -> Result<Vec<f32>> {
        if self.input_buffer.is_empty() {
            return Ok(Vec::new());
        }
        let input_frames = {
            let resampler = self.inner.lock().expect("resampler lock poisoned");
            resampler.input_frames_next()
        };
        self.input_buffer.resize(input_frames, 0.0);
        self.resample(&[])
    }

    /// Input sample rate this resampler was configured for.
    pub fn input_rate(&self) -> u32 {
        self.input_sample_rate
    }

    /// Output sample rate this resampler was configured for.
    pub fn output_rate(&self) -> u32 {
        self.output_sample_rate
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_needs_resampling() {
        assert!(AudioResampler::needs_resampling(8000, 16000));
        assert!(AudioResampler::needs_resampling(48000, 16000));
        assert!(!AudioResampler::needs_resampling(16000, 16000));
        assert!(!AudioResampler::needs_resampling(0, 16000));
    }

    #[test]
    fn test_resampler_8k_to_16k() {
        let mut resampler = AudioResampler::new(8000, 16000).unwrap();
        // 1 second of a 440 Hz sine at 8 kHz
        let samples: Vec<f32> = (0..8000)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 8000.0).sin())
            .collect();
        let mut output = resampler.resample(&samples).unwrap();
        output.extend(resampler.flush().unwrap());
        // Output should be approximately 16000 samples (2x upsampling)
        // Allow tolerance due to windowing/buffering
        assert!(
            output.len() > 14000 && output.len() < 18000,
            "expected ~16000 samples, got {}",
            output.len()
        );
    }

    #[test]
    fn test_resampler_44k1_to_16k() {
        let mut resampler = AudioResampler::new(44_100, 16_000).unwrap();
        let samples: Vec<f32> = vec![0.25; 44_100];
        let mut output = resampler.resample(&samples).unwrap();
        output.extend(resampler.flush().unwrap());
        assert!(
            output.len() > 14000 && output.len() < 18000,
            "expected ~16000 samples, got {}",
            output.len()
        );
    }

    #[test]
    fn test_resampler_incremental() {
        let mut resampler = AudioResampler::new(8000, 16000).unwrap();
        let mut total_output = 0;
        // Feed in small chunks (160 samples = 20ms at 8kHz)
        for _ in 0..50 {
            let chunk: Vec<f32> = vec![0.0; 160];
            let out = resampler.resample(&chunk).unwrap();
            total_output += out.len();
        }
        total_output += resampler.flush().unwrap().len();
        // 50 * 160 = 8000 input samples -> ~16000 output samples
        assert!(
            total_output > 14000 && total_output < 18000,
            "expected ~16000 samples, got {total_output}"
        );
    }

    #[test]
    fn test_flush_on_empty_buffer() {
        let mut resampler = AudioResampler::new(8000, 16000).unwrap();
        assert!(resampler.flush().unwrap().is_empty());
    }

    #[test]
    fn test_rates_accessors() {
        let resampler = AudioResampler::new(44_100, 16_000).unwrap();
        assert_eq!(resampler.input_rate(), 44_100);
        assert_eq!(resampler.output_rate(), 16_000);
    }
}
