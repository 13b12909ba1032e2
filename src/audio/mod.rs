// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Audio loading, resampling, and normalization.

pub mod normalizer;
pub mod resampler;

pub use normalizer::{AudioNormalizer, NormalizedAudio};
pub use resampler::{AudioResampler, TARGET_SAMPLE_RATE};
