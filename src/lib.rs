// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! TalkTalk - a voice conversation pipeline.
//!
//! TalkTalk takes one audio clip of speech and turns it into a spoken reply:
//! the clip is normalized to 16 kHz, transcribed by an OpenAI-compatible
//! `/v1/audio/transcriptions` endpoint, forwarded as a single user turn to a
//! `/v1/chat/completions` endpoint, and the assistant's reply is synthesized
//! back to audio. One submission runs strictly sequentially; each submission
//! gets its own scratch and output files so concurrent submissions never
//! collide.

pub mod audio;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod prelude;
pub mod services;
pub mod utils;

pub use error::{Error, Result};
