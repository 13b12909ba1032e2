// Copyright (c) 2024-2026, Daily
// SPDX-License-Identifier: BSD-2-Clause

//! Crate-wide error type.
//!
//! Every pipeline stage surfaces its failures through [`Error`]; there are no
//! retries and no partial results. A stage error aborts the whole submission.

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the pipeline and its stage services.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The input audio file could not be decoded.
    #[error("failed to decode audio: {0}")]
    AudioDecode(#[from] hound::Error),

    /// The input audio uses a sample format the normalizer does not handle.
    #[error("unsupported audio format: {0}")]
    UnsupportedAudio(String),

    /// Resampler construction or processing failed.
    #[error("resampling failed: {0}")]
    Resample(String),

    /// An HTTP request to a remote service could not be completed.
    #[error("{service} request failed: {source}")]
    Http {
        service: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// A remote service answered with a non-2xx status.
    #[error("{service} API error (HTTP {status}): {message}")]
    Api {
        service: &'static str,
        status: u16,
        message: String,
    },

    /// A remote service answered 2xx but the body was not what we expect.
    #[error("malformed {service} response: {detail}")]
    MalformedResponse {
        service: &'static str,
        detail: String,
    },

    /// Speech synthesis was given input it cannot speak.
    #[error("speech synthesis failed: {0}")]
    Synthesis(String),

    /// A language code outside the supported set.
    #[error("unsupported language code: {0}")]
    UnsupportedLanguage(String),

    /// Scratch or output file I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
