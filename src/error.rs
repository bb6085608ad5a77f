//! Error types for MIDI-to-score conversion.
//!
//! A single crate-wide error enum with a `Result` alias. Truncated track
//! data is deliberately NOT an error: the parser keeps whatever it decoded
//! before the buffer ran out.

use thiserror::Error;

/// Top-level conversion error.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Input is not a Standard MIDI File we can read (missing `MThd`,
    /// SMPTE division, header too short).
    #[error("not a standard midi file: {0}")]
    Format(String),

    /// Parsing succeeded but produced no notes. Nothing is written; the
    /// caller must treat this as distinct from success.
    #[error("no notes decoded from midi input")]
    EmptyScore,

    /// Reading the input file or writing the document failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ScoreError>;
