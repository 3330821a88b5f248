//! Error types shared across the crate.

use thiserror::Error;

/// Intake failures. None of these touch the current playlist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IntakeError {
    #[error("no audio files found among {considered} selected file(s)")]
    NoAudioFilesFound { considered: usize },
}

/// Per-item media failures reported by the audio engine.
///
/// Scoped to the single item that produced them.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MediaError {
    /// Opening or decoding the source failed.
    #[error("could not load media: {0}")]
    Load(String),

    /// The engine refused to start playback.
    #[error("could not start playback: {0}")]
    PlaybackStart(String),
}
