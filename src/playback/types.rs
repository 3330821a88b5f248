//! Vocabulary shared by the coordination layer and the audio engine.
//!
//! `MediaCommand`s flow from item players to the engine; `MediaEvent`s flow
//! back and drive each item's state machine.

use std::path::PathBuf;

use crate::error::MediaError;

/// Identifies one item of one installed playlist.
///
/// `generation` changes every time the playlist is replaced, which lets late
/// engine events for a discarded playlist be recognized and dropped.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct VoiceKey {
    pub generation: u64,
    pub index: usize,
}

/// Lifecycle of one item.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Idle,
    Loading,
    Ready,
    Playing,
    Paused,
    Error(MediaError),
}

impl Phase {
    pub fn label(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::Loading => "loading",
            Phase::Ready => "ready",
            Phase::Playing => "playing",
            Phase::Paused => "paused",
            Phase::Error(_) => "error",
        }
    }
}

/// What the UI shows for one item.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackState {
    pub is_playing: bool,
    pub current_time_seconds: f64,
    /// NaN until the engine reports metadata.
    pub duration_seconds: f64,
    /// 0.0 to 1.0.
    pub volume: f32,
    pub is_loading: bool,
    pub has_error: bool,
}

impl PlaybackState {
    pub fn new(volume: f32) -> Self {
        Self {
            is_playing: false,
            current_time_seconds: 0.0,
            duration_seconds: f64::NAN,
            volume: volume.clamp(0.0, 1.0),
            is_loading: false,
            has_error: false,
        }
    }

    /// Position as a fraction of the duration, 0.0 when the duration is unknown.
    pub fn progress(&self) -> f64 {
        if self.duration_seconds.is_finite() && self.duration_seconds > 0.0 {
            (self.current_time_seconds / self.duration_seconds).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self::new(1.0)
    }
}

/// Requests sent to the audio engine for one item.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaCommand {
    /// (Re)open the source and prepare a paused voice.
    Load { path: PathBuf, volume: f32 },
    Play,
    Pause,
    /// Jump to the given position in seconds.
    Seek(f64),
    SetVolume(f32),
    /// Drop the voice and everything decoded for it.
    Release,
}

/// Named media events reported by the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LoadStart,
    MetadataLoaded { duration_seconds: Option<f64> },
    CanPlay,
    TimeUpdate { position_seconds: f64 },
    /// A `Play` request has produced audible output.
    PlayStarted,
    /// A `Play` request could not be honored.
    PlayRejected(String),
    Ended,
    Error(MediaError),
}

/// A command addressed to one voice of the engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Outgoing {
    pub key: VoiceKey,
    pub command: MediaCommand,
}

/// An event reported by the engine for one voice.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineEvent {
    pub key: VoiceKey,
    pub event: MediaEvent,
}
