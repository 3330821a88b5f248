//! Per-item playback state machine.
//!
//! An `ItemPlayer` never talks to the engine directly: every transition
//! returns the `MediaCommand`s the engine should run for this item. The
//! shared `Coordinator` is passed in wherever a transition depends on which
//! item is active.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::error::MediaError;
use crate::library::MediaItem;

use super::coordinator::Coordinator;
use super::types::{MediaCommand, MediaEvent, Phase, PlaybackState};

#[derive(Debug, Clone)]
pub struct ItemPlayer {
    index: usize,
    source: PathBuf,
    phase: Phase,
    state: PlaybackState,
    /// A start was requested and has not been resolved yet.
    wants_play: bool,
    auto_reload: bool,
    reload_attempted: bool,
    volume_before_mute: Option<f32>,
}

impl ItemPlayer {
    pub fn new(index: usize, item: &MediaItem, volume: f32, auto_reload: bool) -> Self {
        Self {
            index,
            source: item.path.clone(),
            phase: Phase::Idle,
            state: PlaybackState::new(volume),
            wants_play: false,
            auto_reload,
            reload_attempted: false,
            volume_before_mute: None,
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn state(&self) -> &PlaybackState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn has_error(&self) -> bool {
        matches!(self.phase, Phase::Error(_))
    }

    pub fn wants_play(&self) -> bool {
        self.wants_play
    }

    pub fn is_muted(&self) -> bool {
        self.volume_before_mute.is_some()
    }

    /// Ask the engine to (re)open the source.
    pub fn load(&mut self) -> Vec<MediaCommand> {
        self.phase = Phase::Loading;
        self.state.is_loading = true;
        self.state.has_error = false;
        self.state.is_playing = false;
        vec![MediaCommand::Load {
            path: self.source.clone(),
            volume: self.state.volume,
        }]
    }

    /// Explicit recovery from `Error`: reload from the same source.
    pub fn retry(&mut self) -> Vec<MediaCommand> {
        if !self.has_error() {
            return Vec::new();
        }
        self.reload_attempted = false;
        self.load()
    }

    /// Start playing now. Only acts while this item is still the active one.
    pub fn start(&mut self, coordinator: &Coordinator) -> Vec<MediaCommand> {
        if !coordinator.is_active(self.index) {
            debug!(index = self.index, "start dropped: no longer active");
            self.wants_play = false;
            return Vec::new();
        }

        self.wants_play = true;
        match self.phase {
            Phase::Ready | Phase::Paused => vec![MediaCommand::Play],
            Phase::Playing => {
                self.wants_play = false;
                Vec::new()
            }
            // Playback begins on `CanPlay`.
            Phase::Loading => Vec::new(),
            Phase::Idle => self.load(),
            Phase::Error(_) => {
                self.wants_play = false;
                Vec::new()
            }
        }
    }

    /// Another item took over (or everything was stopped).
    ///
    /// Pauses in place; the position is kept.
    pub fn deactivate(&mut self) -> Vec<MediaCommand> {
        let had_pending = std::mem::take(&mut self.wants_play);
        if self.phase == Phase::Playing {
            self.phase = Phase::Paused;
            self.state.is_playing = false;
            return vec![MediaCommand::Pause];
        }
        if had_pending && matches!(self.phase, Phase::Ready | Phase::Paused) {
            // A `Play` may already be in flight; make sure it ends paused.
            return vec![MediaCommand::Pause];
        }
        Vec::new()
    }

    /// User pause of this item.
    pub fn pause(&mut self) -> Vec<MediaCommand> {
        self.deactivate()
    }

    /// Move the position to `p` of the duration, `p` clamped to `[0, 1]`.
    ///
    /// Does nothing while the duration is unknown.
    pub fn seek_normalized(&mut self, p: f64) -> Vec<MediaCommand> {
        let duration = self.state.duration_seconds;
        if !duration.is_finite() || duration <= 0.0 || p.is_nan() {
            return Vec::new();
        }
        self.seek_to(p.clamp(0.0, 1.0) * duration)
    }

    /// Move the position by `delta` seconds.
    pub fn seek_by(&mut self, delta: f64) -> Vec<MediaCommand> {
        let duration = self.state.duration_seconds;
        if !duration.is_finite() || duration <= 0.0 {
            return Vec::new();
        }
        self.seek_to(self.state.current_time_seconds + delta)
    }

    fn seek_to(&mut self, seconds: f64) -> Vec<MediaCommand> {
        if self.has_error() || matches!(self.phase, Phase::Idle) {
            return Vec::new();
        }
        let upper = if self.state.duration_seconds.is_finite() {
            self.state.duration_seconds
        } else {
            0.0
        };
        let target = seconds.clamp(0.0, upper);
        self.state.current_time_seconds = target;
        vec![MediaCommand::Seek(target)]
    }

    /// Jump back to the start. The caller decides whether to play.
    pub fn rewind(&mut self) -> Vec<MediaCommand> {
        if self.has_error() || matches!(self.phase, Phase::Idle | Phase::Loading) {
            return Vec::new();
        }
        self.state.current_time_seconds = 0.0;
        vec![MediaCommand::Seek(0.0)]
    }

    pub fn set_volume(&mut self, volume: f32) -> Vec<MediaCommand> {
        let volume = if volume.is_nan() { 0.0 } else { volume.clamp(0.0, 1.0) };
        self.state.volume = volume;
        if volume > 0.0 {
            self.volume_before_mute = None;
        }
        vec![MediaCommand::SetVolume(volume)]
    }

    /// Mute remembers the current volume; unmute restores it.
    pub fn toggle_mute(&mut self) -> Vec<MediaCommand> {
        match self.volume_before_mute.take() {
            Some(prior) => self.set_volume(prior),
            None => {
                let prior = self.state.volume;
                let cmds = self.set_volume(0.0);
                self.volume_before_mute = Some(if prior > 0.0 { prior } else { 1.0 });
                cmds
            }
        }
    }

    /// Give the engine resource back. The item is unusable afterwards.
    pub fn release(&mut self) -> Vec<MediaCommand> {
        self.phase = Phase::Idle;
        self.state.is_playing = false;
        self.state.is_loading = false;
        self.wants_play = false;
        vec![MediaCommand::Release]
    }

    /// Drive the state machine with one engine event.
    pub fn on_event(&mut self, event: MediaEvent, coordinator: &Coordinator) -> Vec<MediaCommand> {
        let active = coordinator.is_active(self.index);
        match event {
            MediaEvent::LoadStart => {
                self.phase = Phase::Loading;
                self.state.is_loading = true;
                self.state.has_error = false;
                Vec::new()
            }
            MediaEvent::MetadataLoaded { duration_seconds } => {
                self.state.duration_seconds = duration_seconds
                    .filter(|d| d.is_finite() && *d >= 0.0)
                    .unwrap_or(f64::NAN);
                Vec::new()
            }
            MediaEvent::CanPlay => {
                if self.phase == Phase::Loading {
                    self.phase = Phase::Ready;
                }
                self.state.is_loading = false;
                if self.wants_play {
                    if active {
                        return vec![MediaCommand::Play];
                    }
                    self.wants_play = false;
                }
                Vec::new()
            }
            MediaEvent::TimeUpdate { position_seconds } => {
                if !self.has_error() && position_seconds.is_finite() {
                    let upper = if self.state.duration_seconds.is_finite() {
                        self.state.duration_seconds
                    } else {
                        f64::INFINITY
                    };
                    self.state.current_time_seconds = position_seconds.clamp(0.0, upper);
                }
                Vec::new()
            }
            MediaEvent::PlayStarted => {
                self.wants_play = false;
                if self.has_error() {
                    return vec![MediaCommand::Pause];
                }
                if !active {
                    // Resolved after someone else took over: undo quietly.
                    debug!(index = self.index, "late play start discarded");
                    self.state.is_playing = false;
                    if self.phase == Phase::Playing {
                        self.phase = Phase::Paused;
                    }
                    return vec![MediaCommand::Pause];
                }
                self.phase = Phase::Playing;
                self.state.is_playing = true;
                self.reload_attempted = false;
                Vec::new()
            }
            MediaEvent::PlayRejected(reason) => {
                self.state.is_playing = false;
                if active && self.auto_reload && !self.reload_attempted {
                    warn!(index = self.index, %reason, "play rejected, reloading once");
                    self.reload_attempted = true;
                    self.wants_play = true;
                    return self.load();
                }
                self.fail(MediaError::PlaybackStart(reason));
                Vec::new()
            }
            MediaEvent::Ended => {
                if self.phase == Phase::Playing && active {
                    // Loop until stopped by hand.
                    self.state.current_time_seconds = 0.0;
                    return vec![MediaCommand::Seek(0.0), MediaCommand::Play];
                }
                if matches!(self.phase, Phase::Playing | Phase::Paused) {
                    self.phase = Phase::Ready;
                }
                self.state.is_playing = false;
                Vec::new()
            }
            MediaEvent::Error(err) => {
                self.fail(err);
                Vec::new()
            }
        }
    }

    fn fail(&mut self, err: MediaError) {
        warn!(index = self.index, source = %self.source.display(), error = %err, "item failed");
        self.phase = Phase::Error(err);
        self.state.is_playing = false;
        self.state.is_loading = false;
        self.state.has_error = true;
        self.wants_play = false;
    }
}
