use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::config::PlaybackSettings;
use crate::library::Playlist;

use super::coordinator::Coordinator;
use super::item::ItemPlayer;
use super::types::{EngineEvent, MediaCommand, Outgoing, VoiceKey};

/// A start waiting out the settle delay.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct PendingStart {
    index: usize,
    due: Instant,
}

/// Controller owning the playlist, the active index and one player per item.
///
/// All methods only record commands; `take_commands` hands them to whoever
/// drives the audio engine.
#[derive(Debug)]
pub struct Deck {
    playlist: Playlist,
    items: Vec<ItemPlayer>,
    coordinator: Coordinator,
    generation: u64,
    pending_start: Option<PendingStart>,
    settle: Duration,
    default_volume: f32,
    auto_reload: bool,
    outbox: Vec<Outgoing>,
}

impl Deck {
    pub fn new(settings: &PlaybackSettings) -> Self {
        Self {
            playlist: Playlist::empty(),
            items: Vec::new(),
            coordinator: Coordinator::new(),
            generation: 0,
            pending_start: None,
            settle: Duration::from_millis(settings.settle_ms),
            default_volume: settings.default_volume.clamp(0.0, 1.0),
            auto_reload: settings.auto_reload_on_start_error,
            outbox: Vec::new(),
        }
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    pub fn items(&self) -> &[ItemPlayer] {
        &self.items
    }

    pub fn item(&self, index: usize) -> Option<&ItemPlayer> {
        self.items.get(index)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active(&self) -> Option<usize> {
        self.coordinator.active()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn playing_count(&self) -> usize {
        self.items.iter().filter(|i| i.is_playing()).count()
    }

    /// Drain the commands recorded since the last call.
    pub fn take_commands(&mut self) -> Vec<Outgoing> {
        std::mem::take(&mut self.outbox)
    }

    fn push(&mut self, index: usize, commands: Vec<MediaCommand>) {
        let key = VoiceKey {
            generation: self.generation,
            index,
        };
        self.outbox
            .extend(commands.into_iter().map(|command| Outgoing { key, command }));
    }

    /// Replace the playlist wholesale. Every old item's resource is released
    /// and the new items start loading.
    pub fn install(&mut self, playlist: Playlist) {
        for index in 0..self.items.len() {
            let cmds = self.items[index].release();
            self.push(index, cmds);
        }
        self.coordinator.request_stop();
        self.pending_start = None;
        self.generation += 1;

        debug!(order = ?playlist.names(), "playlist order");
        self.items = playlist
            .iter()
            .enumerate()
            .map(|(i, item)| ItemPlayer::new(i, item, self.default_volume, self.auto_reload))
            .collect();
        self.playlist = playlist;

        for index in 0..self.items.len() {
            let cmds = self.items[index].load();
            self.push(index, cmds);
        }
        info!(
            generation = self.generation,
            items = self.items.len(),
            "playlist installed"
        );
    }

    /// Release everything and leave an empty playlist.
    pub fn clear_all(&mut self) {
        self.install(Playlist::empty());
    }

    /// Make `index` the only playing item.
    ///
    /// Every other item is told to pause right away; `index` itself starts
    /// once the settle delay has passed (see `tick`).
    pub fn request_play(&mut self, index: usize, now: Instant) {
        if index >= self.items.len() {
            return;
        }
        let previous = self.coordinator.request_play(index);
        debug!(index, ?previous, "play requested");

        for other in 0..self.items.len() {
            if other != index {
                let cmds = self.items[other].deactivate();
                self.push(other, cmds);
            }
        }

        self.pending_start = Some(PendingStart {
            index,
            due: now + self.settle,
        });
        if self.settle.is_zero() {
            self.tick(now);
        }
    }

    /// Clear the active index and pause whatever is playing.
    pub fn stop_all(&mut self) {
        self.coordinator.request_stop();
        self.pending_start = None;
        for index in 0..self.items.len() {
            let cmds = self.items[index].deactivate();
            self.push(index, cmds);
        }
    }

    /// Run a settle-delayed start when it is due.
    pub fn tick(&mut self, now: Instant) {
        let Some(pending) = self.pending_start else {
            return;
        };
        if now < pending.due {
            return;
        }
        self.pending_start = None;
        if let Some(item) = self.items.get_mut(pending.index) {
            let cmds = item.start(&self.coordinator);
            self.push(pending.index, cmds);
        }
    }

    /// When the next `tick` has work to do, if ever.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.pending_start.map(|p| p.due)
    }

    pub fn pause(&mut self, index: usize) {
        let Some(item) = self.items.get_mut(index) else {
            return;
        };
        let cmds = item.pause();
        self.push(index, cmds);
        if self.coordinator.is_active(index) {
            self.coordinator.request_stop();
        }
        if self.pending_start.is_some_and(|p| p.index == index) {
            self.pending_start = None;
        }
    }

    /// Play when idle or paused, pause when playing (or about to).
    pub fn toggle(&mut self, index: usize, now: Instant) {
        let Some(item) = self.items.get(index) else {
            return;
        };
        let starting = self.pending_start.is_some_and(|p| p.index == index);
        if item.is_playing() || item.wants_play() || starting {
            self.pause(index);
        } else {
            self.request_play(index, now);
        }
    }

    /// Rewind to the start and play. A failed item needs `retry` first.
    pub fn restart(&mut self, index: usize, now: Instant) {
        let Some(item) = self.items.get_mut(index) else {
            return;
        };
        if item.has_error() {
            debug!(index, "restart ignored: item failed");
            return;
        }
        let cmds = item.rewind();
        self.push(index, cmds);
        if !(self.coordinator.is_active(index) && self.items[index].is_playing()) {
            self.request_play(index, now);
        }
    }

    pub fn seek_normalized(&mut self, index: usize, p: f64) {
        if let Some(item) = self.items.get_mut(index) {
            let cmds = item.seek_normalized(p);
            self.push(index, cmds);
        }
    }

    pub fn seek_by(&mut self, index: usize, delta_seconds: f64) {
        if let Some(item) = self.items.get_mut(index) {
            let cmds = item.seek_by(delta_seconds);
            self.push(index, cmds);
        }
    }

    pub fn set_volume(&mut self, index: usize, volume: f32) {
        if let Some(item) = self.items.get_mut(index) {
            let cmds = item.set_volume(volume);
            self.push(index, cmds);
        }
    }

    pub fn adjust_volume(&mut self, index: usize, delta: f32) {
        if let Some(item) = self.items.get(index) {
            let volume = item.state().volume + delta;
            self.set_volume(index, volume);
        }
    }

    pub fn toggle_mute(&mut self, index: usize) {
        if let Some(item) = self.items.get_mut(index) {
            let cmds = item.toggle_mute();
            self.push(index, cmds);
        }
    }

    pub fn retry(&mut self, index: usize) {
        if let Some(item) = self.items.get_mut(index) {
            let cmds = item.retry();
            self.push(index, cmds);
        }
    }

    /// Feed one engine event to its item. Events for a replaced playlist are
    /// dropped.
    pub fn handle_event(&mut self, event: EngineEvent) {
        let EngineEvent { key, event } = event;
        if key.generation != self.generation {
            debug!(?key, current = self.generation, "stale engine event dropped");
            return;
        }
        let Some(item) = self.items.get_mut(key.index) else {
            return;
        };

        let cmds = item.on_event(event, &self.coordinator);
        let failed = item.has_error();
        self.push(key.index, cmds);

        if failed && self.coordinator.is_active(key.index) {
            self.coordinator.request_stop();
            if self.pending_start.is_some_and(|p| p.index == key.index) {
                self.pending_start = None;
            }
        }
    }
}
