use std::path::PathBuf;
use std::time::{Duration, Instant};

use rodio::Sink;

/// Wall-clock position tracking for a sink.
///
/// Elapsed time accumulates while running and freezes while paused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct Clock {
    accumulated: Duration,
    started_at: Option<Instant>,
}

impl Clock {
    pub(crate) fn at(position: Duration) -> Self {
        Self {
            accumulated: position,
            started_at: None,
        }
    }

    pub(crate) fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub(crate) fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub(crate) fn pause(&mut self, now: Instant) {
        if let Some(st) = self.started_at.take() {
            self.accumulated += now.saturating_duration_since(st);
        }
    }

    pub(crate) fn elapsed(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |st| now.saturating_duration_since(st))
    }
}

/// One item's playable resource inside the audio thread.
pub(super) struct Voice {
    pub(super) path: PathBuf,
    pub(super) sink: Sink,
    pub(super) clock: Clock,
    pub(super) volume: f32,
    pub(super) duration: Option<Duration>,
}

impl Voice {
    pub(super) fn position(&self, now: Instant) -> Duration {
        let elapsed = self.clock.elapsed(now);
        match self.duration {
            Some(d) => elapsed.min(d),
            None => elapsed,
        }
    }
}

impl Drop for Voice {
    fn drop(&mut self) {
        self.sink.stop();
    }
}
