use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use rodio::{OutputStream, OutputStreamBuilder, Sink};
use tracing::{debug, error, info, warn};

use crate::config::AudioSettings;
use crate::error::MediaError;
use crate::playback::{EngineEvent, MediaCommand, MediaEvent, Outgoing, VoiceKey};

use super::sink::{create_sink_at, probe_duration};
use super::types::AudioCmd;
use super::voice::{Clock, Voice};

pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<EngineEvent>,
    audio_settings: AudioSettings,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let stream = match OutputStreamBuilder::open_default_stream() {
            Ok(mut stream) => {
                // rodio logs to stderr when OutputStream is dropped. That's useful in
                // debugging, but noisy for a TUI app.
                stream.log_on_drop(false);
                Some(stream)
            }
            Err(e) => {
                error!(error = %e, "no audio output device");
                None
            }
        };

        let mut engine = Engine {
            stream,
            voices: HashMap::new(),
            events,
        };
        let mut ticker = Ticker::new(
            Duration::from_millis(audio_settings.tick_ms.max(1)),
            Instant::now(),
        );

        loop {
            match rx.recv_timeout(ticker.wait(Instant::now())) {
                Ok(AudioCmd::Media(out)) => engine.handle(out),
                Ok(AudioCmd::Quit { fade_out_ms }) => {
                    engine.fade_out_all(fade_out_ms);
                    engine.release_all();
                    break;
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => break,
            }
            // Tick on schedule even under steady command traffic.
            let now = Instant::now();
            if ticker.due(now) {
                engine.tick(now);
            }
        }
        info!("audio thread stopped");
    })
}

/// Fixed-rate schedule for engine ticks, independent of command traffic.
#[derive(Debug, Clone, Copy)]
pub(super) struct Ticker {
    every: Duration,
    last: Instant,
}

impl Ticker {
    pub(super) fn new(every: Duration, now: Instant) -> Self {
        Self { every, last: now }
    }

    /// How long to block before the next tick is due.
    pub(super) fn wait(&self, now: Instant) -> Duration {
        self.every
            .saturating_sub(now.saturating_duration_since(self.last))
    }

    /// True (and restarts the period) once a full period has passed.
    pub(super) fn due(&mut self, now: Instant) -> bool {
        if now.saturating_duration_since(self.last) >= self.every {
            self.last = now;
            true
        } else {
            false
        }
    }
}

struct Engine {
    stream: Option<OutputStream>,
    voices: HashMap<VoiceKey, Voice>,
    events: Sender<EngineEvent>,
}

impl Engine {
    fn emit(&self, key: VoiceKey, event: MediaEvent) {
        // The UI side going away means we are shutting down anyway.
        let _ = self.events.send(EngineEvent { key, event });
    }

    fn handle(&mut self, out: Outgoing) {
        let Outgoing { key, command } = out;
        match command {
            MediaCommand::Load { path, volume } => self.load(key, path, volume),
            MediaCommand::Play => self.play(key),
            MediaCommand::Pause => self.pause(key),
            MediaCommand::Seek(secs) => self.seek(key, secs),
            MediaCommand::SetVolume(volume) => {
                if let Some(voice) = self.voices.get_mut(&key) {
                    voice.volume = volume;
                    voice.sink.set_volume(volume);
                }
            }
            MediaCommand::Release => {
                if self.voices.remove(&key).is_some() {
                    debug!(?key, "voice released");
                }
            }
        }
    }

    fn load(&mut self, key: VoiceKey, path: PathBuf, volume: f32) {
        // A reload replaces whatever was there.
        self.voices.remove(&key);
        self.emit(key, MediaEvent::LoadStart);

        let Some(stream) = self.stream.as_ref() else {
            self.emit(
                key,
                MediaEvent::Error(MediaError::Load("no audio output device".to_string())),
            );
            return;
        };

        match create_sink_at(stream, &path, Duration::ZERO, volume) {
            Ok((sink, decoded_duration)) => {
                let duration = probe_duration(&path).or(decoded_duration);
                self.emit(
                    key,
                    MediaEvent::MetadataLoaded {
                        duration_seconds: duration.map(|d| d.as_secs_f64()),
                    },
                );
                self.voices.insert(
                    key,
                    Voice {
                        path,
                        sink,
                        clock: Clock::default(),
                        volume,
                        duration,
                    },
                );
                self.emit(key, MediaEvent::CanPlay);
            }
            Err(e) => {
                warn!(?key, error = %e, "load failed");
                self.emit(key, MediaEvent::Error(e));
            }
        }
    }

    /// Swap the voice's sink for a fresh one starting at `position`.
    fn rebuild(&mut self, key: VoiceKey, position: Duration) -> Result<(), MediaError> {
        let stream = self
            .stream
            .as_ref()
            .ok_or_else(|| MediaError::Load("no audio output device".to_string()))?;
        let voice = self
            .voices
            .get_mut(&key)
            .ok_or_else(|| MediaError::Load("not loaded".to_string()))?;

        let (sink, _) = create_sink_at(stream, &voice.path, position, voice.volume)?;
        voice.sink.stop();
        voice.sink = sink;
        voice.clock = Clock::at(position);
        Ok(())
    }

    fn play(&mut self, key: VoiceKey) {
        let Some(voice) = self.voices.get(&key) else {
            self.emit(key, MediaEvent::PlayRejected("not loaded".to_string()));
            return;
        };

        // A drained sink has nothing left to play; start over.
        if voice.sink.empty() {
            if let Err(e) = self.rebuild(key, Duration::ZERO) {
                self.emit(key, MediaEvent::PlayRejected(e.to_string()));
                return;
            }
        }

        if let Some(voice) = self.voices.get_mut(&key) {
            voice.sink.play();
            voice.clock.start(Instant::now());
            self.emit(key, MediaEvent::PlayStarted);
        }
    }

    fn pause(&mut self, key: VoiceKey) {
        let now = Instant::now();
        let Some(voice) = self.voices.get_mut(&key) else {
            return;
        };
        voice.sink.pause();
        voice.clock.pause(now);
        let position = voice.position(now);
        self.emit(
            key,
            MediaEvent::TimeUpdate {
                position_seconds: position.as_secs_f64(),
            },
        );
    }

    fn seek(&mut self, key: VoiceKey, secs: f64) {
        let Some(voice) = self.voices.get(&key) else {
            return;
        };
        let running = voice.clock.is_running();
        let mut target = Duration::from_secs_f64(secs.max(0.0));
        if let Some(d) = voice.duration {
            target = target.min(d);
        }

        if let Err(e) = self.rebuild(key, target) {
            warn!(?key, error = %e, "seek failed");
            self.voices.remove(&key);
            self.emit(key, MediaEvent::Error(e));
            return;
        }
        if let Some(voice) = self.voices.get_mut(&key) {
            if running {
                voice.sink.play();
                voice.clock.start(Instant::now());
            }
        }
        self.emit(
            key,
            MediaEvent::TimeUpdate {
                position_seconds: target.as_secs_f64(),
            },
        );
    }

    /// Periodic progress report and end-of-media detection.
    fn tick(&mut self, now: Instant) {
        let mut updates: Vec<(VoiceKey, MediaEvent)> = Vec::new();
        for (key, voice) in self.voices.iter_mut() {
            if !voice.clock.is_running() {
                continue;
            }
            if voice.sink.empty() {
                voice.clock.pause(now);
                let end = voice.duration.unwrap_or_else(|| voice.clock.elapsed(now));
                updates.push((
                    *key,
                    MediaEvent::TimeUpdate {
                        position_seconds: end.as_secs_f64(),
                    },
                ));
                updates.push((*key, MediaEvent::Ended));
            } else {
                updates.push((
                    *key,
                    MediaEvent::TimeUpdate {
                        position_seconds: voice.position(now).as_secs_f64(),
                    },
                ));
            }
        }
        for (key, event) in updates {
            self.emit(key, event);
        }
    }

    fn release_all(&mut self) {
        let n = self.voices.len();
        self.voices.clear();
        if n > 0 {
            debug!(count = n, "all voices released");
        }
    }

    fn fade_out_all(&self, fade_out_ms: u64) {
        let playing: Vec<&Voice> = self
            .voices
            .values()
            .filter(|v| v.clock.is_running())
            .collect();
        if playing.is_empty() {
            return;
        }
        fade_out_sinks(
            playing.iter().map(|v| (&v.sink, v.volume)).collect(),
            fade_out_ms,
        );
    }
}

fn fade_out_sinks(sinks: Vec<(&Sink, f32)>, fade_out_ms: u64) {
    if fade_out_ms == 0 {
        for (sink, _) in &sinks {
            sink.set_volume(0.0);
        }
        return;
    }
    let steps: u64 = 20;
    let step_ms = (fade_out_ms / steps).max(1);
    for step in 1..=steps {
        let t = step as f32 / steps as f32;
        for (sink, start) in &sinks {
            sink.set_volume(start * (1.0 - t));
        }
        thread::sleep(Duration::from_millis(step_ms));
    }
}
