use std::sync::Mutex;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::JoinHandle;
use std::time::Duration;

use tracing::warn;

use crate::config::AudioSettings;
use crate::playback::{EngineEvent, Outgoing};

use super::thread::spawn_audio_thread;
use super::types::AudioCmd;

/// Handle to the audio thread: commands go in, media events come out.
pub struct AudioPlayer {
    tx: Sender<AudioCmd>,
    events: Receiver<EngineEvent>,
    join: Mutex<Option<JoinHandle<()>>>,
}

impl AudioPlayer {
    pub fn new(audio_settings: AudioSettings) -> Self {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (event_tx, event_rx) = mpsc::channel::<EngineEvent>();

        let audio_handle = spawn_audio_thread(rx, event_tx, audio_settings);

        Self {
            tx,
            events: event_rx,
            join: Mutex::new(Some(audio_handle)),
        }
    }

    pub fn send(&self, cmd: AudioCmd) -> Result<(), mpsc::SendError<AudioCmd>> {
        self.tx.send(cmd)
    }

    /// Forward commands queued by the deck, in order.
    pub fn dispatch(&self, commands: Vec<Outgoing>) {
        for out in commands {
            if let Err(e) = self.send(out.into()) {
                warn!(error = %e, "audio thread is gone; dropping command");
                break;
            }
        }
    }

    /// Everything the engine reported since the last call.
    pub fn drain_events(&self) -> Vec<EngineEvent> {
        self.events.try_iter().collect()
    }

    pub fn quit_softly(&self, fade_out: Duration) {
        let _ = self.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });

        if let Ok(mut j) = self.join.lock() {
            if let Some(h) = j.take() {
                let _ = h.join();
            }
        }
    }
}
