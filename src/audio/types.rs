//! Commands understood by the audio thread.

use crate::playback::Outgoing;

#[derive(Debug)]
pub enum AudioCmd {
    /// A command for a single voice.
    Media(Outgoing),
    /// Quit the audio thread, fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

impl From<Outgoing> for AudioCmd {
    fn from(out: Outgoing) -> Self {
        Self::Media(out)
    }
}
