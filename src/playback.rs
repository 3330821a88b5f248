//! Playback coordination: one active item at a time.
//!
//! The `Deck` owns the playlist, the shared `Coordinator` (the active
//! index) and one `ItemPlayer` state machine per item. Items never reach
//! the audio engine themselves; they return `MediaCommand`s that the deck
//! queues, and engine `MediaEvent`s are routed back through the deck.

mod coordinator;
mod deck;
mod format;
mod item;
mod types;

pub use coordinator::Coordinator;
pub use deck::Deck;
pub use format::{VolumeIcon, format_time};
pub use item::ItemPlayer;
pub use types::{
    EngineEvent, MediaCommand, MediaEvent, Outgoing, Phase, PlaybackState, VoiceKey,
};

#[cfg(test)]
mod tests;
