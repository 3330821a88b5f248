//! Audio engine: a dedicated thread that owns the output stream and one
//! `rodio` sink per loaded item.
//!
//! It executes `MediaCommand`s and reports `MediaEvent`s; it knows nothing
//! about which item is active.

mod player;
mod sink;
mod thread;
mod types;
mod voice;

pub use player::AudioPlayer;
pub use types::AudioCmd;
