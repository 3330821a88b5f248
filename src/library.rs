//! Intake and ordering of user-selected audio files.
//!
//! Raw paths are gathered by `scan`, filtered to audio by `intake`, and
//! ordered by `order` into an immutable `Playlist`.

mod intake;
mod model;
mod order;
mod scan;

pub use intake::{AudioFilter, select_files};
pub use model::{MediaItem, Playlist, RawFile};
pub use order::{compare_names, leading_digits, leading_number, sort_items};
pub use scan::{collect_raw_files, parse_dropped_paths};
