//! Utilities for creating `rodio` sinks from media files.
//!
//! The helpers here encapsulate opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::*;
use rodio::{Decoder, OutputStream, Sink, Source};

use crate::error::MediaError;

/// Read the duration from the file's tags/headers.
pub(super) fn probe_duration(path: &Path) -> Option<Duration> {
    let tagged = lofty::read_from_path(path).ok()?;
    let d = tagged.properties().duration();
    (!d.is_zero()).then_some(d)
}

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Also returns the duration reported by the decoder, when it knows one.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>), MediaError> {
    let file = File::open(path)
        .map_err(|e| MediaError::Load(format!("cannot open {}: {e}", path.display())))?;

    let decoder = Decoder::new(BufReader::new(file))
        .map_err(|e| MediaError::Load(format!("cannot decode {}: {e}", path.display())))?;
    let total = decoder.total_duration();

    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    let source = decoder.skip_duration(start_at);

    let sink = Sink::connect_new(stream.mixer());
    sink.pause();
    sink.set_volume(volume);
    sink.append(source);
    Ok((sink, total))
}
