use tracing::{debug, info};

use crate::config::IntakeSettings;
use crate::error::IntakeError;

use super::model::{MediaItem, Playlist, RawFile};
use super::order::sort_items;

/// Decides which raw files count as audio.
///
/// MIME detection is unreliable for some containers, so a file is accepted
/// when either its declared type or its extension is recognized.
#[derive(Debug, Clone)]
pub struct AudioFilter {
    mime_types: Vec<String>,
    extensions: Vec<String>,
}

impl AudioFilter {
    pub fn new(settings: &IntakeSettings) -> Self {
        let mime_types = settings
            .mime_types
            .iter()
            .map(|m| m.trim().to_ascii_lowercase())
            .filter(|m| !m.is_empty())
            .collect();
        let extensions = settings
            .extensions
            .iter()
            .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
            .filter(|e| !e.is_empty())
            .collect();

        Self {
            mime_types,
            extensions,
        }
    }

    fn has_audio_type(&self, declared: Option<&str>) -> bool {
        declared
            .map(|t| {
                let t = t.trim().to_ascii_lowercase();
                self.mime_types.iter().any(|m| *m == t)
            })
            .unwrap_or(false)
    }

    fn has_audio_extension(&self, name: &str) -> bool {
        name.rsplit_once('.')
            .map(|(_, ext)| {
                let ext = ext.to_ascii_lowercase();
                self.extensions.iter().any(|e| *e == ext)
            })
            .unwrap_or(false)
    }

    pub fn accepts(&self, raw: &RawFile) -> bool {
        self.has_audio_type(raw.declared_type.as_deref()) || self.has_audio_extension(&raw.name)
    }
}

impl Default for AudioFilter {
    fn default() -> Self {
        Self::new(&IntakeSettings::default())
    }
}

/// Filter `raw_files` to audio and order them into a new `Playlist`.
///
/// Fails with `NoAudioFilesFound` when nothing matched; callers keep their
/// current playlist in that case.
pub fn select_files(
    raw_files: impl IntoIterator<Item = RawFile>,
    filter: &AudioFilter,
) -> Result<Playlist, IntakeError> {
    let mut considered = 0usize;
    let mut items: Vec<MediaItem> = Vec::new();

    for raw in raw_files {
        considered += 1;
        if filter.accepts(&raw) {
            items.push(raw.into());
        } else {
            debug!(name = %raw.name, declared_type = ?raw.declared_type, "skipping non-audio file");
        }
    }

    if items.is_empty() {
        return Err(IntakeError::NoAudioFilesFound { considered });
    }

    sort_items(&mut items);
    info!(accepted = items.len(), considered, "built playlist");
    Ok(Playlist::from_sorted(items))
}
