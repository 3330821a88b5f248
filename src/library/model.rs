use std::ops::Deref;
use std::path::PathBuf;
use std::sync::Arc;

/// A file handed to intake before it is known to be audio.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFile {
    pub name: String,
    pub size_bytes: u64,
    /// MIME type declared for the file, if any was detected.
    pub declared_type: Option<String>,
    pub path: PathBuf,
}

impl RawFile {
    /// Build a `RawFile` for `path`, guessing its MIME type from the name.
    pub fn from_path(path: PathBuf, size_bytes: u64) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        let declared_type = mime_guess::from_path(&path)
            .first()
            .map(|m| m.essence_str().to_string());

        Self {
            name,
            size_bytes,
            declared_type,
            path,
        }
    }
}

/// An audio file accepted by intake.
///
/// `path` is the source handle; the bytes behind it are only ever opened by
/// the audio engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaItem {
    pub name: String,
    pub size_bytes: u64,
    pub declared_type: Option<String>,
    pub path: PathBuf,
}

impl From<RawFile> for MediaItem {
    fn from(raw: RawFile) -> Self {
        Self {
            name: raw.name,
            size_bytes: raw.size_bytes,
            declared_type: raw.declared_type,
            path: raw.path,
        }
    }
}

/// Immutable, ordered list of media items.
///
/// Cloning is cheap; a new selection produces a new `Playlist` instead of
/// mutating this one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Playlist {
    items: Arc<[MediaItem]>,
}

impl Playlist {
    pub(super) fn from_sorted(items: Vec<MediaItem>) -> Self {
        Self {
            items: items.into(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn names(&self) -> Vec<&str> {
        self.items.iter().map(|i| i.name.as_str()).collect()
    }
}

impl Deref for Playlist {
    type Target = [MediaItem];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}
