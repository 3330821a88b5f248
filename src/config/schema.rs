use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cueloop/config.toml` or `~/.config/cueloop/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CUELOOP__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub intake: IntakeSettings,
    pub playback: PlaybackSettings,
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct IntakeSettings {
    /// Declared MIME types accepted as audio.
    pub mime_types: Vec<String>,
    /// File extensions accepted as audio (case-insensitive, with or without dot).
    pub extensions: Vec<String>,
    /// Whether to follow symlinks when walking a folder.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles) of a folder.
    pub include_hidden: bool,
    /// Whether to recurse into subdirectories of a selected folder.
    pub recursive: bool,
    /// Optional cap on directory recursion depth.
    pub max_depth: Option<usize>,
}

impl Default for IntakeSettings {
    fn default() -> Self {
        Self {
            mime_types: [
                "audio/mpeg",
                "audio/wav",
                "audio/ogg",
                "audio/mp3",
                "audio/mp4",
                "audio/aac",
                "audio/flac",
                "audio/webm",
            ]
            .map(String::from)
            .to_vec(),
            extensions: ["mp3", "wav", "ogg", "m4a", "aac", "flac", "wma", "opus"]
                .map(String::from)
                .to_vec(),
            follow_links: true,
            include_hidden: false,
            recursive: true,
            max_depth: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlaybackSettings {
    /// Pause between taking over the active slot and starting audio
    /// (milliseconds), so the previous item's pause lands first.
    pub settle_ms: u64,
    /// Volume given to newly loaded items, 0.0 to 1.0.
    pub default_volume: f32,
    /// Step used by the volume up/down keys.
    pub volume_step: f32,
    /// Number of seconds to scrub when pressing `H` / `L`.
    pub scrub_seconds: u64,
    /// Reload the source once when starting playback fails, before giving up.
    pub auto_reload_on_start_error: bool,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            settle_ms: 50,
            default_volume: 1.0,
            volume_step: 0.1,
            scrub_seconds: 5,
            auto_reload_on_start_error: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// How often the engine reports progress and checks for the end of
    /// media (milliseconds).
    pub tick_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            quit_fade_out_ms: 300,
            tick_ms: 100,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ cueloop: one cue at a time ~ ".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Write a log file at all.
    pub enabled: bool,
    /// Directory for the daily log file. Defaults to the XDG state dir.
    pub directory: Option<PathBuf>,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: None,
            filter: "info".to_string(),
        }
    }
}
