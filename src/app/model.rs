//! Application model types: `App`, `InputMode` and `Notice`.
//!
//! The `App` struct holds the deck (playlist + playback coordination), the
//! selected row and the transient UI state used by the TUI and runtime.

use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::{IntakeSettings, Settings};
use crate::error::IntakeError;
use crate::library::{AudioFilter, collect_raw_files, parse_dropped_paths, select_files};
use crate::playback::{Deck, ItemPlayer};

/// Whether keys drive playback or edit the open-path prompt.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum InputMode {
    #[default]
    Normal,
    Open,
}

/// One-line message shown in the status box.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    Info(String),
    Warning(String),
}

/// The main application model.
pub struct App {
    pub deck: Deck,
    pub selected: usize,
    pub mode: InputMode,
    pub path_input: String,
    pub notice: Option<Notice>,
    /// Move the cursor to the active item whenever it changes.
    pub follow_active: bool,
    /// Short description of where the current playlist came from.
    pub source_label: Option<String>,
    pub metadata_window: bool,

    intake: IntakeSettings,
    filter: AudioFilter,
    last_active: Option<usize>,
}

impl App {
    /// Create a new `App` with an empty playlist.
    pub fn new(settings: &Settings) -> Self {
        Self {
            deck: Deck::new(&settings.playback),
            selected: 0,
            mode: InputMode::Normal,
            path_input: String::new(),
            notice: None,
            follow_active: true,
            source_label: None,
            metadata_window: false,
            intake: settings.intake.clone(),
            filter: AudioFilter::new(&settings.intake),
            last_active: None,
        }
    }

    /// Return true if the playlist contains any items.
    pub fn has_items(&self) -> bool {
        !self.deck.is_empty()
    }

    pub fn selected_item(&self) -> Option<&ItemPlayer> {
        self.deck.item(self.selected)
    }

    /// Select files and/or folders, replacing the playlist on success.
    ///
    /// On failure the current playlist is kept and a warning is shown.
    pub fn load_paths(&mut self, paths: &[PathBuf]) -> Result<usize, IntakeError> {
        let raw = collect_raw_files(paths, &self.intake);
        match select_files(raw, &self.filter) {
            Ok(playlist) => {
                let n = playlist.len();
                self.deck.install(playlist);
                self.selected = 0;
                self.last_active = None;
                self.source_label = Some(describe_paths(paths));
                self.notice = Some(Notice::Info(format!("loaded {n} audio file(s)")));
                Ok(n)
            }
            Err(e) => {
                warn!(error = %e, "selection rejected");
                self.notice = Some(Notice::Warning(e.to_string()));
                Err(e)
            }
        }
    }

    /// Load whatever was pasted (or dropped) into the terminal.
    pub fn load_dropped(&mut self, text: &str) -> Result<usize, IntakeError> {
        let paths = parse_dropped_paths(text);
        if paths.is_empty() {
            let err = IntakeError::NoAudioFilesFound { considered: 0 };
            self.notice = Some(Notice::Warning(err.to_string()));
            return Err(err);
        }
        info!(count = paths.len(), "paths dropped");
        self.load_paths(&paths)
    }

    /// Handle text pasted (or dropped) into the terminal.
    ///
    /// With the open prompt up the text is appended to it; otherwise it is
    /// loaded right away.
    pub fn paste(&mut self, text: &str) {
        match self.mode {
            InputMode::Open => self.path_input.push_str(text),
            InputMode::Normal => {
                // Failures end up in the status box.
                let _ = self.load_dropped(text);
            }
        }
    }

    /// Release everything and show an empty list.
    pub fn clear_all(&mut self) {
        self.deck.clear_all();
        self.selected = 0;
        self.last_active = None;
        self.source_label = None;
        self.notice = Some(Notice::Info("playlist cleared".to_string()));
    }

    /// Enter the open-path prompt.
    pub fn enter_open_mode(&mut self) {
        self.mode = InputMode::Open;
        self.path_input.clear();
    }

    /// Leave the prompt without loading anything.
    pub fn cancel_open_mode(&mut self) {
        self.mode = InputMode::Normal;
        self.path_input.clear();
    }

    pub fn push_input_char(&mut self, c: char) {
        self.path_input.push(c);
    }

    pub fn pop_input_char(&mut self) {
        self.path_input.pop();
    }

    /// Load the paths typed into the prompt and leave it.
    pub fn submit_open(&mut self) -> Result<usize, IntakeError> {
        let input = std::mem::take(&mut self.path_input);
        self.mode = InputMode::Normal;
        self.load_dropped(&input)
    }

    pub fn toggle_metadata_window(&mut self) {
        self.metadata_window = !self.metadata_window;
    }

    /// Set the selected index, clamped to the playlist.
    pub fn set_selected(&mut self, idx: usize) {
        self.selected = idx.min(self.deck.len().saturating_sub(1));
    }

    /// Move selection to the next item. Wraps around to the first one.
    pub fn next(&mut self) {
        let n = self.deck.len();
        if n > 0 {
            self.selected = (self.selected + 1) % n;
        }
    }

    /// Move selection to the previous item. Wraps around to the last one.
    pub fn prev(&mut self) {
        let n = self.deck.len();
        if n > 0 {
            self.selected = (self.selected + n - 1) % n;
        }
    }

    pub fn first(&mut self) {
        self.selected = 0;
    }

    pub fn last(&mut self) {
        self.selected = self.deck.len().saturating_sub(1);
    }

    /// Move the cursor onto a newly active item when following is on.
    pub fn follow(&mut self) {
        let active = self.deck.active();
        if active != self.last_active {
            self.last_active = active;
            if let (true, Some(idx)) = (self.follow_active, active) {
                self.set_selected(idx);
            }
        }
    }
}

fn describe_paths(paths: &[PathBuf]) -> String {
    match paths {
        [one] => one.display().to_string(),
        _ => format!("{} paths", paths.len()),
    }
}
