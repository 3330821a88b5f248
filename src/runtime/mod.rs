use std::path::{Path, PathBuf};

use anyhow::Result;
use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{Terminal, backend::CrosstermBackend};
use tracing::{info, warn};

use crate::app::App;
use crate::audio::AudioPlayer;

mod event_loop;
mod logging;
mod settings;

/// Start the player: settings, logging, audio thread, then the TUI.
///
/// `paths` (files and/or folders) are loaded before the first frame. Without
/// them the list starts empty and waits for the open prompt or a drop.
pub fn run(paths: &[PathBuf], config_path: Option<&Path>) -> Result<()> {
    let (settings, settings_problem) = settings::load_settings(config_path);
    let _log_guard = logging::init_logging(&settings.logging)?;
    if let Some(problem) = settings_problem {
        warn!("{problem}");
    }
    info!(version = env!("CARGO_PKG_VERSION"), "starting");

    let audio_player = AudioPlayer::new(settings.audio.clone());
    let mut app = App::new(&settings);

    if !paths.is_empty() {
        // A bad selection leaves a warning in the status box; keep going.
        let _ = app.load_paths(paths);
        audio_player.dispatch(app.deck.take_commands());
    }

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        EnableBracketedPaste,
        EnableMouseCapture
    )?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut state = event_loop::EventLoopState::default();
    let run_result = event_loop::run(&mut terminal, &settings, &mut app, &audio_player, &mut state);

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        DisableBracketedPaste,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    info!("stopped");
    run_result
}
